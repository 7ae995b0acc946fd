//! Text embedding backends
//!
//! The same embedder must be used to index the corpus and to embed queries.
//! Each backend reports a `model_id` that is stored alongside every entry so
//! the index can refuse queries from a different embedding space.

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::config::{self, EmbeddingConfig, EmbeddingProvider};
use crate::error::{DrafterError, Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Embedder: Send + Sync {
  /// Stable identity of the embedding space
  fn model_id(&self) -> String;

  fn dimension(&self) -> usize;

  async fn embed(&self, text: &str) -> Result<Vec<f32>>;

  /// One embedding per input, in input order
  async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

pub type SharedEmbedder = Arc<dyn Embedder>;

/// Build the embedder named by the configuration
pub fn from_config(config: &EmbeddingConfig) -> Result<SharedEmbedder> {
  match config.provider {
    EmbeddingProvider::OpenAi => Ok(Arc::new(OpenAiEmbedder::new(config, config::api_key()?)?)),
    EmbeddingProvider::Hashing => Ok(Arc::new(HashingEmbedder::new(config.dimension))),
  }
}

/// Hosted embeddings endpoint (`POST {base_url}embeddings`)
pub struct OpenAiEmbedder {
  client: reqwest::Client,
  api_key: String,
  endpoint: Url,
  model: String,
  dimension: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
  data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
  index: usize,
  embedding: Vec<f32>,
}

impl OpenAiEmbedder {
  pub fn new(config: &EmbeddingConfig, api_key: String) -> Result<Self> {
    let endpoint = Url::parse(&config.base_url)
      .and_then(|base| base.join("embeddings"))
      .map_err(|e| DrafterError::config(format!("embedding.base_url '{}': {e}", config.base_url)))?;

    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .build()
      .map_err(|e| DrafterError::embedding(format!("failed to build HTTP client: {e}")))?;

    Ok(Self {
      client,
      api_key,
      endpoint,
      model: config.model.clone(),
      dimension: config.dimension,
    })
  }

  fn request_body(&self, texts: &[String]) -> serde_json::Value {
    let mut body = serde_json::json!({
      "model": &self.model,
      "input": texts,
    });
    // only the v3 family accepts a shortened output size
    if self.model.starts_with("text-embedding-3") {
      body["dimensions"] = serde_json::json!(self.dimension);
    }
    body
  }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
  fn model_id(&self) -> String {
    // `dimensions` shortens the output, so each width is its own space
    format!("{}@{}", self.model, self.dimension)
  }

  fn dimension(&self) -> usize {
    self.dimension
  }

  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    let mut batch = self.embed_batch(&[text.to_string()]).await?;
    batch.pop().ok_or_else(|| DrafterError::embedding("embedding service returned no vectors"))
  }

  async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    if texts.is_empty() {
      return Ok(Vec::new());
    }

    let response = self
      .client
      .post(self.endpoint.clone())
      .bearer_auth(&self.api_key)
      .json(&self.request_body(texts))
      .send()
      .await
      .map_err(|e| DrafterError::embedding(format!("request failed: {e}")))?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      return Err(DrafterError::embedding(format!("embedding API error {status}: {body}")));
    }

    let parsed: EmbeddingResponse = response
      .json()
      .await
      .map_err(|e| DrafterError::embedding(format!("unreadable embedding response: {e}")))?;

    let mut data = parsed.data;
    data.sort_by_key(|d| d.index);

    if data.len() != texts.len() {
      return Err(DrafterError::embedding(format!(
        "expected {} embeddings, got {}",
        texts.len(),
        data.len()
      )));
    }
    if let Some(bad) = data.iter().find(|d| d.embedding.len() != self.dimension) {
      return Err(DrafterError::embedding(format!(
        "expected dimension {}, got {}",
        self.dimension,
        bad.embedding.len()
      )));
    }

    Ok(data.into_iter().map(|d| d.embedding).collect())
  }
}

/// Offline embedder: signed feature hashing of lowercase word tokens,
/// normalised to unit length. Deterministic across runs and machines.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
  dimension: usize,
}

impl HashingEmbedder {
  pub fn new(dimension: usize) -> Self {
    Self { dimension: dimension.max(1) }
  }

  pub fn embed_text(&self, text: &str) -> Vec<f32> {
    let mut vector = vec![0.0f32; self.dimension];
    for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
      let hash = fnv1a(token.to_lowercase().as_bytes());
      let slot = (hash % self.dimension as u64) as usize;
      let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
      vector[slot] += sign;
    }
    normalize_embedding(vector)
  }
}

#[async_trait]
impl Embedder for HashingEmbedder {
  fn model_id(&self) -> String {
    format!("hashing-{}", self.dimension)
  }

  fn dimension(&self) -> usize {
    self.dimension
  }

  async fn embed(&self, text: &str) -> Result<Vec<f32>> {
    Ok(self.embed_text(text))
  }

  async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
    Ok(texts.iter().map(|text| self.embed_text(text)).collect())
  }
}

fn fnv1a(bytes: &[u8]) -> u64 {
  const OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
  const PRIME: u64 = 0x0000_0100_0000_01b3;
  bytes.iter().fold(OFFSET, |hash, &b| (hash ^ b as u64).wrapping_mul(PRIME))
}

/// Scale to unit length; zero vectors are returned unchanged
pub fn normalize_embedding(mut embedding: Vec<f32>) -> Vec<f32> {
  let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
  if magnitude < f32::EPSILON {
    return embedding;
  }
  for value in embedding.iter_mut() {
    *value /= magnitude;
  }
  embedding
}
