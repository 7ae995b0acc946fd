//! Generation oracle client
//!
//! Sends the assembled prompt as a single user message with fixed sampling
//! parameters and hands back the oracle's text untouched. No retries here;
//! callers decide whether to try again.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use url::Url;

use crate::config::GenerationConfig;
use crate::error::{DrafterError, Result};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Generator: Send + Sync {
  async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Chat completions client (`POST {base_url}chat/completions`)
pub struct OpenAiGenerator {
  client: reqwest::Client,
  api_key: String,
  endpoint: Url,
  model: String,
  seed: u64,
  top_p: f32,
  timeout: Duration,
}

#[derive(Deserialize)]
struct CompletionResponse {
  choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
  message: Message,
}

#[derive(Deserialize)]
struct Message {
  content: Option<String>,
}

impl OpenAiGenerator {
  pub fn new(config: &GenerationConfig, api_key: String) -> Result<Self> {
    let endpoint = Url::parse(&config.base_url)
      .and_then(|base| base.join("chat/completions"))
      .map_err(|e| {
        DrafterError::config(format!("generation.base_url '{}': {e}", config.base_url))
      })?;

    let client = reqwest::Client::builder()
      .build()
      .map_err(|e| DrafterError::generation_unavailable(format!("failed to build client: {e}")))?;

    Ok(Self {
      client,
      api_key,
      endpoint,
      model: config.model.clone(),
      seed: config.seed,
      top_p: config.top_p,
      timeout: Duration::from_secs(config.timeout_secs),
    })
  }

  /// Override the bounded wait, mainly for tests
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn request_body(&self, prompt: &str) -> serde_json::Value {
    serde_json::json!({
      "model": &self.model,
      "messages": [{"role": "user", "content": prompt}],
      "top_p": self.top_p,
      "seed": self.seed,
    })
  }

  async fn call_api(&self, prompt: &str) -> Result<String> {
    let response = self
      .client
      .post(self.endpoint.clone())
      .bearer_auth(&self.api_key)
      .json(&self.request_body(prompt))
      .send()
      .await
      .map_err(|e| DrafterError::generation_unavailable(format!("request failed: {e}")))?;

    if !response.status().is_success() {
      let status = response.status();
      let body = response.text().await.unwrap_or_default();
      return Err(DrafterError::generation_unavailable(format!("API error {status}: {body}")));
    }

    let parsed: CompletionResponse = response
      .json()
      .await
      .map_err(|e| DrafterError::generation_unavailable(format!("unreadable response: {e}")))?;

    parsed
      .choices
      .into_iter()
      .next()
      .and_then(|choice| choice.message.content)
      .ok_or_else(|| DrafterError::generation_unavailable("oracle returned no content"))
  }
}

#[async_trait]
impl Generator for OpenAiGenerator {
  async fn generate(&self, prompt: &str) -> Result<String> {
    chronicle::verbose!(&format!("Sending {} byte prompt to {}", prompt.len(), self.model));

    match tokio::time::timeout(self.timeout, self.call_api(prompt)).await {
      Ok(result) => result,
      Err(_) => Err(DrafterError::generation_timeout(self.timeout.as_secs())),
    }
  }
}
