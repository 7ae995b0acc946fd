//! Configuration for the drafting pipeline
//!
//! Settings come from a JSON file (explicit path or the first of
//! [`CONFIG_PATHS`] found), then a small set of environment overrides.
//! API keys are only ever read from the environment.

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::error::{DrafterError, Result};

pub const CONFIG_PATHS: [&str; 3] = ["drafter.json", ".drafter.json", ".drafter/config.json"];

pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrafterConfig {
  #[serde(default)]
  pub index: IndexConfig,
  #[serde(default)]
  pub embedding: EmbeddingConfig,
  #[serde(default)]
  pub generation: GenerationConfig,
  #[serde(default)]
  pub audit: AuditConfig,
  #[serde(default)]
  pub server: ServerConfig,
}

/// Vector index and corpus location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
  /// Directory holding the persistent collection
  #[serde(default = "default_data_dir")]
  pub data_dir: PathBuf,
  #[serde(default = "default_collection")]
  pub collection: String,
  /// JSON array of playbook records
  #[serde(default = "default_playbooks_file")]
  pub playbooks_file: PathBuf,
  /// Documents retrieved per request
  #[serde(default = "default_n_results")]
  pub n_results: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingProvider {
  /// Hosted embeddings endpoint
  OpenAi,
  /// Offline feature hashing, no network
  Hashing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
  #[serde(default = "default_embedding_provider")]
  pub provider: EmbeddingProvider,
  #[serde(default = "default_embedding_model")]
  pub model: String,
  #[serde(default = "default_embedding_dimension")]
  pub dimension: usize,
  #[serde(default = "default_api_base")]
  pub base_url: String,
  #[serde(default = "default_embedding_timeout")]
  pub timeout_secs: u64,
}

/// Sampling parameters are fixed per deployment for reproducible drafts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
  #[serde(default = "default_generation_model")]
  pub model: String,
  #[serde(default = "default_seed")]
  pub seed: u64,
  #[serde(default = "default_top_p")]
  pub top_p: f32,
  #[serde(default = "default_generation_timeout")]
  pub timeout_secs: u64,
  #[serde(default = "default_api_base")]
  pub base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
  /// Directory for the prompt and response snapshots
  #[serde(default = "default_outputs_dir")]
  pub outputs_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_bind")]
  pub bind: SocketAddr,
  #[serde(default = "default_logs_path")]
  pub logs_path: PathBuf,
}

// Default value functions
fn default_data_dir() -> PathBuf {
  PathBuf::from("./playbook_index")
}
fn default_collection() -> String {
  "soc_playbooks_v6".to_string()
}
fn default_playbooks_file() -> PathBuf {
  PathBuf::from("RagData/playbooks.json")
}
fn default_n_results() -> usize {
  2
}
fn default_embedding_provider() -> EmbeddingProvider {
  EmbeddingProvider::OpenAi
}
fn default_embedding_model() -> String {
  "text-embedding-3-small".to_string()
}
fn default_embedding_dimension() -> usize {
  1536
}
fn default_api_base() -> String {
  "https://api.openai.com/v1/".to_string()
}
fn default_embedding_timeout() -> u64 {
  60
}
fn default_generation_model() -> String {
  "gpt-5".to_string()
}
fn default_seed() -> u64 {
  42
}
fn default_top_p() -> f32 {
  1.0
}
fn default_generation_timeout() -> u64 {
  1200
}
fn default_outputs_dir() -> PathBuf {
  PathBuf::from("outputs")
}
fn default_bind() -> SocketAddr {
  SocketAddr::from(([0, 0, 0, 0], 8000))
}
fn default_logs_path() -> PathBuf {
  dirs::home_dir()
    .unwrap_or_else(|| PathBuf::from("/tmp"))
    .join(".drafter")
    .join("server.logs.jsonl")
}

impl Default for IndexConfig {
  fn default() -> Self {
    Self {
      data_dir: default_data_dir(),
      collection: default_collection(),
      playbooks_file: default_playbooks_file(),
      n_results: default_n_results(),
    }
  }
}

impl Default for EmbeddingConfig {
  fn default() -> Self {
    Self {
      provider: default_embedding_provider(),
      model: default_embedding_model(),
      dimension: default_embedding_dimension(),
      base_url: default_api_base(),
      timeout_secs: default_embedding_timeout(),
    }
  }
}

impl Default for GenerationConfig {
  fn default() -> Self {
    Self {
      model: default_generation_model(),
      seed: default_seed(),
      top_p: default_top_p(),
      timeout_secs: default_generation_timeout(),
      base_url: default_api_base(),
    }
  }
}

impl Default for AuditConfig {
  fn default() -> Self {
    Self { outputs_dir: default_outputs_dir() }
  }
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self { bind: default_bind(), logs_path: default_logs_path() }
  }
}

impl DrafterConfig {
  /// Load configuration from a file
  pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
      .map_err(|e| DrafterError::config(format!("cannot read {}: {e}", path.display())))?;
    let config: DrafterConfig = serde_json::from_str(&content)
      .map_err(|e| DrafterError::config(format!("invalid {}: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
  }

  /// Load from `explicit`, else the first known config path, else defaults,
  /// then apply environment overrides
  pub fn load(explicit: Option<&Path>) -> Result<Self> {
    let mut config = match explicit {
      Some(path) => Self::load_from_file(path)?,
      None => match CONFIG_PATHS.iter().map(Path::new).find(|p| p.exists()) {
        Some(path) => Self::load_from_file(path)?,
        None => DrafterConfig::default(),
      },
    };

    config.apply_env_overrides()?;
    Ok(config)
  }

  /// Save configuration to a file
  pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
    let content =
      serde_json::to_string_pretty(self).map_err(|e| DrafterError::config(e.to_string()))?;
    std::fs::write(path, content).map_err(|e| DrafterError::config(e.to_string()))
  }

  fn apply_env_overrides(&mut self) -> Result<()> {
    if let Ok(dir) = std::env::var("DRAFTER_DATA_DIR") {
      self.index.data_dir = PathBuf::from(dir);
    }
    if let Ok(dir) = std::env::var("DRAFTER_OUTPUTS_DIR") {
      self.audit.outputs_dir = PathBuf::from(dir);
    }
    if let Ok(bind) = std::env::var("DRAFTER_BIND") {
      self.server.bind = bind
        .parse()
        .map_err(|e| DrafterError::config(format!("DRAFTER_BIND '{bind}': {e}")))?;
    }
    Ok(())
  }

  pub fn validate(&self) -> Result<()> {
    if self.index.n_results == 0 {
      return Err(DrafterError::config("index.n_results must be at least 1"));
    }
    if self.index.collection.trim().is_empty() {
      return Err(DrafterError::config("index.collection must not be empty"));
    }
    if self.embedding.dimension == 0 {
      return Err(DrafterError::config("embedding.dimension must be at least 1"));
    }
    if !(0.0..=1.0).contains(&self.generation.top_p) {
      return Err(DrafterError::config("generation.top_p must be within 0..=1"));
    }
    if self.generation.timeout_secs == 0 {
      return Err(DrafterError::config("generation.timeout_secs must be at least 1"));
    }
    Ok(())
  }
}

/// Read the hosted-API key from the environment
pub fn api_key() -> Result<String> {
  std::env::var(API_KEY_ENV)
    .map_err(|_| DrafterError::config(format!("{API_KEY_ENV} environment variable not set")))
}
