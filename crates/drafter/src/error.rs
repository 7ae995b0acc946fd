//! Error taxonomy shared by ingestion, retrieval and generation

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DrafterError {
  #[error("Malformed playbook record: {message}")]
  Schema { message: String },

  #[error("Playbook id '{id}' appears more than once in the corpus")]
  DuplicatePlaybook { id: String },

  #[error("Playbook corpus at {path} could not be read: {message}")]
  CorpusUnreadable { path: String, message: String },

  #[error("Vector index unavailable: {message}")]
  IndexUnavailable { message: String },

  #[error("Playbook index is empty and the source corpus could not be loaded: {message}")]
  EmptyCorpus { message: String },

  #[error("Collection was indexed with '{indexed}' but queries use '{active}'")]
  EmbeddingMismatch { indexed: String, active: String },

  #[error("Embedding failed: {message}")]
  Embedding { message: String },

  #[error("Generation service unavailable: {message}")]
  GenerationUnavailable { message: String },

  #[error("Generation did not complete within {seconds}s")]
  GenerationTimeout { seconds: u64 },

  #[error("Report template is invalid: {message}")]
  Template { message: String },

  #[error("Invalid request: {message}")]
  InvalidRequest { message: String },

  #[error("Failed to write audit snapshot {path}: {message}")]
  Audit { path: String, message: String },

  #[error("Configuration error: {message}")]
  Config { message: String },
}

pub type Result<T> = std::result::Result<T, DrafterError>;

impl DrafterError {
  pub fn schema(message: impl Into<String>) -> Self {
    Self::Schema { message: message.into() }
  }

  pub fn duplicate_playbook(id: impl Into<String>) -> Self {
    Self::DuplicatePlaybook { id: id.into() }
  }

  pub fn corpus_unreadable(path: impl Into<String>, message: impl Into<String>) -> Self {
    Self::CorpusUnreadable { path: path.into(), message: message.into() }
  }

  pub fn index_unavailable(message: impl Into<String>) -> Self {
    Self::IndexUnavailable { message: message.into() }
  }

  pub fn empty_corpus(message: impl Into<String>) -> Self {
    Self::EmptyCorpus { message: message.into() }
  }

  pub fn embedding_mismatch(indexed: impl Into<String>, active: impl Into<String>) -> Self {
    Self::EmbeddingMismatch { indexed: indexed.into(), active: active.into() }
  }

  pub fn embedding(message: impl Into<String>) -> Self {
    Self::Embedding { message: message.into() }
  }

  pub fn generation_unavailable(message: impl Into<String>) -> Self {
    Self::GenerationUnavailable { message: message.into() }
  }

  pub fn generation_timeout(seconds: u64) -> Self {
    Self::GenerationTimeout { seconds }
  }

  pub fn template(message: impl Into<String>) -> Self {
    Self::Template { message: message.into() }
  }

  pub fn invalid_request(message: impl Into<String>) -> Self {
    Self::InvalidRequest { message: message.into() }
  }

  pub fn audit(path: impl Into<String>, message: impl Into<String>) -> Self {
    Self::Audit { path: path.into(), message: message.into() }
  }

  pub fn config(message: impl Into<String>) -> Self {
    Self::Config { message: message.into() }
  }

  /// Stable key used in API error bodies and logs
  pub fn key(&self) -> &'static str {
    match self {
      Self::Schema { .. } => "schema_error",
      Self::DuplicatePlaybook { .. } => "duplicate_playbook",
      Self::CorpusUnreadable { .. } => "corpus_unreadable",
      Self::IndexUnavailable { .. } => "index_unavailable",
      Self::EmptyCorpus { .. } => "empty_corpus",
      Self::EmbeddingMismatch { .. } => "embedding_mismatch",
      Self::Embedding { .. } => "embedding_failed",
      Self::GenerationUnavailable { .. } => "generation_unavailable",
      Self::GenerationTimeout { .. } => "generation_timeout",
      Self::Template { .. } => "template_invalid",
      Self::InvalidRequest { .. } => "invalid_request",
      Self::Audit { .. } => "audit_failed",
      Self::Config { .. } => "config_error",
    }
  }

  /// HTTP status the service answers with for this failure
  pub fn status_code(&self) -> u16 {
    match self {
      Self::InvalidRequest { .. } => 400,
      Self::GenerationUnavailable { .. } | Self::Embedding { .. } => 502,
      Self::GenerationTimeout { .. } => 504,
      Self::IndexUnavailable { .. } | Self::EmptyCorpus { .. } | Self::EmbeddingMismatch { .. } => {
        503
      }
      _ => 500,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_status_mapping() {
    assert_eq!(DrafterError::invalid_request("bad json").status_code(), 400);
    assert_eq!(DrafterError::generation_unavailable("401").status_code(), 502);
    assert_eq!(DrafterError::generation_timeout(30).status_code(), 504);
    assert_eq!(DrafterError::index_unavailable("locked").status_code(), 503);
    assert_eq!(DrafterError::empty_corpus("missing").status_code(), 503);
    assert_eq!(DrafterError::schema("no id").status_code(), 500);
  }

  #[test]
  fn test_messages_carry_details() {
    let err = DrafterError::embedding_mismatch("text-embedding-3-small", "hashing-256");
    assert_eq!(err.key(), "embedding_mismatch");
    assert!(err.to_string().contains("text-embedding-3-small"));
    assert!(err.to_string().contains("hashing-256"));

    assert_eq!(
      DrafterError::generation_timeout(1200).to_string(),
      "Generation did not complete within 1200s"
    );
  }
}
