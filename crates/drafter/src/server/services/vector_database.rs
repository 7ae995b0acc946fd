//! Vector database abstraction for the playbook collection
//!
//! The index manager only talks to this trait, so the persistent LanceDB
//! table and the in-process store are interchangeable.

use async_trait::async_trait;

use crate::error::Result;

/// One embedded playbook document as stored in the collection
#[derive(Debug, Clone, PartialEq)]
pub struct IndexEntry {
  pub id: String,
  pub title: String,
  pub content: String,
  pub embedding: Vec<f32>,
  /// Identity of the embedding function that produced `embedding`
  pub embedding_model: String,
}

/// A stored document ranked against a query embedding
#[derive(Debug, Clone, PartialEq)]
pub struct VectorSearchResult {
  pub id: String,
  pub title: String,
  pub content: String,
  /// Cosine similarity, higher is closer
  pub similarity: f32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VectorDatabase: Send + Sync {
  /// Name of the collection this handle is bound to
  fn collection(&self) -> String;

  /// Open or create the collection. Never drops existing data.
  async fn ensure_collection(&self) -> Result<()>;

  async fn count(&self) -> Result<usize>;

  /// Insert entries, replacing any stored entry with the same id
  async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<()>;

  /// At most `limit` entries, most similar first
  async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<VectorSearchResult>>;

  /// Embedding model recorded with the stored entries, if any exist
  async fn embedding_model(&self) -> Result<Option<String>>;

  /// Length of the stored embeddings, if any entries exist
  async fn embedding_dimension(&self) -> Result<Option<usize>>;

  /// Remove every entry
  async fn clear(&self) -> Result<()>;
}
