//! Process-local vector store with the same contract as the LanceDB table
//!
//! Used for tests and `--ephemeral` runs. Search is a brute-force cosine
//! scan, which is fine for a corpus of a few hundred playbooks.

use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use super::vector_database::{IndexEntry, VectorDatabase, VectorSearchResult};
use crate::error::Result;

pub struct MemoryVectorDatabase {
  name: String,
  entries: RwLock<BTreeMap<String, IndexEntry>>,
}

impl MemoryVectorDatabase {
  pub fn new(name: impl Into<String>) -> Self {
    Self { name: name.into(), entries: RwLock::new(BTreeMap::new()) }
  }
}

#[async_trait]
impl VectorDatabase for MemoryVectorDatabase {
  fn collection(&self) -> String {
    self.name.clone()
  }

  async fn ensure_collection(&self) -> Result<()> {
    Ok(())
  }

  async fn count(&self) -> Result<usize> {
    Ok(self.entries.read().await.len())
  }

  async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<()> {
    let mut stored = self.entries.write().await;
    for entry in entries {
      stored.insert(entry.id.clone(), entry);
    }
    Ok(())
  }

  async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<VectorSearchResult>> {
    let stored = self.entries.read().await;
    let mut results: Vec<VectorSearchResult> = stored
      .values()
      .map(|entry| VectorSearchResult {
        id: entry.id.clone(),
        title: entry.title.clone(),
        content: entry.content.clone(),
        similarity: cosine_similarity(embedding, &entry.embedding),
      })
      .collect();

    // stable sort keeps id order among ties
    results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    results.truncate(limit);
    Ok(results)
  }

  async fn embedding_model(&self) -> Result<Option<String>> {
    Ok(self.entries.read().await.values().next().map(|entry| entry.embedding_model.clone()))
  }

  async fn embedding_dimension(&self) -> Result<Option<usize>> {
    Ok(self.entries.read().await.values().next().map(|entry| entry.embedding.len()))
  }

  async fn clear(&self) -> Result<()> {
    self.entries.write().await.clear();
    Ok(())
  }
}

/// Cosine similarity in [-1, 1]; mismatched or zero vectors score 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
  if a.len() != b.len() || a.is_empty() {
    return 0.0;
  }

  let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
  let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
  let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

  if norm_a == 0.0 || norm_b == 0.0 {
    return 0.0;
  }
  dot / (norm_a * norm_b)
}
