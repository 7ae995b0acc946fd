//! LanceDB-backed persistent playbook collection
//!
//! The table lives under `index.data_dir` and survives restarts; reopening
//! an already populated table does not re-ingest anything.

pub mod connection;
pub mod models;
pub mod records;
pub mod search;
pub mod table_manager;

use async_trait::async_trait;
use std::path::Path;

use super::vector_database::{IndexEntry, VectorDatabase, VectorSearchResult};
use crate::error::Result;
use connection::create_connection;
use table_manager::TableManager;

pub struct LanceDbVectorDatabase {
  table_manager: TableManager,
}

impl LanceDbVectorDatabase {
  pub async fn new(data_dir: &Path, table_name: &str, dimension: usize) -> Result<Self> {
    let connection = create_connection(data_dir).await?;
    let table_manager = TableManager::new(connection, table_name.to_string(), dimension);
    Ok(Self { table_manager })
  }
}

#[async_trait]
impl VectorDatabase for LanceDbVectorDatabase {
  fn collection(&self) -> String {
    self.table_manager.table_name().to_string()
  }

  async fn ensure_collection(&self) -> Result<()> {
    self.table_manager.open_or_create().await.map(|_| ())
  }

  async fn count(&self) -> Result<usize> {
    self.table_manager.count().await
  }

  async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<()> {
    self.table_manager.upsert(&entries).await
  }

  async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<VectorSearchResult>> {
    if limit == 0 || !self.table_manager.table_exists().await? {
      return Ok(Vec::new());
    }
    let table = self.table_manager.get_table().await?;
    search::search_similar(&table, embedding, limit).await
  }

  async fn embedding_model(&self) -> Result<Option<String>> {
    if !self.table_manager.table_exists().await? {
      return Ok(None);
    }
    let table = self.table_manager.get_table().await?;
    search::first_embedding_model(&table).await
  }

  async fn embedding_dimension(&self) -> Result<Option<usize>> {
    if self.table_manager.count().await? == 0 {
      return Ok(None);
    }
    self.table_manager.stored_dimension().await
  }

  async fn clear(&self) -> Result<()> {
    self.table_manager.clear().await
  }
}
