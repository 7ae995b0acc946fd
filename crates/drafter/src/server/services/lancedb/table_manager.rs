//! Table lifecycle and writes for the playbook collection

use arrow::record_batch::RecordBatchIterator;
use chrono::Utc;
use lancedb::{Connection, Table};

use super::models::{embedding_dimension, playbook_schema};
use super::records::entries_to_batch;
use crate::error::{DrafterError, Result};
use crate::server::services::vector_database::IndexEntry;

pub struct TableManager {
  connection: Connection,
  table_name: String,
  dimension: usize,
}

impl TableManager {
  pub fn new(connection: Connection, table_name: String, dimension: usize) -> Self {
    Self { connection, table_name, dimension }
  }

  pub fn table_name(&self) -> &str {
    &self.table_name
  }

  pub async fn table_exists(&self) -> Result<bool> {
    let tables = self
      .connection
      .table_names()
      .execute()
      .await
      .map_err(|e| DrafterError::index_unavailable(format!("failed to list tables: {e}")))?;
    Ok(tables.contains(&self.table_name))
  }

  pub async fn get_table(&self) -> Result<Table> {
    self.connection.open_table(&self.table_name).execute().await.map_err(|e| {
      DrafterError::index_unavailable(format!("failed to open table '{}': {e}", self.table_name))
    })
  }

  /// Open the table, creating it empty when absent
  pub async fn open_or_create(&self) -> Result<Table> {
    if self.table_exists().await? {
      return self.get_table().await;
    }

    let table = self
      .connection
      .create_empty_table(&self.table_name, playbook_schema(self.dimension))
      .execute()
      .await
      .map_err(|e| {
        DrafterError::index_unavailable(format!(
          "failed to create table '{}': {e}",
          self.table_name
        ))
      })?;

    chronicle::info!(&format!(
      "Created table '{}' ({} dimensions)",
      self.table_name, self.dimension
    ));
    Ok(table)
  }

  /// Merge-insert on `id`: matching rows are replaced, new rows appended
  pub async fn upsert(&self, entries: &[IndexEntry]) -> Result<()> {
    if entries.is_empty() {
      return Ok(());
    }

    let batch = entries_to_batch(entries, self.dimension, &Utc::now().to_rfc3339())?;
    let schema = batch.schema();
    let reader = RecordBatchIterator::new(vec![Ok(batch)], schema);

    let table = self.open_or_create().await?;
    let mut merge = table.merge_insert(&["id"]);
    merge.when_matched_update_all(None).when_not_matched_insert_all();
    merge
      .execute(Box::new(reader))
      .await
      .map_err(|e| DrafterError::index_unavailable(format!("failed to upsert entries: {e}")))?;

    chronicle::verbose!(&format!("Upserted {} entries into '{}'", entries.len(), self.table_name));
    Ok(())
  }

  /// Embedding width the existing table was created with
  pub async fn stored_dimension(&self) -> Result<Option<usize>> {
    if !self.table_exists().await? {
      return Ok(None);
    }
    let table = self.get_table().await?;
    let schema = table
      .schema()
      .await
      .map_err(|e| DrafterError::index_unavailable(format!("failed to read schema: {e}")))?;
    Ok(embedding_dimension(&schema))
  }

  pub async fn count(&self) -> Result<usize> {
    if !self.table_exists().await? {
      return Ok(0);
    }
    let table = self.get_table().await?;
    table
      .count_rows(None)
      .await
      .map_err(|e| DrafterError::index_unavailable(format!("failed to count rows: {e}")))
  }

  pub async fn clear(&self) -> Result<()> {
    if !self.table_exists().await? {
      return Ok(());
    }
    let table = self.get_table().await?;
    table
      .delete("id IS NOT NULL")
      .await
      .map_err(|e| DrafterError::index_unavailable(format!("failed to clear table: {e}")))?;
    chronicle::info!(&format!("Cleared all entries from '{}'", self.table_name));
    Ok(())
  }
}
