//! Arrow RecordBatch conversion for index entries

use arrow::array::{Array, FixedSizeListArray, FixedSizeListBuilder, Float32Builder, StringArray};
use arrow::record_batch::RecordBatch;
use std::sync::Arc;

use super::models::playbook_schema;
use crate::error::{DrafterError, Result};
use crate::server::services::vector_database::IndexEntry;

/// Convert entries to a batch matching [`playbook_schema`]
pub fn entries_to_batch(
  entries: &[IndexEntry],
  dimension: usize,
  indexed_at: &str,
) -> Result<RecordBatch> {
  validate_entries(entries, dimension)?;

  let columns: Vec<Arc<dyn Array>> = vec![
    Arc::new(string_column(entries, |e| &e.id)),
    Arc::new(string_column(entries, |e| &e.title)),
    Arc::new(string_column(entries, |e| &e.content)),
    Arc::new(embedding_column(entries, dimension)),
    Arc::new(string_column(entries, |e| &e.embedding_model)),
    Arc::new(StringArray::from(vec![indexed_at; entries.len()])),
  ];

  RecordBatch::try_new(playbook_schema(dimension), columns)
    .map_err(|e| DrafterError::index_unavailable(format!("failed to build record batch: {e}")))
}

fn validate_entries(entries: &[IndexEntry], dimension: usize) -> Result<()> {
  if entries.is_empty() {
    return Err(DrafterError::index_unavailable("cannot build a record batch from no entries"));
  }
  if let Some(entry) = entries.iter().find(|e| e.embedding.len() != dimension) {
    return Err(DrafterError::embedding(format!(
      "embedding for '{}' has dimension {}, table expects {dimension}",
      entry.id,
      entry.embedding.len()
    )));
  }
  Ok(())
}

fn string_column<F>(entries: &[IndexEntry], field: F) -> StringArray
where
  F: Fn(&IndexEntry) -> &str,
{
  StringArray::from(entries.iter().map(|e| Some(field(e))).collect::<Vec<_>>())
}

fn embedding_column(entries: &[IndexEntry], dimension: usize) -> FixedSizeListArray {
  let mut builder = FixedSizeListBuilder::new(
    Float32Builder::with_capacity(dimension * entries.len()),
    dimension as i32,
  );

  for entry in entries {
    builder.values().append_slice(&entry.embedding);
    builder.append(true);
  }

  builder.finish()
}
