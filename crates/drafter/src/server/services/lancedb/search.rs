//! Vector search and result decoding for the playbook table

use arrow::array::{Array, Float32Array, StringArray};
use arrow::record_batch::RecordBatch;
use futures::stream::StreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{DistanceType, Table};

use super::models::{CONTENT, DISTANCE, EMBEDDING, EMBEDDING_MODEL, ID, TITLE};
use crate::error::{DrafterError, Result};
use crate::server::services::vector_database::VectorSearchResult;

/// Nearest `limit` rows by cosine distance, most similar first
pub async fn search_similar(
  table: &Table,
  query_embedding: &[f32],
  limit: usize,
) -> Result<Vec<VectorSearchResult>> {
  let mut stream = table
    .vector_search(query_embedding)
    .map_err(search_failed)?
    .column(EMBEDDING)
    .distance_type(DistanceType::Cosine)
    .limit(limit)
    .execute()
    .await
    .map_err(search_failed)?;

  let mut results = Vec::new();
  while let Some(batch) = stream.next().await {
    let batch = batch.map_err(search_failed)?;
    results.extend(decode_batch(&batch)?);
  }

  results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
  results.truncate(limit);
  Ok(results)
}

/// `embedding_model` of any stored row
pub async fn first_embedding_model(table: &Table) -> Result<Option<String>> {
  let mut stream = table.query().limit(1).execute().await.map_err(search_failed)?;

  while let Some(batch) = stream.next().await {
    let batch = batch.map_err(search_failed)?;
    if batch.num_rows() > 0 {
      let models = string_column(&batch, EMBEDDING_MODEL)?;
      return Ok(Some(models.value(0).to_string()));
    }
  }
  Ok(None)
}

fn decode_batch(batch: &RecordBatch) -> Result<Vec<VectorSearchResult>> {
  let ids = string_column(batch, ID)?;
  let titles = string_column(batch, TITLE)?;
  let contents = string_column(batch, CONTENT)?;
  let distances =
    batch.column_by_name(DISTANCE).and_then(|col| col.as_any().downcast_ref::<Float32Array>());

  Ok(
    (0..batch.num_rows())
      .map(|row| VectorSearchResult {
        id: ids.value(row).to_string(),
        title: titles.value(row).to_string(),
        content: contents.value(row).to_string(),
        similarity: distance_to_similarity(distances, row),
      })
      .collect(),
  )
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
  batch
    .column_by_name(name)
    .and_then(|col| col.as_any().downcast_ref::<StringArray>())
    .ok_or_else(|| DrafterError::index_unavailable(format!("result is missing '{name}' column")))
}

/// Cosine distance is `1 - cos`, so similarity is `1 - distance`
fn distance_to_similarity(distances: Option<&Float32Array>, row: usize) -> f32 {
  match distances {
    Some(d) if row < d.len() && !d.is_null(row) => 1.0 - d.value(row),
    _ => 0.0,
  }
}

fn search_failed(e: lancedb::Error) -> DrafterError {
  DrafterError::index_unavailable(format!("vector search failed: {e}"))
}
