//! Arrow schema of the playbook table

use arrow::datatypes::{DataType, Field, Schema, SchemaRef};
use std::sync::Arc;

pub const ID: &str = "id";
pub const TITLE: &str = "title";
pub const CONTENT: &str = "content";
pub const EMBEDDING: &str = "embedding";
pub const EMBEDDING_MODEL: &str = "embedding_model";
pub const INDEXED_AT: &str = "indexed_at";
/// Column LanceDB adds to vector search results
pub const DISTANCE: &str = "_distance";

pub fn playbook_schema(dimension: usize) -> SchemaRef {
  Arc::new(Schema::new(vec![
    Field::new(ID, DataType::Utf8, false),
    Field::new(TITLE, DataType::Utf8, false),
    Field::new(CONTENT, DataType::Utf8, false),
    Field::new(
      EMBEDDING,
      DataType::FixedSizeList(
        Arc::new(Field::new("item", DataType::Float32, true)),
        dimension as i32,
      ),
      false,
    ),
    Field::new(EMBEDDING_MODEL, DataType::Utf8, false),
    Field::new(INDEXED_AT, DataType::Utf8, false),
  ]))
}

/// Width of the embedding column, if the schema has one
pub fn embedding_dimension(schema: &Schema) -> Option<usize> {
  match schema.field_with_name(EMBEDDING).ok()?.data_type() {
    DataType::FixedSizeList(_, width) => usize::try_from(*width).ok(),
    _ => None,
  }
}
