//! Reading and validating the playbook corpus
//!
//! Ingestion is all-or-nothing: a record without an id, or an id seen
//! twice, rejects the whole corpus so the index never holds a partial set.

use std::collections::HashSet;
use std::path::Path;

use super::models::{NormalizedDocument, PlaybookRecord};
use super::normalizer::normalize;
use crate::error::{DrafterError, Result};

/// Parse the corpus file into records
pub fn load_corpus(path: &Path) -> Result<Vec<PlaybookRecord>> {
  let content = std::fs::read_to_string(path)
    .map_err(|e| DrafterError::corpus_unreadable(path.display().to_string(), e.to_string()))?;
  parse_corpus(&content)
}

/// Parse a JSON array of playbook records, naming the first bad record
pub fn parse_corpus(content: &str) -> Result<Vec<PlaybookRecord>> {
  let values: Vec<serde_json::Value> = serde_json::from_str(content)
    .map_err(|e| DrafterError::schema(format!("corpus is not a JSON array of records: {e}")))?;

  values
    .into_iter()
    .enumerate()
    .map(|(index, value)| {
      serde_json::from_value::<PlaybookRecord>(value)
        .map_err(|e| DrafterError::schema(format!("record #{index}: {e}")))
    })
    .collect()
}

/// Normalize every record, failing on the first schema error or duplicate id
pub fn normalize_corpus(records: &[PlaybookRecord]) -> Result<Vec<NormalizedDocument>> {
  let mut seen = HashSet::new();
  let mut documents = Vec::with_capacity(records.len());

  for (index, record) in records.iter().enumerate() {
    let document = normalize(record).map_err(|e| match e {
      DrafterError::Schema { message } => {
        DrafterError::schema(format!("record #{index}: {message}"))
      }
      other => other,
    })?;

    if !seen.insert(document.id.clone()) {
      return Err(DrafterError::duplicate_playbook(document.id));
    }
    documents.push(document);
  }

  Ok(documents)
}

/// Load and normalize in one step
pub fn load_documents(path: &Path) -> Result<Vec<NormalizedDocument>> {
  normalize_corpus(&load_corpus(path)?)
}
