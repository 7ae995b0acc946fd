//! Playbook index manager
//!
//! Owns the vector collection and the embedder used for it. Population is
//! serialised behind a mutex and checks emptiness inside the lock, so
//! `ensure_populated` can be called on every request and concurrent first
//! requests insert each playbook exactly once.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::embeddings::SharedEmbedder;
use super::vector_database::{IndexEntry, VectorDatabase, VectorSearchResult};
use crate::error::{DrafterError, Result};
use crate::playbook::{load_documents, normalize_corpus, NormalizedDocument, PlaybookRecord};

/// Documents embedded per request to the embedding backend
const EMBED_BATCH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopulateOutcome {
  /// The collection already held entries; nothing was read or written
  AlreadyPopulated { count: usize },
  /// The corpus was ingested into an empty collection
  Inserted { count: usize },
}

impl PopulateOutcome {
  pub fn count(&self) -> usize {
    match self {
      Self::AlreadyPopulated { count } | Self::Inserted { count } => *count,
    }
  }
}

pub struct PlaybookIndex {
  store: Arc<dyn VectorDatabase>,
  embedder: SharedEmbedder,
  corpus_path: PathBuf,
  populate_lock: Mutex<()>,
  populated: AtomicBool,
  /// Width of the stored embeddings; 0 until known
  indexed_dimension: AtomicUsize,
}

impl PlaybookIndex {
  pub fn new(
    store: Arc<dyn VectorDatabase>,
    embedder: SharedEmbedder,
    corpus_path: impl Into<PathBuf>,
  ) -> Self {
    Self {
      store,
      embedder,
      corpus_path: corpus_path.into(),
      populate_lock: Mutex::new(()),
      populated: AtomicBool::new(false),
      indexed_dimension: AtomicUsize::new(0),
    }
  }

  pub fn collection(&self) -> String {
    self.store.collection()
  }

  pub fn corpus_path(&self) -> &Path {
    &self.corpus_path
  }

  pub fn embedding_model(&self) -> String {
    self.embedder.model_id()
  }

  pub fn is_populated(&self) -> bool {
    self.populated.load(Ordering::Acquire)
  }

  pub async fn count(&self) -> Result<usize> {
    self.store.count().await
  }

  /// Populate from the configured corpus file if the collection is empty
  pub async fn ensure_populated(&self) -> Result<PopulateOutcome> {
    let path = self.corpus_path.clone();
    self.populate_with(move || load_documents(&path)).await
  }

  /// Populate from already-parsed records if the collection is empty
  pub async fn ensure_populated_from(&self, records: &[PlaybookRecord]) -> Result<PopulateOutcome> {
    self.populate_with(|| normalize_corpus(records)).await
  }

  async fn populate_with<F>(&self, documents: F) -> Result<PopulateOutcome>
  where
    F: FnOnce() -> Result<Vec<NormalizedDocument>>,
  {
    let _guard = self.populate_lock.lock().await;

    self.store.ensure_collection().await?;
    let existing = self.store.count().await?;
    if existing > 0 {
      self.check_embedding_model().await?;
      self.populated.store(true, Ordering::Release);
      return Ok(PopulateOutcome::AlreadyPopulated { count: existing });
    }

    // the whole corpus is validated before anything is written
    let documents = documents()?;
    let inserted = self.insert_documents(&documents).await?;

    self.populated.store(true, Ordering::Release);
    chronicle::success!(&format!(
      "Indexed {inserted} playbooks into '{}'",
      self.store.collection()
    ));
    Ok(PopulateOutcome::Inserted { count: inserted })
  }

  async fn insert_documents(&self, documents: &[NormalizedDocument]) -> Result<usize> {
    let model = self.embedder.model_id();
    let mut entries = Vec::with_capacity(documents.len());

    for chunk in documents.chunks(EMBED_BATCH) {
      let texts: Vec<String> = chunk.iter().map(|doc| doc.content.clone()).collect();
      let embeddings = self.embedder.embed_batch(&texts).await?;
      if embeddings.len() != chunk.len() {
        return Err(DrafterError::embedding(format!(
          "expected {} embeddings, got {}",
          chunk.len(),
          embeddings.len()
        )));
      }

      entries.extend(chunk.iter().zip(embeddings).map(|(doc, embedding)| IndexEntry {
        id: doc.id.clone(),
        title: doc.title.clone(),
        content: doc.content.clone(),
        embedding,
        embedding_model: model.clone(),
      }));
    }

    let count = entries.len();
    let dimension = entries.first().map_or(0, |entry| entry.embedding.len());
    self.store.upsert(entries).await?;
    self.indexed_dimension.store(dimension, Ordering::Release);
    Ok(count)
  }

  /// The stored entries must come from the active embedder: same identity
  /// and same vector width
  async fn check_embedding_model(&self) -> Result<()> {
    let active = self.embedder.model_id();
    let indexed = self.store.embedding_model().await?;
    if let Some(indexed) = indexed.filter(|indexed| *indexed != active) {
      return Err(DrafterError::embedding_mismatch(indexed, active));
    }

    let Some(stored) = self.store.embedding_dimension().await? else {
      return Ok(());
    };
    let width = self.embedder.dimension();
    if stored != width {
      return Err(DrafterError::embedding_mismatch(
        format!("{active} ({stored} dims)"),
        format!("{active} ({width} dims)"),
      ));
    }
    self.indexed_dimension.store(stored, Ordering::Release);
    Ok(())
  }

  /// Make sure a query has something to run against. A corpus that cannot be
  /// loaded before the first successful population is an `EmptyCorpus`.
  async fn ensure_ready(&self) -> Result<()> {
    if self.is_populated() {
      return Ok(());
    }
    match self.ensure_populated().await {
      Ok(_) => Ok(()),
      Err(DrafterError::CorpusUnreadable { path, message }) => {
        Err(DrafterError::empty_corpus(format!("{path}: {message}")))
      }
      Err(e) => Err(e),
    }
  }

  /// Up to `k` documents, most similar first
  pub async fn search(&self, text: &str, k: usize) -> Result<Vec<VectorSearchResult>> {
    self.ensure_ready().await?;
    if k == 0 {
      return Ok(Vec::new());
    }

    let embedding = self.embedder.embed(text).await?;
    let indexed = self.indexed_dimension.load(Ordering::Acquire);
    if indexed != 0 && embedding.len() != indexed {
      let model = self.embedder.model_id();
      return Err(DrafterError::embedding_mismatch(
        format!("{model} ({indexed} dims)"),
        format!("{model} ({} dims)", embedding.len()),
      ));
    }

    let mut results = self.store.search(&embedding, k).await?;
    results.truncate(k);
    Ok(results)
  }

  /// Content of up to `k` documents, most similar first
  pub async fn query(&self, text: &str, k: usize) -> Result<Vec<String>> {
    let results = self.search(text, k).await?;
    Ok(results.into_iter().map(|r| r.content).collect())
  }

  /// Drop every entry; the next `ensure_populated` re-ingests the corpus
  pub async fn reset(&self) -> Result<()> {
    let _guard = self.populate_lock.lock().await;
    self.store.clear().await?;
    self.populated.store(false, Ordering::Release);
    self.indexed_dimension.store(0, Ordering::Release);
    chronicle::warn!(&format!("Cleared collection '{}'", self.store.collection()));
    Ok(())
  }
}
