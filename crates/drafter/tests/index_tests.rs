use async_trait::async_trait;
use futures::future::join_all;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use drafter::playbook::load_documents;
use drafter::server::services::{
  HashingEmbedder, IndexEntry, MemoryVectorDatabase, PlaybookIndex, PopulateOutcome,
  VectorDatabase, VectorSearchResult,
};
use drafter::{DrafterError, Result};

fn fixture(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn corpus_len() -> usize {
  load_documents(&fixture("playbooks.json")).unwrap().len()
}

/// Memory store that yields inside every call and counts upserted rows, so
/// racing populate calls interleave as much as the runtime allows
struct SlowStore {
  inner: MemoryVectorDatabase,
  upserted: AtomicUsize,
}

impl SlowStore {
  fn new() -> Self {
    Self { inner: MemoryVectorDatabase::new("playbooks"), upserted: AtomicUsize::new(0) }
  }
}

#[async_trait]
impl VectorDatabase for SlowStore {
  fn collection(&self) -> String {
    self.inner.collection()
  }

  async fn ensure_collection(&self) -> Result<()> {
    tokio::time::sleep(Duration::from_millis(2)).await;
    self.inner.ensure_collection().await
  }

  async fn count(&self) -> Result<usize> {
    tokio::time::sleep(Duration::from_millis(2)).await;
    self.inner.count().await
  }

  async fn upsert(&self, entries: Vec<IndexEntry>) -> Result<()> {
    tokio::time::sleep(Duration::from_millis(5)).await;
    self.upserted.fetch_add(entries.len(), Ordering::SeqCst);
    self.inner.upsert(entries).await
  }

  async fn search(&self, embedding: &[f32], limit: usize) -> Result<Vec<VectorSearchResult>> {
    self.inner.search(embedding, limit).await
  }

  async fn embedding_model(&self) -> Result<Option<String>> {
    self.inner.embedding_model().await
  }

  async fn embedding_dimension(&self) -> Result<Option<usize>> {
    self.inner.embedding_dimension().await
  }

  async fn clear(&self) -> Result<()> {
    self.inner.clear().await
  }
}

/// A store whose backend is gone
struct UnreachableStore;

#[async_trait]
impl VectorDatabase for UnreachableStore {
  fn collection(&self) -> String {
    "playbooks".to_string()
  }

  async fn ensure_collection(&self) -> Result<()> {
    Err(DrafterError::index_unavailable("connection refused"))
  }

  async fn count(&self) -> Result<usize> {
    Err(DrafterError::index_unavailable("connection refused"))
  }

  async fn upsert(&self, _entries: Vec<IndexEntry>) -> Result<()> {
    Err(DrafterError::index_unavailable("connection refused"))
  }

  async fn search(&self, _embedding: &[f32], _limit: usize) -> Result<Vec<VectorSearchResult>> {
    Err(DrafterError::index_unavailable("connection refused"))
  }

  async fn embedding_model(&self) -> Result<Option<String>> {
    Err(DrafterError::index_unavailable("connection refused"))
  }

  async fn embedding_dimension(&self) -> Result<Option<usize>> {
    Err(DrafterError::index_unavailable("connection refused"))
  }

  async fn clear(&self) -> Result<()> {
    Err(DrafterError::index_unavailable("connection refused"))
  }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_populate_inserts_each_playbook_once() {
  let store = Arc::new(SlowStore::new());
  let index = Arc::new(PlaybookIndex::new(
    store.clone(),
    Arc::new(HashingEmbedder::new(256)),
    fixture("playbooks.json"),
  ));

  let calls = (0..16).map(|_| {
    let index = index.clone();
    tokio::spawn(async move { index.ensure_populated().await })
  });
  let outcomes: Vec<PopulateOutcome> =
    join_all(calls).await.into_iter().map(|joined| joined.unwrap().unwrap()).collect();

  let inserted = outcomes.iter().filter(|o| matches!(o, PopulateOutcome::Inserted { .. })).count();
  assert_eq!(inserted, 1);
  assert_eq!(store.count().await.unwrap(), corpus_len());
  assert_eq!(store.upserted.load(Ordering::SeqCst), corpus_len());
}

#[tokio::test]
async fn test_query_never_exceeds_k() {
  let index = PlaybookIndex::new(
    Arc::new(MemoryVectorDatabase::new("playbooks")),
    Arc::new(HashingEmbedder::new(256)),
    fixture("playbooks.json"),
  );
  index.ensure_populated().await.unwrap();

  for k in 0..=6 {
    let results = index.query("phishing", k).await.unwrap();
    assert_eq!(results.len(), k.min(corpus_len()), "k={k}");
  }
}

#[tokio::test]
async fn test_query_ranks_matching_playbook_first() {
  let index = PlaybookIndex::new(
    Arc::new(MemoryVectorDatabase::new("playbooks")),
    Arc::new(HashingEmbedder::new(256)),
    fixture("playbooks.json"),
  );

  let results = index.search("brute force failed sign-in", 2).await.unwrap();
  assert_eq!(results[0].id, "pb-bruteforce");
  assert_eq!(results[0].title, "Brute force");
  assert!(results[0].content.contains("Containment: Lock targeted accounts"));
  assert!(results[0].content.contains("Eradication: Enforce MFA on exposed sign-in endpoints"));
  assert!(results[0]
    .content
    .contains("No related alerts or anomalous activity observed for 48 hours."));
}

#[tokio::test]
async fn test_unreachable_store_is_index_unavailable() {
  let index = PlaybookIndex::new(
    Arc::new(UnreachableStore),
    Arc::new(HashingEmbedder::new(256)),
    fixture("playbooks.json"),
  );

  assert!(matches!(index.ensure_populated().await, Err(DrafterError::IndexUnavailable { .. })));
  assert!(matches!(index.query("phishing", 2).await, Err(DrafterError::IndexUnavailable { .. })));
}

#[tokio::test]
async fn test_empty_collection_never_returns_results() {
  let temp_dir = tempfile::TempDir::new().unwrap();
  let corpus = temp_dir.path().join("playbooks.json");
  std::fs::write(&corpus, "[]").unwrap();

  let index = PlaybookIndex::new(
    Arc::new(MemoryVectorDatabase::new("playbooks")),
    Arc::new(HashingEmbedder::new(256)),
    corpus,
  );
  assert!(index.query("phishing", 5).await.unwrap().is_empty());
}

#[cfg(feature = "lancedb-store")]
mod lancedb_store {
  use super::*;
  use drafter::server::services::lancedb::LanceDbVectorDatabase;
  use drafter::server::services::Embedder;
  use tempfile::TempDir;

  async fn open(data_dir: &std::path::Path) -> PlaybookIndex {
    let store = LanceDbVectorDatabase::new(data_dir, "soc_playbooks_test", 256).await.unwrap();
    PlaybookIndex::new(
      Arc::new(store),
      Arc::new(HashingEmbedder::new(256)),
      fixture("playbooks.json"),
    )
  }

  #[tokio::test]
  async fn test_reopened_collection_is_not_reingested() {
    let temp_dir = TempDir::new().unwrap();

    let first = open(temp_dir.path()).await;
    assert_eq!(
      first.ensure_populated().await.unwrap(),
      PopulateOutcome::Inserted { count: corpus_len() }
    );
    drop(first);

    let reopened = open(temp_dir.path()).await;
    assert_eq!(
      reopened.ensure_populated().await.unwrap(),
      PopulateOutcome::AlreadyPopulated { count: corpus_len() }
    );

    let results = reopened.search("phishing", 1).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "pb-phishing");
  }

  #[tokio::test]
  async fn test_reopen_with_other_embedder_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    open(temp_dir.path()).await.ensure_populated().await.unwrap();

    let store =
      LanceDbVectorDatabase::new(temp_dir.path(), "soc_playbooks_test", 256).await.unwrap();
    let index = PlaybookIndex::new(
      Arc::new(store),
      Arc::new(RenamedEmbedder("text-embedding-3-small@256", HashingEmbedder::new(256))),
      fixture("playbooks.json"),
    );
    assert!(matches!(
      index.query("phishing", 1).await,
      Err(DrafterError::EmbeddingMismatch { .. })
    ));
  }

  #[tokio::test]
  async fn test_upsert_is_idempotent_and_reset_clears() {
    let temp_dir = TempDir::new().unwrap();
    let store =
      LanceDbVectorDatabase::new(temp_dir.path(), "soc_playbooks_test", 256).await.unwrap();
    store.ensure_collection().await.unwrap();

    let entry = IndexEntry {
      id: "pb1".to_string(),
      title: "Phishing".to_string(),
      content: "desc".to_string(),
      embedding: HashingEmbedder::new(256).embed_text("desc"),
      embedding_model: "hashing-256".to_string(),
    };
    store.upsert(vec![entry.clone()]).await.unwrap();
    store.upsert(vec![entry]).await.unwrap();
    assert_eq!(store.count().await.unwrap(), 1);

    store.clear().await.unwrap();
    assert_eq!(store.count().await.unwrap(), 0);
  }

  #[tokio::test]
  async fn test_reopen_with_other_width_is_refused() {
    let temp_dir = TempDir::new().unwrap();
    open(temp_dir.path()).await.ensure_populated().await.unwrap();

    let store =
      LanceDbVectorDatabase::new(temp_dir.path(), "soc_playbooks_test", 128).await.unwrap();
    let index = PlaybookIndex::new(
      Arc::new(store),
      Arc::new(RenamedEmbedder("hashing-256", HashingEmbedder::new(128))),
      fixture("playbooks.json"),
    );
    let err = index.query("phishing", 1).await.unwrap_err();
    assert!(matches!(err, DrafterError::EmbeddingMismatch { .. }));
    assert!(err.to_string().contains("256 dims"));
  }

  /// Hashing vectors reported under another identity
  struct RenamedEmbedder(&'static str, HashingEmbedder);

  #[async_trait]
  impl Embedder for RenamedEmbedder {
    fn model_id(&self) -> String {
      self.0.to_string()
    }

    fn dimension(&self) -> usize {
      self.1.dimension()
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
      self.1.embed(text).await
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
      self.1.embed_batch(texts).await
    }
  }
}
