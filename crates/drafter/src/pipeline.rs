//! Report drafting pipeline
//!
//! `ReportService` is built once at startup and shared; it holds the index,
//! the assembler, the generation client and the audit trail. Nothing here is
//! global, so tests and the CLI can build as many as they like.

use std::sync::Arc;

use crate::config::{self, DrafterConfig};
use crate::error::Result;
use crate::report::{AuditTrail, ContextAssembler, ReportContext};
use crate::server::services::embeddings;
use crate::server::services::{
  Generator, MemoryVectorDatabase, OpenAiGenerator, PlaybookIndex, VectorDatabase,
};

pub struct ReportService {
  index: Arc<PlaybookIndex>,
  assembler: ContextAssembler,
  generator: Arc<dyn Generator>,
  audit: AuditTrail,
  n_results: usize,
}

impl ReportService {
  pub fn new(
    index: Arc<PlaybookIndex>,
    assembler: ContextAssembler,
    generator: Arc<dyn Generator>,
    audit: AuditTrail,
    n_results: usize,
  ) -> Self {
    Self { index, assembler, generator, audit, n_results }
  }

  /// Wire everything from configuration. `ephemeral` keeps the index in memory.
  pub async fn from_config(config: &DrafterConfig, ephemeral: bool) -> Result<Self> {
    let index = open_index(config, ephemeral).await?;
    let generator = generator_from_config(config)?;
    Ok(Self::new(
      index,
      ContextAssembler::default(),
      generator,
      AuditTrail::new(&config.audit.outputs_dir),
      config.index.n_results,
    ))
  }

  pub fn index(&self) -> &Arc<PlaybookIndex> {
    &self.index
  }

  pub fn audit(&self) -> &AuditTrail {
    &self.audit
  }

  pub fn n_results(&self) -> usize {
    self.n_results
  }

  /// Retrieve playbooks for the request and assemble the prompt
  pub async fn prompt(&self, context: &ReportContext) -> Result<String> {
    build_prompt(&self.index, &self.assembler, context, self.n_results).await
  }

  /// Full request: retrieve, assemble, snapshot the prompt, generate,
  /// snapshot the response. Any failure aborts with no partial draft.
  pub async fn draft(&self, context: &ReportContext) -> Result<String> {
    let prompt = self.prompt(context).await?;
    self.audit.record_prompt(&prompt).await?;

    let draft = self.generator.generate(&prompt).await?;
    self.audit.record_response(&draft).await?;
    Ok(draft)
  }
}

/// Query the index for `context.user_query` and fill the template
pub async fn build_prompt(
  index: &PlaybookIndex,
  assembler: &ContextAssembler,
  context: &ReportContext,
  n_results: usize,
) -> Result<String> {
  let retrieved = index.query(&context.user_query, n_results).await?;
  Ok(assembler.assemble(context, &retrieved))
}

/// Open the configured collection with the configured embedder
pub async fn open_index(config: &DrafterConfig, ephemeral: bool) -> Result<Arc<PlaybookIndex>> {
  let embedder = embeddings::from_config(&config.embedding)?;
  let store = open_store(config, ephemeral, embedder.dimension()).await?;
  Ok(Arc::new(PlaybookIndex::new(store, embedder, &config.index.playbooks_file)))
}

#[cfg(feature = "lancedb-store")]
async fn open_store(
  config: &DrafterConfig,
  ephemeral: bool,
  dimension: usize,
) -> Result<Arc<dyn VectorDatabase>> {
  if ephemeral {
    return Ok(Arc::new(MemoryVectorDatabase::new(&config.index.collection)));
  }
  let store = crate::server::services::lancedb::LanceDbVectorDatabase::new(
    &config.index.data_dir,
    &config.index.collection,
    dimension,
  )
  .await?;
  Ok(Arc::new(store))
}

#[cfg(not(feature = "lancedb-store"))]
async fn open_store(
  config: &DrafterConfig,
  ephemeral: bool,
  _dimension: usize,
) -> Result<Arc<dyn VectorDatabase>> {
  if !ephemeral {
    chronicle::warn!("Built without lancedb-store; the playbook index will not persist");
  }
  Ok(Arc::new(MemoryVectorDatabase::new(&config.index.collection)))
}

pub fn generator_from_config(config: &DrafterConfig) -> Result<Arc<dyn Generator>> {
  let generator = OpenAiGenerator::new(&config.generation, config::api_key()?)?;
  Ok(Arc::new(generator))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::error::DrafterError;
  use crate::playbook::PlaybookRecord;
  use crate::report::audit::{PROMPT_SNAPSHOT, RESPONSE_SNAPSHOT};
  use crate::server::services::generation::MockGenerator;
  use crate::server::services::HashingEmbedder;
  use mockall::predicate::function;
  use tempfile::TempDir;

  fn records() -> Vec<PlaybookRecord> {
    serde_json::from_value(serde_json::json!([{
      "id": "pb1",
      "playbook_name": "Phishing",
      "description": "desc",
      "recommended_actions": {
        "containment": [{"action": "Isolate host", "description": "stop spread"}]
      }
    }]))
    .unwrap()
  }

  async fn service(generator: MockGenerator, outputs: &TempDir) -> ReportService {
    let index = Arc::new(PlaybookIndex::new(
      Arc::new(MemoryVectorDatabase::new("playbooks")),
      Arc::new(HashingEmbedder::new(256)),
      "unused.json",
    ));
    index.ensure_populated_from(&records()).await.unwrap();

    ReportService::new(
      index,
      ContextAssembler::default(),
      Arc::new(generator),
      AuditTrail::new(outputs.path()),
      2,
    )
  }

  fn context() -> ReportContext {
    ReportContext {
      user_query: "phishing".to_string(),
      initial_analysis: "User entered credentials on a lookalike domain.".to_string(),
      customer_info: "ACME Corp, mdr_contract_type=EDR".to_string(),
      log_lines: vec!["08:01 login from 198.51.100.4".to_string()],
      alert_payload: serde_json::json!({"rule": "Phishing link clicked"}),
    }
  }

  #[tokio::test]
  async fn test_draft_records_prompt_and_response() {
    let outputs = TempDir::new().unwrap();
    let mut generator = MockGenerator::new();
    generator
      .expect_generate()
      .with(function(|prompt: &str| {
        prompt.contains("Containment: Isolate host — stop spread")
          && prompt.contains("ACME Corp, mdr_contract_type=EDR")
      }))
      .times(1)
      .returning(|_| Ok("Title: Phishing\nDate: 2026-10-17".to_string()));

    let service = service(generator, &outputs).await;
    let draft = service.draft(&context()).await.unwrap();

    assert_eq!(draft, "Title: Phishing\nDate: 2026-10-17");
    let prompt = std::fs::read_to_string(outputs.path().join(PROMPT_SNAPSHOT)).unwrap();
    assert!(prompt.contains("User entered credentials on a lookalike domain."));
    let response = std::fs::read_to_string(outputs.path().join(RESPONSE_SNAPSHOT)).unwrap();
    assert_eq!(response, draft);
  }

  #[tokio::test]
  async fn test_generation_failure_keeps_prompt_but_no_response() {
    let outputs = TempDir::new().unwrap();
    let mut generator = MockGenerator::new();
    generator.expect_generate().returning(|_| Err(DrafterError::generation_timeout(1200)));

    let service = service(generator, &outputs).await;
    let err = service.draft(&context()).await.unwrap_err();

    assert!(matches!(err, DrafterError::GenerationTimeout { seconds: 1200 }));
    assert!(outputs.path().join(PROMPT_SNAPSHOT).exists());
    assert!(!outputs.path().join(RESPONSE_SNAPSHOT).exists());
  }

  #[tokio::test]
  async fn test_prompt_does_not_call_generator() {
    let outputs = TempDir::new().unwrap();
    let mut generator = MockGenerator::new();
    generator.expect_generate().never();

    let service = service(generator, &outputs).await;
    let prompt = service.prompt(&context()).await.unwrap();

    assert!(prompt.contains("08:01 login from 198.51.100.4"));
    assert!(!outputs.path().join(PROMPT_SNAPSHOT).exists());
  }
}
