use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use drafter::playbook::normalizer::GENERIC_VERIFICATION;
use drafter::playbook::{normalize, parse_corpus};
use drafter::report::template::{ALL_ACTIONS_DONE_FALLBACK, NO_SOC_ACTIONS_FALLBACK};
use drafter::report::{AuditTrail, ContextAssembler, ReportContext};
use drafter::server::services::{Generator, HashingEmbedder, MemoryVectorDatabase, PlaybookIndex};
use drafter::{DrafterError, ReportService, Result};

const SCENARIO_CORPUS: &str = r#"[
  {"id": "pb1", "playbook_name": "Phishing", "description": "desc",
   "recommended_actions": {
     "containment": [{"action": "Isolate host", "description": "stop spread"}]
   }}
]"#;

/// Records every prompt and answers with a canned draft
struct RecordingGenerator {
  prompts: Mutex<Vec<String>>,
  reply: Result<String>,
}

impl RecordingGenerator {
  fn replying(reply: Result<String>) -> Arc<Self> {
    Arc::new(Self { prompts: Mutex::new(Vec::new()), reply })
  }
}

#[async_trait]
impl Generator for RecordingGenerator {
  async fn generate(&self, prompt: &str) -> Result<String> {
    self.prompts.lock().unwrap().push(prompt.to_string());
    match &self.reply {
      Ok(text) => Ok(text.clone()),
      Err(_) => Err(DrafterError::generation_unavailable("401 Unauthorized")),
    }
  }
}

async fn scenario_index() -> Arc<PlaybookIndex> {
  let index = Arc::new(PlaybookIndex::new(
    Arc::new(MemoryVectorDatabase::new("soc_playbooks_v6")),
    Arc::new(HashingEmbedder::new(256)),
    "unused.json",
  ));
  index.ensure_populated_from(&parse_corpus(SCENARIO_CORPUS).unwrap()).await.unwrap();
  index
}

fn context(customer_info: &str) -> ReportContext {
  ReportContext {
    user_query: "phishing".to_string(),
    initial_analysis: "Credential harvesting page visited from WIN-123.".to_string(),
    customer_info: customer_info.to_string(),
    log_lines: vec![
      "2026-10-17T09:12:44Z WIN-123 chrome.exe GET http://login-acme.example".to_string()
    ],
    alert_payload: serde_json::json!({"rule": "Suspicious login page", "host": "WIN-123"}),
  }
}

#[tokio::test]
async fn test_phishing_query_returns_containment_line() {
  let index = scenario_index().await;

  let results = index.query("phishing", 1).await.unwrap();
  assert_eq!(results.len(), 1);
  assert!(results[0].contains("Containment: Isolate host — stop spread"));
}

#[test]
fn test_empty_recovery_gets_generic_verification() {
  let corpus = parse_corpus(
    r#"[{"id": "pb9", "playbook_name": "Malware", "description": "d",
         "recommended_actions": {"recovery_and_restore": []}}]"#,
  )
  .unwrap();
  let document = normalize(&corpus[0]).unwrap();

  assert_eq!(document.verification, GENERIC_VERIFICATION.map(String::from).to_vec());
}

#[tokio::test]
async fn test_draft_sends_assembled_prompt_and_returns_raw_text() {
  let outputs = tempfile::TempDir::new().unwrap();
  let generator = RecordingGenerator::replying(Ok("Title: Phishing on WIN-123\n".to_string()));
  let service = ReportService::new(
    scenario_index().await,
    ContextAssembler::default(),
    generator.clone(),
    AuditTrail::new(outputs.path()),
    2,
  );

  let ctx = context("ACME Corp, mdr_contract_type=EDR");
  let draft = service.draft(&ctx).await.unwrap();
  assert_eq!(draft, "Title: Phishing on WIN-123\n");

  let prompts = generator.prompts.lock().unwrap();
  assert_eq!(prompts.len(), 1);
  let prompt = &prompts[0];
  assert!(prompt.contains("ACME Corp, mdr_contract_type=EDR"));
  assert!(prompt.contains(&ctx.initial_analysis));
  assert!(prompt.contains(&ctx.log_lines[0]));
  assert!(prompt.contains("Containment: Isolate host — stop spread"));
  assert!(prompt.contains(NO_SOC_ACTIONS_FALLBACK));

  let snapshot = std::fs::read_to_string(service.audit().prompt_path()).unwrap();
  assert_eq!(&snapshot, prompt);
}

#[tokio::test]
async fn test_xdr_prompt_offers_completed_fallback() {
  let outputs = tempfile::TempDir::new().unwrap();
  let service = ReportService::new(
    scenario_index().await,
    ContextAssembler::default(),
    RecordingGenerator::replying(Ok(String::new())),
    AuditTrail::new(outputs.path()),
    2,
  );

  let prompt = service.prompt(&context("Globex, mdr_contract_type=XDR")).await.unwrap();
  assert!(prompt.contains("mdr_contract_type=XDR"));
  assert!(prompt.contains(ALL_ACTIONS_DONE_FALLBACK));
}

#[tokio::test]
async fn test_generation_failure_is_not_a_draft() {
  let outputs = tempfile::TempDir::new().unwrap();
  let service = ReportService::new(
    scenario_index().await,
    ContextAssembler::default(),
    RecordingGenerator::replying(Err(DrafterError::generation_unavailable("down"))),
    AuditTrail::new(outputs.path()),
    2,
  );

  let err = service.draft(&context("ACME")).await.unwrap_err();
  assert!(matches!(err, DrafterError::GenerationUnavailable { .. }));
  assert!(!service.audit().response_path().exists());
}
