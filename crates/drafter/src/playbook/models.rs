//! Playbook records as they appear in the corpus file

use serde::{Deserialize, Serialize};

/// One incident-response playbook
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlaybookRecord {
  /// Required; checked during normalization rather than by serde so the
  /// failure can name the offending record
  #[serde(default)]
  pub id: Option<String>,

  #[serde(default, rename = "playbook_name", alias = "title")]
  pub title: Option<String>,

  #[serde(default)]
  pub description: Option<String>,

  #[serde(default)]
  pub recommended_actions: Option<RecommendedActions>,
}

/// Ordered actions per response phase; phases outside the fixed set are ignored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendedActions {
  #[serde(default)]
  pub containment: Option<Vec<ActionItem>>,
  #[serde(default)]
  pub eradication: Option<Vec<ActionItem>>,
  #[serde(default)]
  pub recovery_and_restore: Option<Vec<ActionItem>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionItem {
  #[serde(default)]
  pub action: Option<String>,
  #[serde(default)]
  pub description: Option<String>,
}

/// The fixed response phases, in the order they are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
  Containment,
  Eradication,
  RecoveryAndRestore,
}

impl Phase {
  pub const ALL: [Phase; 3] = [Phase::Containment, Phase::Eradication, Phase::RecoveryAndRestore];

  /// Key used in `recommended_actions`
  pub fn key(self) -> &'static str {
    match self {
      Phase::Containment => "containment",
      Phase::Eradication => "eradication",
      Phase::RecoveryAndRestore => "recovery_and_restore",
    }
  }

  /// Title-cased label used in remediation lines
  pub fn title(self) -> &'static str {
    match self {
      Phase::Containment => "Containment",
      Phase::Eradication => "Eradication",
      Phase::RecoveryAndRestore => "Recovery And Restore",
    }
  }
}

impl RecommendedActions {
  /// Actions for a phase; a missing or null phase reads as empty
  pub fn phase(&self, phase: Phase) -> &[ActionItem] {
    let items = match phase {
      Phase::Containment => &self.containment,
      Phase::Eradication => &self.eradication,
      Phase::RecoveryAndRestore => &self.recovery_and_restore,
    };
    items.as_deref().unwrap_or_default()
  }
}

impl ActionItem {
  pub fn new(action: &str, description: &str) -> Self {
    Self { action: Some(action.to_string()), description: Some(description.to_string()) }
  }

  /// Trimmed action text, empty when absent
  pub fn action_text(&self) -> &str {
    self.action.as_deref().unwrap_or_default().trim()
  }

  /// Trimmed description text, empty when absent
  pub fn description_text(&self) -> &str {
    self.description.as_deref().unwrap_or_default().trim()
  }
}

/// Flattened, index-ready form of a playbook
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedDocument {
  pub id: String,
  pub title: String,
  pub content: String,
  /// Derived verification lines, also embedded in `content`
  pub verification: Vec<String>,
}
