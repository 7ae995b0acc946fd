//! Flatten a playbook record into the single text document that gets embedded

use super::models::{NormalizedDocument, Phase, PlaybookRecord};
use crate::error::{DrafterError, Result};

pub const UNTITLED_PLAYBOOK: &str = "Untitled Playbook";

/// Used when a playbook lists no recovery actions
pub const GENERIC_VERIFICATION: [&str; 3] = [
  "No related alerts or anomalous activity observed for 48 hours.",
  "All containment and eradication steps completed and documented.",
  "Affected accounts/devices restored to known-good state and monitored.",
];

/// Build the index document for a record. Pure: same record, same bytes.
pub fn normalize(record: &PlaybookRecord) -> Result<NormalizedDocument> {
  let id = match record.id.as_deref().map(str::trim) {
    Some(id) if !id.is_empty() => id.to_string(),
    _ => return Err(DrafterError::schema("playbook record has no 'id'")),
  };

  let title = record.title.clone().unwrap_or_else(|| UNTITLED_PLAYBOOK.to_string());
  let description = record.description.as_deref().unwrap_or_default();

  let remediation = remediation_lines(record);
  let verification = verification_lines(record);

  let content = format!(
    "{description}\nRemediation:\n{}\nVerification:\n{}",
    remediation.join("\n"),
    verification.join("\n")
  );

  Ok(NormalizedDocument { id, title, content, verification })
}

/// `<Phase>: <action> — <description>` for every action, phases in fixed order
pub fn remediation_lines(record: &PlaybookRecord) -> Vec<String> {
  let Some(actions) = &record.recommended_actions else {
    return Vec::new();
  };

  Phase::ALL
    .iter()
    .flat_map(|&phase| {
      actions.phase(phase).iter().filter_map(move |item| {
        match (item.action_text(), item.description_text()) {
          ("", "") => None,
          (action, "") => Some(format!("{}: {action}", phase.title())),
          ("", description) => Some(format!("{}: {description}", phase.title())),
          (action, description) => Some(format!("{}: {action} — {description}", phase.title())),
        }
      })
    })
    .collect()
}

/// One `Completed: <action>` per recovery action, or the generic checks
pub fn verification_lines(record: &PlaybookRecord) -> Vec<String> {
  let completed: Vec<String> = record
    .recommended_actions
    .as_ref()
    .map(|actions| {
      actions
        .phase(Phase::RecoveryAndRestore)
        .iter()
        .map(|item| item.action_text())
        .filter(|action| !action.is_empty())
        .map(|action| format!("Completed: {action}"))
        .collect()
    })
    .unwrap_or_default();

  if completed.is_empty() {
    GENERIC_VERIFICATION.iter().map(|line| line.to_string()).collect()
  } else {
    completed
  }
}
