//! Assemble the instruction payload sent to the generation oracle

use super::context::{ContractType, ReportContext};
use super::template::ReportTemplate;

/// Fills the report template from request context and retrieved playbooks
#[derive(Debug, Clone, Copy)]
pub struct ContextAssembler {
  template: ReportTemplate,
}

impl Default for ContextAssembler {
  fn default() -> Self {
    Self::new(ReportTemplate::V1)
  }
}

impl ContextAssembler {
  pub fn new(template: ReportTemplate) -> Self {
    Self { template }
  }

  pub fn template(&self) -> &ReportTemplate {
    &self.template
  }

  /// Build the prompt. Context fields land in the output byte-for-byte.
  pub fn assemble(&self, context: &ReportContext, retrieved: &[String]) -> String {
    let playbook = playbook_block(retrieved);
    let alert = render_alert(&context.alert_payload);
    let log = render_log_lines(&context.log_lines);
    let notice = contract_notice(context.contract_type());

    self.template.render(|slot| {
      let value = match slot {
        "user_query" => context.user_query.as_str(),
        "alert" => alert.as_str(),
        "log" => log.as_str(),
        "initial_analysis" => context.initial_analysis.as_str(),
        "customer_info" => context.customer_info.as_str(),
        "contract_notice" => notice.as_str(),
        "playbook" => playbook.as_str(),
        _ => return None,
      };
      Some(value.to_string())
    })
  }
}

/// Retrieved documents, most similar first, separated by a blank line
pub fn playbook_block(retrieved: &[String]) -> String {
  retrieved.join("\n\n")
}

/// A string payload is embedded as-is; structured payloads as pretty JSON
pub fn render_alert(payload: &serde_json::Value) -> String {
  match payload {
    serde_json::Value::Null => String::new(),
    serde_json::Value::String(raw) => raw.clone(),
    other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
  }
}

/// One tagged log line per line
pub fn render_log_lines(lines: &[String]) -> String {
  lines.join("\n")
}

/// States which policy branch applies when the contract can be read
pub fn contract_notice(contract: Option<ContractType>) -> String {
  match contract {
    Some(contract) => format!(
      "This customer has mdr_contract_type={}; apply the matching rule above.",
      contract.as_str()
    ),
    None => "The contract type could not be determined from the customer information; \
             treat it as mdr_contract_type=EDR unless the analyst states otherwise."
      .to_string(),
  }
}
