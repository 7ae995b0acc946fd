//! Request-scoped inputs to a report draft

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Everything the analyst supplies for one draft; dropped once the draft returns
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportContext {
  /// Retrieval query, usually the alert category
  pub user_query: String,
  /// Analyst's hypothesis, the basis of the alert summary
  pub initial_analysis: String,
  /// Customer and contract metadata, embedded verbatim
  pub customer_info: String,
  /// Log lines the analyst tagged as evidence
  pub log_lines: Vec<String>,
  /// The SIEM alert as received
  pub alert_payload: serde_json::Value,
}

/// MDR contract tier, gating what the SOC may remediate itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContractType {
  /// Endpoint actions only
  Edr,
  /// Cross-layer actions (network, cloud applications)
  Xdr,
}

// matches mdr_contract_type=EDR, "mdr_contract_type": "XDR", 'mdr_contract_type': 'edr'
static CONTRACT_PATTERN: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r#"(?i)mdr_contract_type['"]?\s*[:=]\s*['"]?\s*(EDR|XDR)\b"#)
    .expect("contract pattern is a valid regex")
});

impl ContractType {
  /// Find the contract tier in free-form customer info
  pub fn detect(customer_info: &str) -> Option<Self> {
    let captures = CONTRACT_PATTERN.captures(customer_info)?;
    match captures.get(1)?.as_str().to_ascii_uppercase().as_str() {
      "EDR" => Some(ContractType::Edr),
      "XDR" => Some(ContractType::Xdr),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      ContractType::Edr => "EDR",
      ContractType::Xdr => "XDR",
    }
  }
}

impl ReportContext {
  pub fn contract_type(&self) -> Option<ContractType> {
    ContractType::detect(&self.customer_info)
  }
}
