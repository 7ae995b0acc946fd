//! Turn an incoming draft request body into a [`ReportContext`]
//!
//! Two spellings are accepted: the service field names (`user_query`,
//! `customer_info`, `alert_payload`) and the envelope the analysis UI posts
//! (`type`, `Customer`, `siem_alert`). When the query or customer are not
//! given at the top level they are looked up inside the alert's item list.

use serde_json::{Map, Value};

use super::context::ReportContext;
use crate::error::{DrafterError, Result};

const USER_QUERY_KEYS: [&str; 2] = ["user_query", "type"];
const CUSTOMER_KEYS: [&str; 2] = ["customer_info", "Customer"];
const ALERT_KEYS: [&str; 2] = ["alert_payload", "siem_alert"];

/// Parse a raw JSON request body
pub fn context_from_slice(body: &[u8]) -> Result<ReportContext> {
  let value: Value = serde_json::from_slice(body)
    .map_err(|e| DrafterError::invalid_request(format!("bad json: {e}")))?;
  context_from_value(value)
}

/// Build the context from an already-parsed body
pub fn context_from_value(value: Value) -> Result<ReportContext> {
  let Value::Object(body) = value else {
    return Err(DrafterError::invalid_request("request body must be a JSON object"));
  };

  let alert_payload = first_present(&body, &ALERT_KEYS).cloned().unwrap_or(Value::Null);
  let alert_items = alert_items(&alert_payload);

  let user_query = first_present(&body, &USER_QUERY_KEYS)
    .or_else(|| find_in_items(alert_items, &USER_QUERY_KEYS))
    .map(text_of)
    .unwrap_or_default();

  let customer_info = first_present(&body, &CUSTOMER_KEYS)
    .or_else(|| find_in_items(alert_items, &CUSTOMER_KEYS))
    .map(text_of)
    .unwrap_or_default();

  let initial_analysis = body.get("initial_analysis").map(text_of).unwrap_or_default();
  let log_lines = body.get("log_lines").map(lines_of).unwrap_or_default();

  Ok(ReportContext { user_query, initial_analysis, customer_info, log_lines, alert_payload })
}

/// Empty strings, arrays and objects count as absent, like a missing key
fn is_present(value: &Value) -> bool {
  match value {
    Value::Null => false,
    Value::String(s) => !s.is_empty(),
    Value::Array(items) => !items.is_empty(),
    Value::Object(map) => !map.is_empty(),
    _ => true,
  }
}

fn first_present<'a>(body: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
  keys.iter().filter_map(|key| body.get(*key)).find(|value| is_present(value))
}

/// Items of `{"raw": [...]}` or of a bare list; anything else has none
fn alert_items(alert: &Value) -> &[Value] {
  match alert {
    Value::Object(map) => match map.get("raw") {
      Some(Value::Array(items)) => items,
      _ => &[],
    },
    Value::Array(items) => items,
    _ => &[],
  }
}

fn find_in_items<'a>(items: &'a [Value], keys: &[&str]) -> Option<&'a Value> {
  items
    .iter()
    .filter_map(Value::as_object)
    .find_map(|item| keys.iter().find_map(|key| item.get(*key)))
    .filter(|value| is_present(value))
}

/// Strings verbatim, everything else as compact JSON
fn text_of(value: &Value) -> String {
  match value {
    Value::Null => String::new(),
    Value::String(s) => s.clone(),
    other => other.to_string(),
  }
}

fn lines_of(value: &Value) -> Vec<String> {
  match value {
    Value::Null => Vec::new(),
    Value::Array(items) => items.iter().map(text_of).collect(),
    other => vec![text_of(other)],
  }
}
