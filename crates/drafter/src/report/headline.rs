//! Read the `Title:` and `Date:` lines back out of a generated draft

use chrono::Local;

pub const DEFAULT_TITLE: &str = "Incident Report";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline {
  pub title: String,
  pub date: String,
}

/// Later non-empty `Title:`/`Date:` lines win; missing ones fall back to
/// [`DEFAULT_TITLE`] and today's date
pub fn extract(draft: &str) -> Headline {
  let mut title = None;
  let mut date = None;

  for line in draft.lines() {
    let line = line.trim().trim_start_matches(['*', '#', ' ']);
    if let Some(value) = value_after(line, "title:") {
      title = Some(value);
    } else if let Some(value) = value_after(line, "date:") {
      date = Some(value);
    }
  }

  Headline {
    title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
    date: date.unwrap_or_else(|| Local::now().format("%Y-%m-%d").to_string()),
  }
}

fn value_after(line: &str, label: &str) -> Option<String> {
  let head = line.get(..label.len())?;
  if !head.eq_ignore_ascii_case(label) {
    return None;
  }
  let value = line[label.len()..].trim().trim_matches('*').trim();
  (!value.is_empty()).then(|| value.to_string())
}

/// File-name friendly form of a title
pub fn slug(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    if ch.is_ascii_alphanumeric() {
      out.push(ch.to_ascii_lowercase());
    } else if !out.ends_with('_') && !out.is_empty() {
      out.push('_');
    }
  }
  let trimmed = out.trim_end_matches('_');
  if trimmed.is_empty() {
    "report".to_string()
  } else {
    trimmed.to_string()
  }
}

impl Headline {
  /// `<title-slug>_<date-slug>.md`
  pub fn file_name(&self) -> String {
    format!("{}_{}.md", slug(&self.title), slug(&self.date))
  }
}
