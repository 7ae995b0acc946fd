//! Persistent structured logs for the drafting service
//!
//! Entries are appended to a JSONL file, one object per line. The store is
//! cheap to clone and serialises writers behind an async mutex, so request
//! handlers can share a single instance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

#[cfg(feature = "schemars")]
use schemars::JsonSchema;

// Types
// =====

/// Request context attached to a log entry
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub struct LogContext {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub request_id: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub method: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub path: Option<String>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub user_agent: Option<String>,

  /// Request duration in milliseconds
  #[serde(skip_serializing_if = "Option::is_none")]
  pub duration_ms: Option<f64>,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub status_code: Option<u16>,
}

/// One structured log line
#[derive(Debug, Serialize, Deserialize, Clone)]
#[cfg_attr(feature = "schemars", derive(JsonSchema))]
pub struct LogEntry {
  pub timestamp: DateTime<Utc>,
  pub level: String,
  pub message: String,
  pub component: String,

  #[serde(skip_serializing_if = "Option::is_none")]
  pub context: Option<LogContext>,
}

struct Inner {
  path: PathBuf,
  silent: bool,
}

/// Thread-safe JSONL log store
#[derive(Clone)]
pub struct ServiceLogs {
  inner: Arc<Mutex<Inner>>,
}

impl Inner {
  fn open(path: &Path, silent: bool) -> std::io::Result<Self> {
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    // create without truncating an existing log
    OpenOptions::new().create(true).append(true).open(path)?;

    Ok(Self { path: path.to_path_buf(), silent })
  }

  fn append(&self, entry: &LogEntry) -> std::io::Result<()> {
    let line = serde_json::to_string(entry)
      .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
    writeln!(file, "{line}")?;
    file.flush()
  }

  fn read(&self, limit: Option<usize>, level: Option<&str>) -> std::io::Result<Vec<LogEntry>> {
    if !self.path.exists() {
      return Ok(Vec::new());
    }

    let reader = BufReader::new(File::open(&self.path)?);
    let mut entries = Vec::new();

    for line in reader.lines() {
      let line = line?;
      if line.trim().is_empty() {
        continue;
      }

      // malformed lines are skipped, the file is shared with older builds
      let Ok(entry) = serde_json::from_str::<LogEntry>(&line) else {
        continue;
      };

      if level.is_none_or(|wanted| wanted == "all" || entry.level == wanted) {
        entries.push(entry);
      }
    }

    // keep the newest N, then present them oldest first
    entries.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    if let Some(limit) = limit {
      entries.truncate(limit);
    }
    entries.reverse();

    Ok(entries)
  }
}

// Core API
// ========

impl ServiceLogs {
  /// Open (or create) a log file that also echoes to the console
  pub fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
    Self::new_with_silent(path, false)
  }

  /// Open (or create) a log file, optionally without console echo
  pub fn new_with_silent<P: AsRef<Path>>(path: P, silent: bool) -> std::io::Result<Self> {
    let inner = Inner::open(path.as_ref(), silent)?;
    Ok(Self { inner: Arc::new(Mutex::new(inner)) })
  }

  /// Append an entry, reporting I/O failures
  pub async fn try_log(
    &self,
    level: &str,
    message: &str,
    component: &str,
    context: Option<LogContext>,
  ) -> std::io::Result<()> {
    let entry = LogEntry {
      timestamp: Utc::now(),
      level: level.to_string(),
      message: message.to_string(),
      component: component.to_string(),
      context,
    };

    let guard = self.inner.lock().await;
    guard.append(&entry)?;

    if !guard.silent {
      echo(level, message);
    }
    Ok(())
  }

  /// Append an entry; logging never fails the caller
  pub async fn log(&self, level: &str, message: &str, component: &str) {
    let _ = self.try_log(level, message, component, None).await;
  }

  /// Append an entry carrying request context
  pub async fn log_with_context(
    &self,
    level: &str,
    message: &str,
    component: &str,
    context: LogContext,
  ) {
    let _ = self.try_log(level, message, component, Some(context)).await;
  }

  /// Most recent entries, oldest first, optionally filtered by level
  pub async fn get_logs(
    &self,
    limit: Option<usize>,
    level: Option<&str>,
  ) -> std::io::Result<Vec<LogEntry>> {
    let guard = self.inner.lock().await;
    guard.read(limit, level)
  }

  pub async fn log_file_path(&self) -> PathBuf {
    self.inner.lock().await.path.clone()
  }

  pub async fn info(&self, message: &str, component: &str) {
    self.log("info", message, component).await;
  }

  pub async fn warn(&self, message: &str, component: &str) {
    self.log("warn", message, component).await;
  }

  pub async fn error(&self, message: &str, component: &str) {
    self.log("error", message, component).await;
  }

  pub async fn success(&self, message: &str, component: &str) {
    self.log("success", message, component).await;
  }
}

fn echo(level: &str, message: &str) {
  match level {
    "warn" => crate::warn(message),
    "error" => crate::error(message),
    "success" => crate::success(message),
    "debug" => crate::debug(message),
    "verbose" => crate::verbose(message),
    _ => crate::info(message),
  }
}
