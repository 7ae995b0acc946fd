//! Chronicle - console logging for the drafting tools
//!
//! ## Features
//!
//! - Level functions (`info`, `warn`, `error`, `verbose`, `debug`, `success`)
//!   with colored, aligned prefixes
//! - Multi-line messages keep the prefix on every line
//! - Timestamped `event` lines for long-running operations
//! - All output goes to stderr so stdout stays clean for piped drafts
//!
//! With the `service-logs` feature, [`service_logs::ServiceLogs`] persists
//! structured entries to a JSONL file for the HTTP service.

use chrono::Local;
use colored::*;

#[cfg(feature = "service-logs")]
pub mod service_logs;

/// Write every line of a message to stderr
pub fn log(message: &str) {
  for line in message.lines() {
    eprintln!("{line}");
  }
}

/// Pad the bracketed level tag so message columns line up
fn format_prefix(color: Color, tag: &str) -> String {
  let pad = 7usize.saturating_sub(tag.len() + 2);
  format!("[{}]{:<pad$}", tag.color(color).bold(), "")
}

/// Prefix every line of `message` and emit it
fn emit(color: Color, tag: &str, message: &str) {
  let prefix = format_prefix(color, tag);
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

pub fn verbose(message: &str) {
  emit(Color::Cyan, "verb", message);
}

/// General information
pub fn info(message: &str) {
  emit(Color::Blue, "info", message);
}

/// Something needs attention but the operation continues
pub fn warn(message: &str) {
  emit(Color::Yellow, "warn", message);
}

/// Something went wrong
pub fn error(message: &str) {
  emit(Color::Red, "error", message);
}

/// Detailed diagnostics
pub fn debug(message: &str) {
  emit(Color::Magenta, "debug", message);
}

/// Something completed successfully
pub fn success(message: &str) {
  emit(Color::Green, "sccs", message);
}

/// Timestamped event line, used for progress of long operations
pub fn event(message: &str) {
  let timestamp = Local::now().format("%H:%M:%S").to_string();
  let prefix = format!("[{}] [{}]", "event".blue().bold(), timestamp.cyan());
  for line in message.lines() {
    log(&format!("{prefix} {line}"));
  }
}

/// Render a horizontal rule of `length` copies of `ch`
pub fn rule(length: usize, ch: char) -> String {
  ch.to_string().repeat(length)
}

/// Macros for coverage-excluded logging - these expand with LCOV_EXCL_LINE at call sites
#[macro_export]
macro_rules! info {
  ($msg:expr) => {
    $crate::info($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! warn {
  ($msg:expr) => {
    $crate::warn($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! error {
  ($msg:expr) => {
    $crate::error($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! verbose {
  ($msg:expr) => {
    $crate::verbose($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! debug {
  ($msg:expr) => {
    $crate::debug($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! success {
  ($msg:expr) => {
    $crate::success($msg); // LCOV_EXCL_LINE
  };
}

#[macro_export]
macro_rules! event {
  ($msg:expr) => {
    $crate::event($msg); // LCOV_EXCL_LINE
  };
}
