//! Snapshots of the last prompt sent and the last draft received
//!
//! Each snapshot is a single file replaced on every request, written to a
//! temporary sibling first and renamed so readers never see a torn file.

use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::error::{DrafterError, Result};

pub const PROMPT_SNAPSHOT: &str = "prompt_in.txt";
pub const RESPONSE_SNAPSHOT: &str = "response.txt";

#[derive(Debug, Clone)]
pub struct AuditTrail {
  outputs_dir: PathBuf,
}

impl AuditTrail {
  pub fn new(outputs_dir: impl Into<PathBuf>) -> Self {
    Self { outputs_dir: outputs_dir.into() }
  }

  pub fn outputs_dir(&self) -> &Path {
    &self.outputs_dir
  }

  pub fn prompt_path(&self) -> PathBuf {
    self.outputs_dir.join(PROMPT_SNAPSHOT)
  }

  pub fn response_path(&self) -> PathBuf {
    self.outputs_dir.join(RESPONSE_SNAPSHOT)
  }

  /// Record the exact prompt about to be sent
  pub async fn record_prompt(&self, prompt: &str) -> Result<PathBuf> {
    let path = self.prompt_path();
    replace_file(&path, prompt).await?;
    Ok(path)
  }

  /// Record the draft the oracle returned
  pub async fn record_response(&self, response: &str) -> Result<PathBuf> {
    let path = self.response_path();
    replace_file(&path, response).await?;
    Ok(path)
  }
}

async fn replace_file(path: &Path, content: &str) -> Result<()> {
  let fail = |e: std::io::Error| DrafterError::audit(path.display().to_string(), e.to_string());

  if let Some(parent) = path.parent() {
    tokio::fs::create_dir_all(parent).await.map_err(fail)?;
  }

  let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or("snapshot");
  let staging = path.with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()));

  tokio::fs::write(&staging, content).await.map_err(fail)?;
  if let Err(e) = tokio::fs::rename(&staging, path).await {
    let _ = tokio::fs::remove_file(&staging).await;
    return Err(fail(e));
  }
  Ok(())
}
