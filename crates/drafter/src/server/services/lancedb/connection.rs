//! Database connection management for LanceDB

use lancedb::{connect, Connection};
use std::path::Path;

use crate::error::{DrafterError, Result};

/// Connect to the database directory, creating it if needed
pub async fn create_connection(data_dir: &Path) -> Result<Connection> {
  ensure_data_directory_exists(data_dir)?;

  connect(&data_dir.to_string_lossy())
    .execute()
    .await
    .map_err(|e| DrafterError::index_unavailable(format!("failed to connect to LanceDB: {e}")))
}

fn ensure_data_directory_exists(data_dir: &Path) -> Result<()> {
  if !data_dir.exists() {
    std::fs::create_dir_all(data_dir).map_err(|e| {
      DrafterError::index_unavailable(format!(
        "failed to create data directory {}: {e}",
        data_dir.display()
      ))
    })?;
  }
  Ok(())
}
