use anyhow::{Context, Result};
use colored::*;
use std::path::{Path, PathBuf};

use crate::cli::display::display_search_results;
use crate::config::DrafterConfig;
use crate::pipeline::{build_prompt, open_index, ReportService};
use crate::report::{context_from_slice, headline, ContextAssembler, ReportContext};
use crate::server::services::PopulateOutcome;

/// Populate the collection, optionally clearing it first
pub async fn index_playbooks(config: &DrafterConfig, ephemeral: bool, reset: bool) -> Result<()> {
  let index = open_index(config, ephemeral).await?;

  if reset {
    index.reset().await?;
  }

  match index.ensure_populated().await? {
    PopulateOutcome::Inserted { count } => println!(
      "{} Indexed {} playbooks into {}",
      "✓".green(),
      count.to_string().bold(),
      index.collection().cyan()
    ),
    PopulateOutcome::AlreadyPopulated { count } => println!(
      "{} {} already holds {} playbooks",
      "✓".green(),
      index.collection().cyan(),
      count.to_string().bold()
    ),
  }
  Ok(())
}

pub async fn search_playbooks(
  config: &DrafterConfig,
  ephemeral: bool,
  terms: &[String],
  k: Option<usize>,
) -> Result<()> {
  let index = open_index(config, ephemeral).await?;
  let results = index.search(&terms.join(" "), k.unwrap_or(config.index.n_results)).await?;
  display_search_results(&results, terms);
  Ok(())
}

/// Print the assembled prompt without calling the oracle
pub async fn print_prompt(config: &DrafterConfig, ephemeral: bool, request: &Path) -> Result<()> {
  let context = read_request(request)?;
  let index = open_index(config, ephemeral).await?;
  let prompt =
    build_prompt(&index, &ContextAssembler::default(), &context, config.index.n_results).await?;
  println!("{prompt}");
  Ok(())
}

/// Run the full pipeline and save the draft as `<title>_<date>.md`
pub async fn draft_report(
  config: &DrafterConfig,
  ephemeral: bool,
  request: &Path,
  out: Option<&Path>,
) -> Result<()> {
  let context = read_request(request)?;
  let service = ReportService::from_config(config, ephemeral).await?;

  chronicle::info!("Waiting on the generation service...");
  let draft = service.draft(&context).await?;

  let out_dir = out.map(Path::to_path_buf).unwrap_or_else(|| config.audit.outputs_dir.clone());
  let path = save_draft(&out_dir, &draft)?;

  println!("{} Draft saved to {}", "✓".green(), path.display().to_string().cyan());
  println!("{} Prompt snapshot at {}", "→".dimmed(), service.audit().prompt_path().display());
  Ok(())
}

fn read_request(path: &Path) -> Result<ReportContext> {
  let body = std::fs::read(path).with_context(|| format!("cannot read {}", path.display()))?;
  Ok(context_from_slice(&body)?)
}

fn save_draft(out_dir: &Path, draft: &str) -> Result<PathBuf> {
  std::fs::create_dir_all(out_dir)
    .with_context(|| format!("cannot create {}", out_dir.display()))?;
  let path = out_dir.join(headline::extract(draft).file_name());
  std::fs::write(&path, draft).with_context(|| format!("cannot write {}", path.display()))?;
  Ok(path)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[test]
  fn test_save_draft_names_file_from_headline() {
    let temp_dir = TempDir::new().unwrap();
    let path = save_draft(
      temp_dir.path(),
      "Title: Suspicious PowerShell\nDate: 2026-10-17\nSeverity: Medium",
    )
    .unwrap();

    assert_eq!(path.file_name().unwrap(), "suspicious_powershell_2026_10_17.md");
    assert!(std::fs::read_to_string(path).unwrap().starts_with("Title: Suspicious PowerShell"));
  }

  #[test]
  fn test_read_request_rejects_bad_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("request.json");
    std::fs::write(&path, "{oops").unwrap();
    assert!(read_request(&path).is_err());
    assert!(read_request(&temp_dir.path().join("missing.json")).is_err());
  }
}
