//! Display formatting for CLI output

use colored::*;

use crate::server::services::VectorSearchResult;

/// Highlight query terms in text, case-insensitively
pub fn highlight_keywords(text: &str, terms: &[String]) -> String {
  let mut sorted: Vec<&String> = terms.iter().filter(|t| !t.is_empty()).collect();
  sorted.sort_by_key(|t| std::cmp::Reverse(t.len()));

  let mut result = text.to_string();
  for term in sorted {
    let term_lower = term.to_lowercase();
    let lower = result.to_lowercase();
    // lowercasing can change byte lengths outside ASCII; skip rather than mis-slice
    if lower.len() != result.len() {
      continue;
    }

    let mut highlighted = String::with_capacity(result.len());
    let mut end = 0;
    while let Some(pos) = lower[end..].find(&term_lower) {
      let start = end + pos;
      highlighted.push_str(&result[end..start]);
      highlighted.push_str(&result[start..start + term_lower.len()].yellow().bold().to_string());
      end = start + term_lower.len();
    }
    highlighted.push_str(&result[end..]);
    result = highlighted;
  }

  result
}

/// One ranked playbook with its similarity and content
pub fn display_search_result(rank: usize, result: &VectorSearchResult, terms: &[String]) {
  println!(
    "{} {} {} {}",
    format!("#{rank}").cyan(),
    result.title.blue().bold(),
    format!("({})", result.id).dimmed(),
    format!("similarity {:.3}", result.similarity).yellow()
  );
  println!("{}", chronicle::rule(60, '-').dimmed());
  for line in result.content.lines() {
    println!("  {}", highlight_keywords(line, terms));
  }
  println!();
}

pub fn display_search_results(results: &[VectorSearchResult], terms: &[String]) {
  if results.is_empty() {
    println!("No playbooks matched: {}", terms.join(" ").yellow());
    return;
  }
  for (i, result) in results.iter().enumerate() {
    display_search_result(i + 1, result, terms);
  }
}
