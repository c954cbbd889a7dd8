//! Run summary derived from one run's collection results
//!
//! This module provides the per-run tally that is logged after collection
//! and printed by the CLI.

use crate::model::CollectionResult;

/// How a run ended overall
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every configured language was collected
    AllSucceeded,

    /// Some languages failed, at least one was collected
    Partial,

    /// Every configured language failed
    AllFailed,

    /// No languages were configured
    Empty,
}

/// Per-run tally of collection results
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Total number of languages attempted
    pub total: usize,

    /// Languages collected successfully, including ones with no repositories
    pub succeeded: Vec<String>,

    /// Subset of `succeeded` whose page listed nothing
    pub empty: Vec<String>,

    /// Failed languages with their reasons
    pub failed: Vec<(String, String)>,

    /// Repositories across all languages
    pub repositories: usize,
}

impl RunSummary {
    /// Tallies results, keeping the order they were supplied in
    pub fn from_results(results: &[CollectionResult]) -> Self {
        let mut summary = Self {
            total: results.len(),
            ..Default::default()
        };

        for result in results {
            match result.failure_reason() {
                Some(reason) => summary
                    .failed
                    .push((result.language.clone(), reason.to_string())),
                None => {
                    let count = result.records().len();
                    if count == 0 {
                        summary.empty.push(result.language.clone());
                    }
                    summary.repositories += count;
                    summary.succeeded.push(result.language.clone());
                }
            }
        }

        summary
    }

    pub fn outcome(&self) -> RunOutcome {
        if self.total == 0 {
            RunOutcome::Empty
        } else if self.failed.is_empty() {
            RunOutcome::AllSucceeded
        } else if self.succeeded.is_empty() {
            RunOutcome::AllFailed
        } else {
            RunOutcome::Partial
        }
    }

    /// Emits the summary through `tracing`
    pub fn log(&self) {
        tracing::info!(
            "Collected {}/{} languages ({} repositories)",
            self.succeeded.len(),
            self.total,
            self.repositories
        );
        if !self.empty.is_empty() {
            tracing::info!("No trending repositories: {}", self.empty.join(", "));
        }
        for (language, reason) in &self.failed {
            tracing::warn!("{} failed: {}", language, reason);
        }
        if self.outcome() == RunOutcome::AllFailed {
            tracing::error!("Every language failed; the report only lists failures");
        }
    }
}

/// Prints a run summary to stdout
pub fn print_summary(summary: &RunSummary) {
    println!("=== Harvest Summary ===\n");

    println!("Overview:");
    println!("  Languages attempted: {}", summary.total);
    println!("  Succeeded: {}", summary.succeeded.len());
    println!("  Failed: {}", summary.failed.len());
    println!("  Repositories: {}", summary.repositories);
    println!();

    if !summary.empty.is_empty() {
        println!("Nothing trending ({}):", summary.empty.len());
        for language in &summary.empty {
            println!("  - {}", language);
        }
        println!();
    }

    if !summary.failed.is_empty() {
        println!("Failures:");
        for (language, reason) in &summary.failed {
            println!("  {}: {}", language, reason);
        }
        println!();
    }
}
