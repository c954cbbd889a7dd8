//! Harvest module for collecting trending repositories
//!
//! This module contains the collection side of a run, including:
//! - HTTP fetching with retry, exponential backoff and jitter
//! - Schema-driven extraction of repository rows from trending pages
//! - Per-language collection and chunked, bounded-concurrency scheduling
//! - Overall run coordination

mod collector;
mod coordinator;
mod extractor;
mod fetcher;
mod languages;
mod retry;
mod scheduler;

pub use collector::{Collect, CollectorSettings, LanguageCollector};
pub use coordinator::{Harvester, RunReport};
pub use extractor::{ExtractError, ExtractionSchema, Extractor, Field, FieldRule, Locator};
pub use fetcher::{
    build_http_client, FetchError, Fetcher, HttpTransport, Transport, TransportError,
    BROWSER_USER_AGENT, REQUEST_TIMEOUT,
};
pub use languages::LanguageTable;
pub use retry::{random_between, AttemptOutcome, RetryPolicy, RetryState, Sleeper, TokioSleeper};
pub use scheduler::BatchScheduler;

use crate::config::Config;
use crate::HarvestError;
use chrono::NaiveDate;

/// Runs a complete harvest for one date
///
/// This is the main entry point for a scheduled run. It will:
/// 1. Build the HTTP client and extraction schema
/// 2. Collect every configured language
/// 3. Render the dated report
/// 4. File loose reports away when the sweep trigger fires
/// 5. Write the report and rebuild `metadata.json`
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `date` - The date the report is filed under
///
/// # Returns
///
/// * `Ok(RunReport)` - The report was written
/// * `Err(HarvestError)` - The run could not produce or persist its report
pub async fn harvest(config: &Config, date: NaiveDate) -> Result<RunReport, HarvestError> {
    Harvester::from_config(config)?.run(date).await
}
