//! Harvest coordinator - one dated run from collection to index
//!
//! The coordinator wires the collector, scheduler, formatter and archive
//! together and runs the pipeline in a fixed order:
//! - Collect every configured language in bounded-concurrency chunks
//! - Summarize the results
//! - Render the Markdown report
//! - File loose reports away when the sweep trigger fires
//! - Write the report to its dated path
//! - Rebuild `metadata.json`

use crate::archive::{self, ArchiveIndex, ArchiveStore};
use crate::config::{Config, SweepTrigger};
use crate::harvest::collector::{CollectorSettings, LanguageCollector};
use crate::harvest::extractor::{ExtractionSchema, Extractor};
use crate::harvest::fetcher::{build_http_client, Fetcher, HttpTransport, Transport};
use crate::harvest::languages::LanguageTable;
use crate::harvest::retry::{Sleeper, TokioSleeper};
use crate::harvest::scheduler::BatchScheduler;
use crate::model::{CollectionResult, ReportDocument};
use crate::output::RunSummary;
use crate::HarvestError;
use chrono::NaiveDate;
use std::path::PathBuf;

/// What a completed run produced
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: RunSummary,

    /// Where the report was written
    pub report_path: PathBuf,

    /// Loose reports filed away by the sweep, if it ran
    pub moved: Vec<PathBuf>,

    /// The index written after the report
    pub index: ArchiveIndex,
}

/// Main harvest coordinator structure
pub struct Harvester<T, S> {
    languages: Vec<String>,
    collector: LanguageCollector<T, S>,
    scheduler: BatchScheduler,
    store: ArchiveStore,
    sweep: SweepTrigger,
}

impl Harvester<HttpTransport, TokioSleeper> {
    /// Creates a harvester that talks to the network
    ///
    /// # Arguments
    ///
    /// * `config` - The validated harvester configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Harvester)` - Ready to run
    /// * `Err(HarvestError)` - The HTTP client or extraction schema could not be built
    pub fn from_config(config: &Config) -> Result<Self, HarvestError> {
        let client = build_http_client(config.scraper.user_agent.as_deref())?;
        Self::new(config, HttpTransport::new(client), TokioSleeper)
    }
}

impl<T: Transport, S: Sleeper> Harvester<T, S> {
    /// Creates a harvester over an arbitrary transport and sleeper
    pub fn new(config: &Config, transport: T, sleeper: S) -> Result<Self, HarvestError> {
        let extractor = Extractor::new(ExtractionSchema::trending()?, &config.scraper.base_url)?;
        let collector = LanguageCollector::new(
            Fetcher::new(transport, sleeper),
            extractor,
            LanguageTable::with_overrides(&config.slugs),
            CollectorSettings::from_config(&config.scraper, &config.retry),
        );

        Ok(Self {
            languages: config.languages.clone(),
            collector,
            scheduler: BatchScheduler::new(config.scraper.concurrency_limit as usize),
            store: ArchiveStore::new(config.archive.root.clone()),
            sweep: config.archive.sweep,
        })
    }

    pub fn store(&self) -> &ArchiveStore {
        &self.store
    }

    /// Collects every configured language, in configured order
    pub async fn collect(&self) -> Vec<CollectionResult> {
        self.scheduler.run(&self.collector, &self.languages).await
    }

    /// Runs the whole pipeline for `date`
    ///
    /// Per-language failures end up in the report and a failed sweep is only
    /// logged. Failing to write the report aborts the run; a failed index
    /// rebuild after the report is written is still an error, but the report
    /// stays on disk.
    pub async fn run(&self, date: NaiveDate) -> Result<RunReport, HarvestError> {
        tracing::info!(
            "Starting harvest for {} ({} languages, {} at a time)",
            date,
            self.languages.len(),
            self.scheduler.concurrency_limit()
        );

        let results = self.collect().await;

        let summary = RunSummary::from_results(&results);
        summary.log();

        let document = ReportDocument::new(date, results);
        let markdown = document.render();

        // A failed sweep never blocks today's report
        let moved = if ArchiveStore::should_sweep(self.sweep, date) {
            match self.store.archive_stale_files() {
                Ok(moved) => {
                    tracing::info!("Sweep filed {} loose report(s)", moved.len());
                    moved
                }
                Err(e) => {
                    tracing::warn!("Sweep failed, leaving loose reports in place: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        let report_path = self.store.resolve_path(date)?;
        self.store.write(&report_path, &markdown)?;

        let index = archive::rebuild(self.store.root())?;
        archive::write_index(self.store.root(), &index)?;

        Ok(RunReport {
            summary,
            report_path,
            moved,
            index,
        })
    }
}
