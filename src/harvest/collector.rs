//! Per-language collection
//!
//! Composes the fetcher and extractor for one language and turns every
//! terminal failure into a failed [`CollectionResult`].

use crate::config::{RetryConfig, ScraperConfig};
use crate::harvest::extractor::Extractor;
use crate::harvest::fetcher::{Fetcher, Transport};
use crate::harvest::languages::LanguageTable;
use crate::harvest::retry::{random_between, RetryPolicy, Sleeper};
use crate::model::CollectionResult;
use std::future::Future;
use std::time::Duration;

/// Produces the result for one language; never fails
pub trait Collect: Sync {
    fn collect(&self, language: &str) -> impl Future<Output = CollectionResult> + Send;
}

/// Immutable settings for a collector
#[derive(Debug, Clone)]
pub struct CollectorSettings {
    pub base_url: String,
    pub since: String,
    pub retry: RetryPolicy,
    /// Bounds of the randomized pause after each successful collection
    pub polite_delay: (Duration, Duration),
}

impl CollectorSettings {
    pub fn from_config(scraper: &ScraperConfig, retry: &RetryConfig) -> Self {
        Self {
            base_url: scraper.base_url.clone(),
            since: scraper.since.clone(),
            retry: RetryPolicy::from(retry),
            polite_delay: (
                Duration::from_millis(scraper.polite_delay_min_ms),
                Duration::from_millis(scraper.polite_delay_max_ms),
            ),
        }
    }
}

/// Fetch + extract for one language at a time
pub struct LanguageCollector<T, S> {
    fetcher: Fetcher<T, S>,
    extractor: Extractor,
    languages: LanguageTable,
    settings: CollectorSettings,
}

impl<T: Transport, S: Sleeper> LanguageCollector<T, S> {
    pub fn new(
        fetcher: Fetcher<T, S>,
        extractor: Extractor,
        languages: LanguageTable,
        settings: CollectorSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            languages,
            settings,
        }
    }

    /// Trending page URL for a language
    pub fn url_for(&self, language: &str) -> String {
        self.languages
            .url_for(&self.settings.base_url, language, &self.settings.since)
    }

    /// Collects one language
    ///
    /// Fetch exhaustion and unparseable bodies become failed results. A
    /// successful collection is followed by a short randomized pause.
    pub async fn collect_language(&self, language: &str) -> CollectionResult {
        let url = self.url_for(language);
        tracing::debug!("Collecting {} from {}", language, url);

        let body = match self.fetcher.fetch(&url, &self.settings.retry).await {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Collection failed for {}: {}", language, e);
                return CollectionResult::failure(language, e.cause().to_string());
            }
        };

        let records = match self.extractor.extract(&body) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!("Could not parse trending page for {}: {}", language, e);
                return CollectionResult::failure(language, e.to_string());
            }
        };

        if records.is_empty() {
            tracing::info!("No trending repositories for {}", language);
        } else {
            tracing::info!("Collected {} repositories for {}", records.len(), language);
        }

        let (low, high) = self.settings.polite_delay;
        self.fetcher.sleeper().sleep(random_between(low, high)).await;

        CollectionResult::success(language, records)
    }
}

impl<T: Transport, S: Sleeper> Collect for LanguageCollector<T, S> {
    async fn collect(&self, language: &str) -> CollectionResult {
        self.collect_language(language).await
    }
}
