use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for Trending-Harvester
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Languages to collect, in report order
    pub languages: Vec<String>,

    pub scraper: ScraperConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    pub archive: ArchiveConfig,

    /// Additions and overrides for the built-in language slug table
    #[serde(default)]
    pub slugs: BTreeMap<String, String>,
}

/// Source and scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ScraperConfig {
    /// Origin of the trending pages (e.g. "https://github.com")
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Trending window passed as the `since` query parameter
    #[serde(default = "default_since")]
    pub since: String,

    /// Number of languages collected concurrently per chunk
    #[serde(rename = "concurrency-limit")]
    pub concurrency_limit: u32,

    /// Lower bound of the delay after a successful collection (milliseconds)
    #[serde(rename = "polite-delay-min-ms", default = "default_polite_min")]
    pub polite_delay_min_ms: u64,

    /// Upper bound of the delay after a successful collection (milliseconds)
    #[serde(rename = "polite-delay-max-ms", default = "default_polite_max")]
    pub polite_delay_max_ms: u64,

    /// Overrides the browser User-Agent sent with every request
    #[serde(rename = "user-agent", default)]
    pub user_agent: Option<String>,
}

/// Retry and backoff configuration for fetches
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    #[serde(rename = "base-delay-ms")]
    pub base_delay_ms: u64,

    #[serde(rename = "max-delay-ms")]
    pub max_delay_ms: u64,

    /// Upper bound of the uniform random jitter added to each backoff
    #[serde(rename = "jitter-ms", default = "default_jitter")]
    pub jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
            jitter_ms: default_jitter(),
        }
    }
}

/// Archive location and maintenance configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Directory holding `<YYYY>/<MM>/<YYYY-MM-DD>.md` and `metadata.json`
    pub root: PathBuf,

    /// When loose reports at the archive root are filed away
    #[serde(default)]
    pub sweep: SweepTrigger,
}

/// Trigger for moving loose report files into their year/month folders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SweepTrigger {
    /// Every run
    Always,

    /// Runs dated on the first day of a month
    #[default]
    FirstOfMonth,

    /// Never during a run (still available from the CLI)
    Never,
}

fn default_since() -> String {
    "daily".to_string()
}

fn default_polite_min() -> u64 {
    500
}

fn default_polite_max() -> u64 {
    1500
}

fn default_jitter() -> u64 {
    1000
}
