//! Trending-Harvester: a daily trending-repositories archiver
//!
//! This crate collects the trending repositories of a configured list of
//! programming languages, renders them into a dated Markdown report, files the
//! report into a year/month archive and keeps a `metadata.json` index of the
//! dates the archive holds.

pub mod archive;
pub mod config;
pub mod harvest;
pub mod model;
pub mod output;

use thiserror::Error;

/// Main error type for a harvest run
///
/// Only failures that make the run unable to produce or persist its report
/// end up here. Per-language collection failures are recorded inside the
/// report instead.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Archive error: {0}")]
    Archive(#[from] archive::ArchiveError),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("HTML extraction setup failed: {0}")]
    Extract(#[from] harvest::ExtractError),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{CollectionResult, ReportDocument, RepositoryRecord};
