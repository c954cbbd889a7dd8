//! Configuration module for Trending-Harvester
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use trending_harvester::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Collecting {} languages", config.languages.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ArchiveConfig, Config, RetryConfig, ScraperConfig, SweepTrigger};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
