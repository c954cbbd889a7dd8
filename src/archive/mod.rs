//! Archive module for persisted reports
//!
//! This module handles:
//! - Resolving `<root>/<YYYY>/<MM>/<YYYY-MM-DD>.md` report paths
//! - Writing reports (overwrite-on-rerun)
//! - Filing loose reports into their year/month folders
//! - Rebuilding the `metadata.json` index from the directory tree

pub mod metadata;
mod store;

pub use metadata::{read_index, rebuild, rebuild_at, write_index, ArchiveIndex, METADATA_FILE};
pub use store::ArchiveStore;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while touching the archive tree
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Failed to create directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to move {} to {}: {source}", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to list {}: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Metadata serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for archive operations
pub type ArchiveResult<T> = Result<T, ArchiveError>;
