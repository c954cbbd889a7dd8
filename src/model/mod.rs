//! Data model shared by the harvest pipeline
//!
//! Records and per-language results are produced by a single run and handed
//! to the report formatter; the rendered report then belongs to the archive.

mod collection;
mod repository;

pub use collection::{CollectionOutcome, CollectionResult, ReportDocument};
pub use repository::{RepositoryRecord, NO_COUNT, NO_DESCRIPTION, NO_STARS_TODAY};
