//! Output module for generating run reports and summaries
//!
//! This module handles:
//! - Rendering collection results into the dated Markdown report
//! - Reading a rendered report back into collection results
//! - Summarizing a run for logs and the console

mod markdown;
mod parse;
mod summary;

pub use markdown::{anchor, escape_cell, render_report, truncate_description, MAX_DESCRIPTION_CHARS};
pub use parse::{parse_report, ParsedReport};
pub use summary::{print_summary, RunOutcome, RunSummary};
