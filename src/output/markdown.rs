//! Markdown report generation
//!
//! Renders one run's collection results into the dated report: a title, a
//! table of contents and one section per language in configured order.
//! Rendering is a pure function of its inputs.

use crate::model::{CollectionOutcome, CollectionResult, RepositoryRecord};
use chrono::NaiveDate;

/// Descriptions longer than this many characters are truncated
pub const MAX_DESCRIPTION_CHARS: usize = 100;

/// Characters kept from a truncated description before the ellipsis
const TRUNCATED_DESCRIPTION_CHARS: usize = 97;

pub(crate) const TITLE_PREFIX: &str = "# Trending Repositories for ";
pub(crate) const TOC_HEADING: &str = "## Table of Contents";
pub(crate) const FAILURE_PREFIX: &str = "Failed to scrape: ";
pub(crate) const NO_REPOSITORIES: &str = "No trending repositories found.";

const TABLE_HEADER: &str = "| # | Repository | Description | Stars | Forks | Today |\n\
                            |---|------------|-------------|-------|-------|-------|\n";

/// Renders the report for `date`
///
/// Rendering the same inputs twice yields byte-identical output.
pub fn render_report(results: &[CollectionResult], date: NaiveDate) -> String {
    let mut md = String::new();

    md.push_str(&format!("{}{}\n\n", TITLE_PREFIX, date.format("%Y-%m-%d")));

    md.push_str(TOC_HEADING);
    md.push_str("\n\n");
    for result in results {
        md.push_str(&format!(
            "- [{}](#{})\n",
            single_line(&result.language),
            anchor(&result.language)
        ));
    }
    md.push('\n');

    for result in results {
        md.push_str(&format!("## {}\n\n", single_line(&result.language)));

        match &result.outcome {
            CollectionOutcome::Failed(reason) => {
                md.push_str(&format!("{}{}\n\n", FAILURE_PREFIX, single_line(reason)));
            }
            CollectionOutcome::Collected(records) if records.is_empty() => {
                md.push_str(NO_REPOSITORIES);
                md.push_str("\n\n");
            }
            CollectionOutcome::Collected(records) => {
                md.push_str(TABLE_HEADER);
                for record in records {
                    md.push_str(&table_row(record));
                }
                md.push('\n');
            }
        }
    }

    md
}

/// Heading anchor for a language: lowercase, non-word characters become `-`
pub fn anchor(language: &str) -> String {
    language
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '-' })
        .collect()
}

/// Truncates to 97 characters plus "..." when over the 100 character limit
pub fn truncate_description(description: &str) -> String {
    if description.chars().count() <= MAX_DESCRIPTION_CHARS {
        return description.to_string();
    }
    let kept: String = description.chars().take(TRUNCATED_DESCRIPTION_CHARS).collect();
    format!("{}...", kept)
}

/// Escapes a value for use inside a table cell
///
/// Backslashes and pipes are backslash-escaped; line breaks become spaces.
pub fn escape_cell(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in single_line(value).chars() {
        if c == '\\' || c == '|' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn table_row(record: &RepositoryRecord) -> String {
    format!(
        "| {} | [{}]({}) | {} | {} | {} | {} |\n",
        record.rank,
        escape_cell(&record.full_name),
        escape_cell(&record.url),
        escape_cell(&truncate_description(&record.description)),
        escape_cell(&record.stars),
        escape_cell(&record.forks),
        escape_cell(&record.stars_today),
    )
}

fn single_line(value: &str) -> String {
    value.replace("\r\n", " ").replace(['\r', '\n'], " ")
}
