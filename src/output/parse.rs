//! Reading a rendered report back into collection results
//!
//! The parser understands exactly the layout `render_report` produces. Rows
//! it cannot make sense of are skipped. Truncated descriptions and flattened
//! line breaks come back as rendered, not as originally collected.

use crate::model::{CollectionResult, RepositoryRecord};
use crate::output::markdown::{FAILURE_PREFIX, NO_REPOSITORIES, TITLE_PREFIX, TOC_HEADING};
use chrono::NaiveDate;

/// A report read back from Markdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReport {
    /// Date from the title, if the title was present and well formed
    pub date: Option<NaiveDate>,

    /// One result per language section, in document order
    pub results: Vec<CollectionResult>,
}

/// Section currently being read
struct Section {
    language: String,
    failure: Option<String>,
    rows: Vec<RepositoryRecord>,
}

impl Section {
    fn finish(self) -> CollectionResult {
        match self.failure {
            Some(reason) => CollectionResult::failure(self.language, reason),
            None => CollectionResult::success(self.language, self.rows),
        }
    }
}

/// Parses a report produced by `render_report`
pub fn parse_report(markdown: &str) -> ParsedReport {
    let mut date = None;
    let mut results = Vec::new();
    let mut current: Option<Section> = None;

    for line in markdown.lines() {
        if let Some(rest) = line.strip_prefix(TITLE_PREFIX) {
            date = NaiveDate::parse_from_str(rest.trim(), "%Y-%m-%d").ok();
            continue;
        }

        if line == TOC_HEADING {
            if let Some(section) = current.take() {
                results.push(section.finish());
            }
            continue;
        }

        if let Some(language) = line.strip_prefix("## ") {
            if let Some(section) = current.take() {
                results.push(section.finish());
            }
            current = Some(Section {
                language: language.trim().to_string(),
                failure: None,
                rows: Vec::new(),
            });
            continue;
        }

        // Lines before the first language heading are title or table of contents
        let Some(section) = current.as_mut() else {
            continue;
        };

        if let Some(reason) = line.strip_prefix(FAILURE_PREFIX) {
            section.failure = Some(reason.to_string());
        } else if line == NO_REPOSITORIES {
            section.rows.clear();
        } else if line.starts_with('|') {
            if let Some(record) = parse_row(line) {
                section.rows.push(record);
            }
        }
    }

    if let Some(section) = current {
        results.push(section.finish());
    }

    ParsedReport { date, results }
}

/// Parses one data row; header and separator rows yield `None`
fn parse_row(line: &str) -> Option<RepositoryRecord> {
    let cells = split_cells(line);
    if cells.len() != 6 {
        return None;
    }

    let rank = cells[0].parse::<u32>().ok()?;
    let (full_name, url) = parse_link(&cells[1])?;

    Some(RepositoryRecord {
        rank,
        full_name,
        url,
        description: cells[2].clone(),
        stars: cells[3].clone(),
        forks: cells[4].clone(),
        stars_today: cells[5].clone(),
    })
}

/// Splits a table row on unescaped pipes and unescapes each cell
fn split_cells(line: &str) -> Vec<String> {
    let inner = line.trim();
    let inner = inner.strip_prefix('|').unwrap_or(inner);

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(escaped) = chars.next() {
                    cell.push(escaped);
                }
            }
            '|' => cells.push(std::mem::take(&mut cell).trim().to_string()),
            _ => cell.push(c),
        }
    }

    // A trailing pipe leaves nothing but whitespace behind
    if !cell.trim().is_empty() {
        cells.push(cell.trim().to_string());
    }
    cells
}

/// `[name](url)` split into its two parts
fn parse_link(cell: &str) -> Option<(String, String)> {
    let rest = cell.strip_prefix('[')?.strip_suffix(')')?;
    let (name, url) = rest.rsplit_once("](")?;
    Some((name.to_string(), url.to_string()))
}
