//! HTML extractor for trending pages
//!
//! Field extraction is described by an [`ExtractionSchema`]: a row selector,
//! the link that identifies the repository, and an ordered list of
//! `(field, locator, fallback)` rules. Rows without a usable link are dropped
//! and do not take a rank.

use crate::model::{RepositoryRecord, NO_COUNT, NO_DESCRIPTION, NO_STARS_TODAY};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

/// Errors that stop a whole document from being extracted
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    #[error("Invalid base URL '{0}'")]
    BaseUrl(String),

    #[error("Document is not HTML")]
    NotHtml,
}

/// Record fields filled by schema rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Description,
    Stars,
    Forks,
    StarsToday,
}

/// Where a field's value lives inside a row
#[derive(Debug, Clone)]
pub enum Locator {
    /// Whitespace-collapsed text of the first element matching the selector
    Text(Selector),

    /// Text of the stat link whose accessible label contains `label`, or,
    /// for links without a label, whose last path segment is `target`
    StatLink {
        links: Selector,
        label: &'static str,
        target: &'static str,
    },
}

/// One extraction rule
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub field: Field,
    pub locator: Locator,
    /// Used when the locator finds nothing or only whitespace
    pub fallback: &'static str,
}

impl FieldRule {
    /// Applies the rule to a row, falling back when nothing usable is found
    pub fn apply(&self, row: ElementRef<'_>) -> String {
        let value = match &self.locator {
            Locator::Text(selector) => row.select(selector).next().map(collapsed_text),
            Locator::StatLink {
                links,
                label,
                target,
            } => row
                .select(links)
                .find(|link| is_stat_link(*link, label, target))
                .map(collapsed_text),
        };

        value
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| self.fallback.to_string())
    }
}

/// Row structure and field rules for a trending page
#[derive(Debug, Clone)]
pub struct ExtractionSchema {
    pub row: Selector,
    pub link: Selector,
    pub rules: Vec<FieldRule>,
}

impl ExtractionSchema {
    /// Schema for the GitHub trending page markup
    pub fn trending() -> Result<Self, ExtractError> {
        let stat_links = parse_selector("a.Link--muted")?;

        Ok(Self {
            row: parse_selector("article.Box-row")?,
            link: parse_selector("h2 a[href]")?,
            rules: vec![
                FieldRule {
                    field: Field::Description,
                    locator: Locator::Text(parse_selector("p")?),
                    fallback: NO_DESCRIPTION,
                },
                FieldRule {
                    field: Field::Stars,
                    locator: Locator::StatLink {
                        links: stat_links.clone(),
                        label: "star",
                        target: "stargazers",
                    },
                    fallback: NO_COUNT,
                },
                FieldRule {
                    field: Field::Forks,
                    locator: Locator::StatLink {
                        links: stat_links,
                        label: "fork",
                        target: "forks",
                    },
                    fallback: NO_COUNT,
                },
                FieldRule {
                    field: Field::StarsToday,
                    locator: Locator::Text(parse_selector("span.float-sm-right")?),
                    fallback: NO_STARS_TODAY,
                },
            ],
        })
    }
}

/// Turns a trending page into ranked repository records
#[derive(Debug, Clone)]
pub struct Extractor {
    schema: ExtractionSchema,
    base_url: Url,
}

impl Extractor {
    /// # Arguments
    ///
    /// * `schema` - Row and field rules
    /// * `base_url` - Base for resolving repository links
    pub fn new(schema: ExtractionSchema, base_url: &str) -> Result<Self, ExtractError> {
        let base_url = Url::parse(base_url).map_err(|_| ExtractError::BaseUrl(base_url.to_string()))?;
        Ok(Self { schema, base_url })
    }

    /// Extracts records in document order with dense 1-based ranks
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<RepositoryRecord>)` - Possibly empty list of records
    /// * `Err(ExtractError::NotHtml)` - The body contains no markup at all
    pub fn extract(&self, html: &str) -> Result<Vec<RepositoryRecord>, ExtractError> {
        if !looks_like_html(html) {
            return Err(ExtractError::NotHtml);
        }

        let document = Html::parse_document(html);
        let mut records = Vec::new();

        for row in document.select(&self.schema.row) {
            let Some((full_name, url)) = self.repository_link(row) else {
                tracing::trace!("Skipping trending row without a repository link");
                continue;
            };

            let mut record = RepositoryRecord {
                rank: records.len() as u32 + 1,
                full_name,
                url,
                description: NO_DESCRIPTION.to_string(),
                stars: NO_COUNT.to_string(),
                forks: NO_COUNT.to_string(),
                stars_today: NO_STARS_TODAY.to_string(),
            };

            for rule in &self.schema.rules {
                let value = rule.apply(row);
                match rule.field {
                    Field::Description => record.description = value,
                    Field::Stars => record.stars = value,
                    Field::Forks => record.forks = value,
                    Field::StarsToday => record.stars_today = value,
                }
            }

            records.push(record);
        }

        Ok(records)
    }

    /// `(owner/repo, absolute url)` from the row's primary link
    fn repository_link(&self, row: ElementRef<'_>) -> Option<(String, String)> {
        let href = row.select(&self.schema.link).next()?.value().attr("href")?.trim();
        let full_name = href.trim_matches('/');
        if full_name.is_empty() {
            return None;
        }

        let url = self.base_url.join(href).ok()?;
        Some((full_name.to_string(), url.to_string()))
    }
}

fn parse_selector(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

/// Element text with runs of whitespace collapsed to single spaces
fn collapsed_text(element: ElementRef<'_>) -> String {
    element.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ")
}

/// Whether a stat link is the one for `label`
///
/// The accessible label sits on the link itself or on its icon. Links with
/// no label are matched on the last segment of their target
/// (`.../stargazers`, `.../forks`), never on the rest of the path, which
/// carries the repository name.
fn is_stat_link(link: ElementRef<'_>, label: &str, target: &str) -> bool {
    let own = link.value().attr("aria-label");
    let icon = link
        .descendants()
        .filter_map(ElementRef::wrap)
        .find_map(|e| e.value().attr("aria-label"));

    if let Some(aria) = own.or(icon) {
        return aria.to_lowercase().contains(label);
    }

    link.value()
        .attr("href")
        .and_then(|href| href.trim_end_matches('/').rsplit('/').next())
        .is_some_and(|segment| segment.eq_ignore_ascii_case(target))
}

fn looks_like_html(body: &str) -> bool {
    let body = body.trim();
    !body.is_empty() && body.contains('<') && body.contains('>')
}
