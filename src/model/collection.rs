use crate::model::RepositoryRecord;
use chrono::NaiveDate;

/// How one language's collection ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionOutcome {
    /// The page was fetched and parsed; an empty list means nothing is trending
    Collected(Vec<RepositoryRecord>),

    /// Fetching or parsing failed terminally
    Failed(String),
}

/// One language's outcome within a run
///
/// Exactly one of three shapes holds: succeeded with records, succeeded with
/// no records, or failed with a reason. The outcome enum makes any other
/// combination unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionResult {
    pub language: String,
    pub outcome: CollectionOutcome,
}

impl CollectionResult {
    /// A successful collection (records may be empty)
    pub fn success(language: impl Into<String>, records: Vec<RepositoryRecord>) -> Self {
        Self {
            language: language.into(),
            outcome: CollectionOutcome::Collected(records),
        }
    }

    /// A failed collection with the reason shown in the report
    pub fn failure(language: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            outcome: CollectionOutcome::Failed(reason.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, CollectionOutcome::Collected(_))
    }

    /// Records in rank order; empty for failures
    pub fn records(&self) -> &[RepositoryRecord] {
        match &self.outcome {
            CollectionOutcome::Collected(records) => records,
            CollectionOutcome::Failed(_) => &[],
        }
    }

    /// Present iff the collection failed
    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            CollectionOutcome::Collected(_) => None,
            CollectionOutcome::Failed(reason) => Some(reason),
        }
    }
}

/// The report for one calendar date
///
/// Results keep the configured language order, not completion order.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub date: NaiveDate,
    pub results: Vec<CollectionResult>,
}

impl ReportDocument {
    pub fn new(date: NaiveDate, results: Vec<CollectionResult>) -> Self {
        Self { date, results }
    }

    /// Renders the report as Markdown
    pub fn render(&self) -> String {
        crate::output::render_report(&self.results, self.date)
    }
}
