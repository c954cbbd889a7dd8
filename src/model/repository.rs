/// Description used when the source row has none
pub const NO_DESCRIPTION: &str = "No description";

/// Count used when a star or fork stat is missing
pub const NO_COUNT: &str = "0";

/// Daily star delta used when the source row does not show one
pub const NO_STARS_TODAY: &str = "N/A";

/// One trending repository as scraped from a language page
///
/// Counts are kept as the display strings the source shows ("1,234"), since
/// the report reproduces them verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRecord {
    /// 1-based position within its language section
    pub rank: u32,

    /// `owner/repo` slug
    pub full_name: String,

    /// Absolute link to the repository
    pub url: String,

    pub description: String,

    pub stars: String,

    pub forks: String,

    /// Stars gained in the trending window, or "N/A"
    pub stars_today: String,
}
