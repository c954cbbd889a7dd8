use crate::config::types::{ArchiveConfig, Config, RetryConfig, ScraperConfig};
use crate::ConfigError;
use std::collections::{BTreeMap, HashSet};
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_languages(&config.languages)?;
    validate_scraper_config(&config.scraper)?;
    validate_retry_config(&config.retry)?;
    validate_archive_config(&config.archive)?;
    validate_slugs(&config.slugs)?;
    Ok(())
}

/// Validates the language list: non-empty, no blanks, no duplicates
fn validate_languages(languages: &[String]) -> Result<(), ConfigError> {
    if languages.is_empty() {
        return Err(ConfigError::Validation(
            "languages must list at least one language".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for language in languages {
        if language.trim().is_empty() {
            return Err(ConfigError::Validation(
                "languages cannot contain an empty entry".to_string(),
            ));
        }
        if !seen.insert(language.as_str()) {
            return Err(ConfigError::Validation(format!(
                "language '{}' is listed more than once",
                language
            )));
        }
    }

    Ok(())
}

/// Validates source and scheduling settings
fn validate_scraper_config(config: &ScraperConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base-url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base-url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.since.trim().is_empty() {
        return Err(ConfigError::Validation("since cannot be empty".to_string()));
    }

    if config.concurrency_limit < 1 || config.concurrency_limit > 20 {
        return Err(ConfigError::Validation(format!(
            "concurrency_limit must be between 1 and 20, got {}",
            config.concurrency_limit
        )));
    }

    if config.polite_delay_min_ms > config.polite_delay_max_ms {
        return Err(ConfigError::Validation(format!(
            "polite_delay_min_ms ({}) cannot exceed polite_delay_max_ms ({})",
            config.polite_delay_min_ms, config.polite_delay_max_ms
        )));
    }

    if let Some(agent) = &config.user_agent {
        if agent.trim().is_empty() {
            return Err(ConfigError::Validation(
                "user_agent cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}

/// Validates the retry policy bounds
fn validate_retry_config(config: &RetryConfig) -> Result<(), ConfigError> {
    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(
            "max_attempts must be >= 1, got 0".to_string(),
        ));
    }

    if config.base_delay_ms == 0 {
        return Err(ConfigError::Validation(
            "base_delay_ms must be > 0".to_string(),
        ));
    }

    if config.max_delay_ms < config.base_delay_ms {
        return Err(ConfigError::Validation(format!(
            "max_delay_ms ({}) must be >= base_delay_ms ({})",
            config.max_delay_ms, config.base_delay_ms
        )));
    }

    Ok(())
}

fn validate_archive_config(config: &ArchiveConfig) -> Result<(), ConfigError> {
    if config.root.as_os_str().is_empty() {
        return Err(ConfigError::Validation(
            "archive root cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates slug overrides
fn validate_slugs(slugs: &BTreeMap<String, String>) -> Result<(), ConfigError> {
    for (language, slug) in slugs {
        if slug.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "slug for '{}' cannot be empty",
                language
            )));
        }
        if slug.contains('/') || slug.contains('?') {
            return Err(ConfigError::Validation(format!(
                "slug '{}' for '{}' must be a single path segment",
                slug, language
            )));
        }
    }
    Ok(())
}
