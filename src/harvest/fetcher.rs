//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building an HTTP client that presents itself like a desktop browser
//! - Classifying single-attempt failures
//! - Retrying with exponential backoff and jitter

use crate::harvest::retry::{AttemptOutcome, RetryPolicy, RetryState, Sleeper};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Per-request timeout for every attempt
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// User-Agent of a current desktop browser; the source serves reduced pages otherwise
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const BROWSER_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8";

const BROWSER_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

/// Failure of one request attempt
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("HTTP {0}")]
    Status(u16),

    #[error("Failed to read response body: {0}")]
    Body(String),

    #[error("Request failed: {0}")]
    Request(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::Status(status.as_u16())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

/// A fetch that failed on every attempt its policy allowed
#[derive(Debug, Clone, Error)]
#[error("Failed to fetch {url} after {attempts} attempt(s): {source}")]
pub struct FetchError {
    pub url: String,
    pub attempts: u32,
    pub source: TransportError,
}

impl FetchError {
    /// The failure of the final attempt
    pub fn cause(&self) -> &TransportError {
        &self.source
    }
}

/// Performs one GET and returns the body of a 2xx response
pub trait Transport: Send + Sync {
    fn get(&self, url: &str) -> impl Future<Output = Result<String, TransportError>> + Send;
}

/// Transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> Result<String, TransportError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| TransportError::Body(e.to_string()))
    }
}

impl<T: Transport> Transport for Arc<T> {
    async fn get(&self, url: &str) -> Result<String, TransportError> {
        self.as_ref().get(url).await
    }
}

/// Builds an HTTP client with browser-like default headers
///
/// # Arguments
///
/// * `user_agent` - Overrides [`BROWSER_USER_AGENT`] when set
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(user_agent: Option<&str>) -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(BROWSER_ACCEPT_LANGUAGE));
    match user_agent.and_then(|agent| HeaderValue::from_str(agent).ok()) {
        Some(agent) => headers.insert(USER_AGENT, agent),
        None => headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT)),
    };

    Client::builder()
        .default_headers(headers)
        .timeout(REQUEST_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Retrying fetcher over a [`Transport`]
///
/// Holds no mutable state, so one instance can serve concurrent fetches.
#[derive(Debug, Clone)]
pub struct Fetcher<T, S> {
    transport: T,
    sleeper: S,
}

impl<T: Transport, S: Sleeper> Fetcher<T, S> {
    pub fn new(transport: T, sleeper: S) -> Self {
        Self { transport, sleeper }
    }

    pub fn sleeper(&self) -> &S {
        &self.sleeper
    }

    /// Fetches a URL, retrying failed attempts per `policy`
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return the body |
    /// | Non-2xx, timeout, transport error | Back off and retry |
    /// | `max_attempts` failures | Return `FetchError` with the last cause |
    pub async fn fetch(&self, url: &str, policy: &RetryPolicy) -> Result<String, FetchError> {
        let mut state = RetryState::initial();
        let mut body = None;
        let mut last_error = None;

        loop {
            match state {
                RetryState::Attempting(attempt) => {
                    tracing::debug!("GET {} (attempt {}/{})", url, attempt, policy.max_attempts);
                    let (outcome, jitter) = match self.transport.get(url).await {
                        Ok(text) => {
                            body = Some(text);
                            (AttemptOutcome::Success, Duration::ZERO)
                        }
                        Err(e) => {
                            tracing::warn!("Attempt {} for {} failed: {}", attempt, url, e);
                            last_error = Some(e);
                            (AttemptOutcome::Failure, policy.sample_jitter())
                        }
                    };
                    state = state.on_outcome(policy, outcome, jitter);
                }
                RetryState::Waiting { attempt, delay } => {
                    tracing::debug!(
                        "Backing off {:?} before attempt {} for {}",
                        delay,
                        attempt + 1,
                        url
                    );
                    self.sleeper.sleep(delay).await;
                    state = state.resume();
                }
                RetryState::Succeeded { attempts } => {
                    if attempts > 1 {
                        tracing::info!("Fetched {} after {} attempts", url, attempts);
                    }
                    return Ok(body.unwrap_or_default());
                }
                RetryState::Exhausted { attempts } => {
                    return Err(FetchError {
                        url: url.to_string(),
                        attempts,
                        source: last_error
                            .unwrap_or_else(|| TransportError::Request("no attempt made".to_string())),
                    });
                }
            }
        }
    }
}
