//! Client configuration.
//!
//! A [`ClientConfig`] is built once per run and shared by reference with
//! every component. It is never mutated after validation.

use std::time::Duration;

use url::Url;

use crate::error::{QueryError, Result};

/// Public Logentries REST endpoint.
pub const DEFAULT_BASE_URL: &str = "https://rest.logentries.com";

/// Delay between two successive continuation requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);

/// Continuation requests allowed per run before giving up.
pub const DEFAULT_MAX_POLLS: u32 = 1000;

/// Path of the log catalog, relative to the base URL.
const CATALOG_PATH: &str = "management/logs";

/// Path of the query endpoint, relative to the base URL.
const QUERY_PATH: &str = "query/logs/";

/// Settings shared by the resolver, submitter and retriever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service root, e.g. `https://rest.logentries.com`.
    pub base_url: String,
    /// Sleep before every continuation request except the first.
    pub poll_interval: Duration,
    /// Maximum continuation requests; `0` disables the limit.
    pub max_polls: u32,
    /// Per-request timeout; `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_polls: DEFAULT_MAX_POLLS,
            request_timeout: None,
        }
    }
}

impl ClientConfig {
    /// Sets the service root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the inter-poll delay.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the continuation request limit (`0` for unlimited).
    #[must_use]
    pub fn with_max_polls(mut self, max_polls: u32) -> Self {
        self.max_polls = max_polls;
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Returns the poll limit, or `None` when polling is unbounded.
    #[must_use]
    pub const fn poll_limit(&self) -> Option<u32> {
        if self.max_polls == 0 {
            None
        } else {
            Some(self.max_polls)
        }
    }

    /// URL of the log catalog.
    #[must_use]
    pub fn catalog_url(&self) -> String {
        self.endpoint(CATALOG_PATH)
    }

    /// URL queries are posted to.
    #[must_use]
    pub fn query_url(&self) -> String {
        self.endpoint(QUERY_PATH)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(QueryError::config("base_url cannot be empty"));
        }

        let url = Url::parse(&self.base_url)
            .map_err(|e| QueryError::config(format!("invalid base_url '{}': {e}", self.base_url)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(QueryError::config(format!(
                "base_url must use http or https, got '{}'",
                url.scheme()
            )));
        }

        if url.query().is_some() {
            return Err(QueryError::config("base_url cannot carry a query string"));
        }

        if self.request_timeout == Some(Duration::ZERO) {
            return Err(QueryError::config(
                "request_timeout must be greater than 0",
            ));
        }

        Ok(())
    }
}
