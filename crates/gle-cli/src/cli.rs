//! Command-line argument parsing with clap.

use std::time::Duration;

use clap::{Parser, ValueEnum};
use gle_query::config::{DEFAULT_BASE_URL, DEFAULT_MAX_POLLS, DEFAULT_POLL_INTERVAL};
use gle_query::{ClientConfig, SearchRequest};

const DEFAULT_POLL_INTERVAL_MS: u64 = DEFAULT_POLL_INTERVAL.as_millis() as u64;

/// gle - run a LEQL query against a Logentries log and print the matches.
#[derive(Parser, Debug, Clone)]
#[command(name = "gle")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Name of the log to query.
    #[arg(short, long)]
    pub log: String,

    /// Account API key.
    #[arg(long, env = "X_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Window start, `YYYY-MM-DD HH:MM:SS` (UTC).
    #[arg(long)]
    pub start_date: String,

    /// Window end, `YYYY-MM-DD HH:MM:SS` (UTC).
    #[arg(long)]
    pub end_date: String,

    /// LEQL statement, e.g. `where(status=500)`.
    #[arg(short, long)]
    pub query: String,

    /// REST API base URL.
    #[arg(long, env = "GLE_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Delay between successive polls, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_POLL_INTERVAL_MS)]
    pub poll_interval_ms: u64,

    /// Maximum number of continuation requests (0 = unbounded).
    #[arg(long, default_value_t = DEFAULT_MAX_POLLS)]
    pub max_polls: u32,

    /// Per-request timeout in seconds.
    #[arg(long)]
    pub request_timeout_secs: Option<u64>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Text)]
    pub format: Format,

    /// Fail when the service ends the run without signalling completion.
    #[arg(long)]
    pub strict: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum Format {
    /// One raw message per line.
    #[default]
    Text,
    /// One event JSON object per line.
    Json,
}

impl Cli {
    /// Builds the client configuration from the flags.
    #[must_use]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_base_url(self.base_url.clone())
            .with_poll_interval(Duration::from_millis(self.poll_interval_ms))
            .with_max_polls(self.max_polls)
            .with_request_timeout(self.request_timeout_secs.map(Duration::from_secs))
    }

    /// Builds the search request from the flags.
    #[must_use]
    pub fn search_request(&self) -> SearchRequest {
        SearchRequest::new(
            self.log.clone(),
            self.query.clone(),
            self.start_date.clone(),
            self.end_date.clone(),
        )
    }
}
