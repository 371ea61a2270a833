//! CLI error types.

use std::fmt;

use gle_query::QueryError;

/// CLI-specific errors.
#[derive(Debug)]
pub enum CliError {
    /// The query run failed.
    Query(QueryError),
    /// Invalid configuration.
    Config(String),
    /// The service ended the run with a status other than 200 or 202.
    Incomplete {
        /// HTTP status of the last response.
        status: u16,
    },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Query(e) => write!(f, "{e}"),
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Incomplete { status } => write!(
                f,
                "results may be incomplete: service answered with HTTP status {status}"
            ),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Query(e) => Some(e),
            Self::Config(_) | Self::Incomplete { .. } => None,
        }
    }
}

impl From<QueryError> for CliError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Config { message } => Self::Config(message),
            other => Self::Query(other),
        }
    }
}
