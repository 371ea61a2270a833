//! Error types for log queries.
//!
//! Every failure that ends a query run is represented here. None of them is
//! retried: the caller reports the error and stops.

use thiserror::Error;

/// Result type alias for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;

/// Errors that can occur while resolving, submitting or retrieving a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A date bound did not match `YYYY-MM-DD HH:MM:SS`.
    #[error("invalid date format '{input}': {reason}")]
    InvalidDateFormat {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// No log in the account catalog carries the requested name.
    #[error("log not found with name '{name}'")]
    LogNotFound {
        /// The requested log name.
        name: String,
    },

    /// The HTTP request could not be completed.
    #[error("transport error: {message}")]
    Transport {
        /// Description of the network failure.
        message: String,
    },

    /// A response body could not be decoded.
    #[error("failed to decode {context}: {message}")]
    Decode {
        /// What was being decoded.
        context: String,
        /// Decoder message.
        message: String,
    },

    /// A request body could not be encoded.
    #[error("failed to encode {context}: {message}")]
    Encode {
        /// What was being encoded.
        context: String,
        /// Encoder message.
        message: String,
    },

    /// The service answered a request with a status the operation cannot use.
    #[error("{operation} failed: unexpected HTTP status {status}")]
    UnexpectedStatus {
        /// The operation that was attempted.
        operation: String,
        /// HTTP status returned by the service.
        status: u16,
    },

    /// The service kept returning continuation links past the poll limit.
    #[error("poll limit exceeded: still receiving continuation links after {limit} requests")]
    PollLimitExceeded {
        /// The configured limit.
        limit: u32,
    },

    /// Invalid client configuration.
    #[error("configuration error: {message}")]
    Config {
        /// Description of the problem.
        message: String,
    },

    /// Writing events to the output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl QueryError {
    /// Creates an `InvalidDateFormat` error.
    #[must_use]
    pub fn invalid_date(input: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDateFormat {
            input: input.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `LogNotFound` error.
    #[must_use]
    pub fn log_not_found(name: impl Into<String>) -> Self {
        Self::LogNotFound { name: name.into() }
    }

    /// Creates a `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a `Decode` error.
    #[must_use]
    pub fn decode(context: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            context: context.into(),
            message: message.into(),
        }
    }

    /// Creates an `UnexpectedStatus` error.
    #[must_use]
    pub fn unexpected_status(operation: impl Into<String>, status: u16) -> Self {
        Self::UnexpectedStatus {
            operation: operation.into(),
            status,
        }
    }

    /// Creates a `Config` error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for QueryError {
    fn from(err: reqwest::Error) -> Self {
        Self::transport(err.to_string())
    }
}
