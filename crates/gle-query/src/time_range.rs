//! Conversion of human date strings into the epoch-millisecond bounds the
//! query API expects.
//!
//! Dates use the fixed layout `YYYY-MM-DD HH:MM:SS` and carry no zone; they
//! are read as UTC.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{QueryError, Result};

/// chrono layout matching `YYYY-MM-DD HH:MM:SS`.
pub const DATE_LAYOUT: &str = "%Y-%m-%d %H:%M:%S";

/// Human-readable form of [`DATE_LAYOUT`], used in error messages.
pub const DATE_LAYOUT_HINT: &str = "YYYY-MM-DD HH:MM:SS";

/// Character shape of a valid date: `d` is an ASCII digit, anything else is
/// a literal.
const DATE_SHAPE: &[u8; 19] = b"dddd-dd-dd dd:dd:dd";

/// Inclusive query window in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    /// Start of the window.
    pub from: i64,
    /// End of the window.
    pub to: i64,
}

impl TimeRange {
    /// Builds a range from already-converted bounds.
    #[must_use]
    pub const fn new(from: i64, to: i64) -> Self {
        Self { from, to }
    }

    /// Parses both bounds, start first.
    ///
    /// An inverted range is accepted and passed through to the service.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidDateFormat`] for the first bound that
    /// does not parse.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let range = Self {
            from: parse_timestamp(start)?,
            to: parse_timestamp(end)?,
        };
        if range.from > range.to {
            warn!(from = range.from, to = range.to, "start date is after end date");
        }
        Ok(range)
    }

    /// Width of the window in milliseconds (negative when inverted).
    #[must_use]
    pub const fn span_millis(&self) -> i64 {
        self.to - self.from
    }
}

/// Converts a `YYYY-MM-DD HH:MM:SS` date (UTC) to epoch milliseconds.
///
/// # Errors
///
/// Returns [`QueryError::InvalidDateFormat`] if the input deviates from the
/// layout in any way or names an impossible calendar value.
pub fn parse_timestamp(date: &str) -> Result<i64> {
    check_shape(date)?;

    let parsed = NaiveDateTime::parse_from_str(date, DATE_LAYOUT)
        .map_err(|e| QueryError::invalid_date(date, e.to_string()))?;

    // chrono admits a leap second here; the layout does not.
    if &date[17..19] > "59" {
        return Err(QueryError::invalid_date(date, "second out of range"));
    }

    Ok(parsed.and_utc().timestamp_millis())
}

fn check_shape(date: &str) -> Result<()> {
    let bytes = date.as_bytes();
    if bytes.len() != DATE_SHAPE.len() {
        return Err(QueryError::invalid_date(
            date,
            format!("expected layout {DATE_LAYOUT_HINT}"),
        ));
    }

    for (pos, (&got, &want)) in bytes.iter().zip(DATE_SHAPE.iter()).enumerate() {
        let ok = if want == b'd' {
            got.is_ascii_digit()
        } else {
            got == want
        };
        if !ok {
            let expected = if want == b'd' {
                "a digit".to_string()
            } else {
                format!("'{}'", want as char)
            };
            return Err(QueryError::invalid_date(
                date,
                format!("expected {expected} at position {pos}"),
            ));
        }
    }
    Ok(())
}
