//! Lenient parsing of client-supplied timestamps.
//!
//! ## Summary
//! Event dates arrive from browsers and scripts in several shapes. Anything
//! without an explicit offset is interpreted as UTC; a bare date means
//! midnight UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::error::{CoreError, CoreResult};

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// ## Summary
/// Parses an RFC 3339 timestamp, a naive `YYYY-MM-DD[ T]HH:MM[:SS]` timestamp,
/// or a bare `YYYY-MM-DD` date into a UTC instant.
///
/// ## Errors
/// Returns `CoreError::ParseError` if the input matches none of the accepted shapes.
pub fn parse_datetime(input: &str) -> CoreResult<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        && let Some(naive) = date.and_hms_opt(0, 0, 0)
    {
        return Ok(naive.and_utc());
    }

    Err(CoreError::ParseError(format!(
        "'{input}' is not a valid date"
    )))
}
