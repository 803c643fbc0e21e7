//! Poll timestamp normalisation
//!
//! `at` is stored as text, so every value is rewritten to one UTC layout
//! with fixed nanosecond precision. Text order then matches time order, and
//! distinct instants never collapse onto the same value.

use chrono::{DateTime, SecondsFormat, Utc};

/// Rewrite an RFC-3339 timestamp as `YYYY-MM-DDTHH:MM:SS.nnnnnnnnnZ`.
/// Values that do not parse are returned unchanged.
pub fn normalize_timestamp(value: &str) -> String {
    match DateTime::parse_from_rfc3339(value) {
        Ok(parsed) => parsed
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Nanos, true),
        Err(_) => value.to_string(),
    }
}
