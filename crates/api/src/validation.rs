//! Request parameter checks

use crate::error::ApiError;
use chrono::DateTime;

/// Accept `at` only when it is a full RFC-3339 timestamp
pub fn validate_timestamp(at: &str) -> Result<&str, ApiError> {
    DateTime::parse_from_rfc3339(at)
        .map(|_| at)
        .map_err(|_| ApiError::InvalidCondition)
}

/// Kiosk ids are integers on the wire
pub fn parse_kiosk_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse().map_err(|_| ApiError::InvalidCondition)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_timestamps() {
        for at in [
            "2024-05-14T06:48:19.588Z",
            "2024-05-14T06:48:19Z",
            "2024-05-14T08:48:19+02:00",
        ] {
            assert_eq!(validate_timestamp(at).unwrap(), at);
        }
    }

    #[test]
    fn test_invalid_timestamps() {
        for at in ["", "yesterday", "2024-05-14", "2024-13-01T00:00:00Z"] {
            assert!(
                matches!(validate_timestamp(at), Err(ApiError::InvalidCondition)),
                "{at:?} accepted"
            );
        }
    }

    #[test]
    fn test_parse_kiosk_id() {
        assert_eq!(parse_kiosk_id("3005").unwrap(), 3005);
        assert!(parse_kiosk_id("abc").is_err());
        assert!(parse_kiosk_id("30.5").is_err());
    }
}
