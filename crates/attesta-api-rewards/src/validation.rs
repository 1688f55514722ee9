//! Payload validation for the ingestion endpoint.
//!
//! Runs after signature verification and before any persistence: unknown
//! kinds, timestamps outside the freshness window, and malformed fields are
//! rejected with no side effects.

use attesta_core::{AccountId, EventKind};
use chrono::{DateTime, Duration, Utc};

use crate::error::RewardsApiError;

/// Events older than this are rejected as stale. Bounds replay risk while
/// tolerating batch-delivery lag from upstream documentation systems.
pub const MAX_EVENT_AGE_HOURS: i64 = 24;

/// Allowance for sender clock skew into the future.
pub const MAX_FUTURE_SKEW_MINUTES: i64 = 5;

/// Maximum length of a subject reference.
pub const MAX_SUBJECT_REF_LEN: usize = 256;

/// Maximum number of top-level metadata keys.
pub const MAX_METADATA_KEYS: usize = 64;

/// Parse the wire event kind, rejecting anything outside the enumeration.
pub fn parse_event_kind(wire: &str) -> Result<EventKind, RewardsApiError> {
    EventKind::from_wire(wire).map_err(|e| RewardsApiError::UnknownEventKind(e.0))
}

/// Check the event timestamp against the freshness window.
pub fn validate_freshness(
    now: DateTime<Utc>,
    occurred_at: DateTime<Utc>,
) -> Result<(), RewardsApiError> {
    if occurred_at < now - Duration::hours(MAX_EVENT_AGE_HOURS) {
        return Err(RewardsApiError::StaleTimestamp);
    }
    if occurred_at > now + Duration::minutes(MAX_FUTURE_SKEW_MINUTES) {
        return Err(RewardsApiError::FutureTimestamp);
    }
    Ok(())
}

/// Normalize an account identifier from the wire.
pub fn parse_account(raw: &str) -> Result<AccountId, RewardsApiError> {
    raw.parse()
        .map_err(|e| RewardsApiError::Validation(format!("invalid account identifier: {e}")))
}

/// Validate an optional subject reference.
pub fn validate_subject_ref(subject: Option<&str>) -> Result<Option<String>, RewardsApiError> {
    match subject {
        None => Ok(None),
        Some(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if trimmed.chars().count() > MAX_SUBJECT_REF_LEN {
                return Err(RewardsApiError::Validation(format!(
                    "subject reference exceeds {MAX_SUBJECT_REF_LEN} characters"
                )));
            }
            Ok(Some(trimmed.to_string()))
        }
    }
}

/// Validate the metadata bag: must be a JSON object of bounded size.
pub fn validate_metadata(
    metadata: Option<serde_json::Value>,
) -> Result<serde_json::Value, RewardsApiError> {
    match metadata {
        None => Ok(serde_json::json!({})),
        Some(value) => {
            let obj = value.as_object().ok_or_else(|| {
                RewardsApiError::Validation("metadata must be a JSON object".to_string())
            })?;
            if obj.len() > MAX_METADATA_KEYS {
                return Err(RewardsApiError::Validation(format!(
                    "metadata exceeds {MAX_METADATA_KEYS} keys"
                )));
            }
            Ok(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_known_kind_parses() {
        assert_eq!(
            parse_event_kind("encounter.closed").unwrap(),
            EventKind::EncounterClosed
        );
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let err = parse_event_kind("invoice.paid").unwrap_err();
        assert_eq!(err.code().1, "unknown_event_kind");
    }

    #[test]
    fn test_fresh_timestamp_accepted() {
        assert!(validate_freshness(now(), now() - Duration::hours(2)).is_ok());
    }

    #[test]
    fn test_boundary_timestamps_accepted() {
        assert!(validate_freshness(now(), now() - Duration::hours(MAX_EVENT_AGE_HOURS)).is_ok());
        assert!(
            validate_freshness(now(), now() + Duration::minutes(MAX_FUTURE_SKEW_MINUTES)).is_ok()
        );
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let err = validate_freshness(
            now(),
            now() - Duration::hours(MAX_EVENT_AGE_HOURS) - Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err.code().1, "stale_timestamp");
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let err = validate_freshness(
            now(),
            now() + Duration::minutes(MAX_FUTURE_SKEW_MINUTES) + Duration::seconds(1),
        )
        .unwrap_err();
        assert_eq!(err.code().1, "timestamp_in_future");
    }

    #[test]
    fn test_account_normalization() {
        let account = parse_account(" 0xAbCd ").unwrap();
        assert_eq!(account.as_str(), "0xabcd");
    }

    #[test]
    fn test_empty_account_rejected() {
        let err = parse_account("  ").unwrap_err();
        assert_eq!(err.code().1, "validation_error");
    }

    #[test]
    fn test_blank_subject_collapses_to_none() {
        assert_eq!(validate_subject_ref(Some("  ")).unwrap(), None);
        assert_eq!(validate_subject_ref(None).unwrap(), None);
        assert_eq!(
            validate_subject_ref(Some(" enc-1 ")).unwrap(),
            Some("enc-1".to_string())
        );
    }

    #[test]
    fn test_oversized_subject_rejected() {
        let long = "x".repeat(MAX_SUBJECT_REF_LEN + 1);
        assert!(validate_subject_ref(Some(&long)).is_err());
    }

    #[test]
    fn test_metadata_must_be_object() {
        assert!(validate_metadata(Some(serde_json::json!([1, 2]))).is_err());
        assert!(validate_metadata(Some(serde_json::json!("str"))).is_err());
        assert_eq!(
            validate_metadata(None).unwrap(),
            serde_json::json!({})
        );
        assert!(validate_metadata(Some(serde_json::json!({"a": 1}))).is_ok());
    }

    #[test]
    fn test_metadata_key_limit() {
        let mut obj = serde_json::Map::new();
        for i in 0..=MAX_METADATA_KEYS {
            obj.insert(format!("k{i}"), serde_json::json!(i));
        }
        assert!(validate_metadata(Some(serde_json::Value::Object(obj))).is_err());
    }
}
