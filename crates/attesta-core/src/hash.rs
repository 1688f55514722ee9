//! Canonical content hashing for event idempotency.
//!
//! The content hash is the natural key of a documentation event: SHA-256
//! over the event's defining fields in a fixed order, not over raw payload
//! bytes. Two deliveries that differ only in JSON formatting, field order,
//! or metadata still collide on the same hash and deduplicate.

use chrono::{DateTime, SecondsFormat, Utc};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::kind::EventKind;

/// Compute the canonical content hash of an event.
///
/// Fields are joined with `\n` in a fixed order: kind (storage form),
/// timestamp (RFC 3339, UTC, whole seconds), actor entity UUID, subject
/// reference (empty string when absent). The timestamp is truncated to
/// whole seconds so sub-second jitter between retries of the same upstream
/// action cannot defeat deduplication.
#[must_use]
pub fn content_hash(
    kind: EventKind,
    occurred_at: DateTime<Utc>,
    actor_entity_id: Uuid,
    subject_ref: Option<&str>,
) -> String {
    let canonical = format!(
        "{}\n{}\n{}\n{}",
        kind.as_str(),
        occurred_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        actor_entity_id,
        subject_ref.unwrap_or(""),
    );
    let digest = Sha256::digest(canonical.as_bytes());
    hex::encode(digest)
}
