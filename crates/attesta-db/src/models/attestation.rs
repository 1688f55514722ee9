//! Attestations: witness records binding an event to its signing authority.
//!
//! One attestation per event. Status moves pending → confirmed when the
//! distribution transaction commits (see `reward_ledger_entry`), or to
//! rejected/expired by off-pipeline settlement. Terminal states are final.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Attestation lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    /// Recorded but not yet (or never) rewarded.
    Pending,
    /// Reward entries are committed.
    Confirmed,
    /// Settlement disputed the attestation.
    Rejected,
    /// Settlement timed out.
    Expired,
}

impl AttestationStatus {
    /// Convert from database string representation.
    #[must_use]
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "rejected" => Some(Self::Rejected),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    /// Terminal statuses are immutable.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A witness record for one documentation event.
#[derive(Debug, Clone, FromRow)]
pub struct Attestation {
    pub id: Uuid,
    pub event_id: Uuid,
    /// The integration whose signature verified this event.
    pub integration_id: Uuid,
    /// The hex HMAC signature presented at ingestion.
    pub signature: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Attestation {
    /// Get the typed status.
    #[must_use]
    pub fn status(&self) -> AttestationStatus {
        AttestationStatus::from_db(&self.status).unwrap_or(AttestationStatus::Pending)
    }

    /// Look up the attestation for an event.
    pub async fn find_by_event_id(
        pool: &PgPool,
        event_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM attestations
            WHERE event_id = $1
            ",
        )
        .bind(event_id)
        .fetch_optional(pool)
        .await
    }

    /// Look up an attestation by primary key.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM attestations
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Attestations still pending with zero ledger entries, older than the
    /// given age. These are distributions that were interrupted after the
    /// event was durably recorded; re-running distribution for them is safe.
    pub async fn list_stuck_pending(
        pool: &PgPool,
        older_than: Duration,
        limit: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let cutoff = Utc::now() - older_than;

        sqlx::query_as(
            r"
            SELECT a.* FROM attestations a
            WHERE a.status = 'pending'
              AND a.created_at < $1
              AND NOT EXISTS (
                  SELECT 1 FROM reward_ledger l WHERE l.attestation_id = a.id
              )
            ORDER BY a.created_at ASC
            LIMIT $2
            ",
        )
        .bind(cutoff)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}
