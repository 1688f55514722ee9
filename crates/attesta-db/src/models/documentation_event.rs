//! Documentation events and their idempotent recording.
//!
//! The content hash is the event's natural key. Recording uses
//! `INSERT .. ON CONFLICT (content_hash) DO NOTHING RETURNING *` so two
//! concurrent deliveries of the same event cannot both insert: the database
//! constraint decides the race, not an application-level read-then-write.

use attesta_core::EventKind;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::models::attestation::Attestation;

/// A single attested real-world action. Immutable once stored.
#[derive(Debug, Clone, FromRow)]
pub struct DocumentationEvent {
    pub id: Uuid,
    /// SHA-256 hex digest over the event's defining fields; globally unique.
    pub content_hash: String,
    /// Storage form of [`EventKind`].
    pub kind: String,
    /// When the real-world action happened, per the sender.
    pub occurred_at: DateTime<Utc>,
    pub actor_entity_id: Uuid,
    pub org_entity_id: Option<Uuid>,
    /// Opaque subject reference (e.g. an encounter id), part of the hash.
    pub subject_ref: Option<String>,
    pub metadata: serde_json::Value,
    pub received_at: DateTime<Utc>,
}

/// Data needed to record a new event.
#[derive(Debug, Clone)]
pub struct CreateDocumentationEvent {
    pub content_hash: String,
    pub kind: EventKind,
    pub occurred_at: DateTime<Utc>,
    pub actor_entity_id: Uuid,
    pub org_entity_id: Option<Uuid>,
    pub subject_ref: Option<String>,
    pub metadata: serde_json::Value,
}

/// The attestation data written alongside a fresh event.
#[derive(Debug, Clone)]
pub struct NewAttestation {
    pub integration_id: Uuid,
    pub signature: String,
}

/// Outcome of an idempotent record attempt.
#[derive(Debug)]
pub enum RecordOutcome {
    /// First delivery: event and its pending attestation were persisted.
    Recorded {
        event: DocumentationEvent,
        attestation: Attestation,
    },
    /// Duplicate delivery: the hash already exists, nothing was written.
    Duplicate { event: DocumentationEvent },
}

impl DocumentationEvent {
    /// Get the typed event kind.
    #[must_use]
    pub fn kind(&self) -> Option<EventKind> {
        EventKind::from_db(&self.kind)
    }

    /// Atomically record an event and its pending attestation, or detect a
    /// duplicate.
    ///
    /// The event insert and the attestation insert share one transaction:
    /// a crash between them cannot leave an event without its witness
    /// record. On a hash conflict the transaction writes nothing and the
    /// existing event is fetched and returned.
    pub async fn record_with_attestation(
        pool: &PgPool,
        event: CreateDocumentationEvent,
        attestation: NewAttestation,
    ) -> Result<RecordOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let inserted: Option<DocumentationEvent> = sqlx::query_as(
            r"
            INSERT INTO documentation_events (
                content_hash, kind, occurred_at, actor_entity_id,
                org_entity_id, subject_ref, metadata
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (content_hash) DO NOTHING
            RETURNING *
            ",
        )
        .bind(&event.content_hash)
        .bind(event.kind.as_str())
        .bind(event.occurred_at)
        .bind(event.actor_entity_id)
        .bind(event.org_entity_id)
        .bind(&event.subject_ref)
        .bind(&event.metadata)
        .fetch_optional(&mut *tx)
        .await?;

        match inserted {
            Some(fresh) => {
                let witness: Attestation = sqlx::query_as(
                    r"
                    INSERT INTO attestations (event_id, integration_id, signature, status)
                    VALUES ($1, $2, $3, 'pending')
                    RETURNING *
                    ",
                )
                .bind(fresh.id)
                .bind(attestation.integration_id)
                .bind(&attestation.signature)
                .fetch_one(&mut *tx)
                .await?;

                tx.commit().await?;

                Ok(RecordOutcome::Recorded {
                    event: fresh,
                    attestation: witness,
                })
            }
            None => {
                // Conflict: the committed row that beat us is now visible.
                tx.rollback().await?;
                let existing = Self::find_by_hash(pool, &event.content_hash)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)?;
                Ok(RecordOutcome::Duplicate { event: existing })
            }
        }
    }

    /// Look up an event by content hash.
    pub async fn find_by_hash(pool: &PgPool, hash: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM documentation_events
            WHERE content_hash = $1
            ",
        )
        .bind(hash)
        .fetch_optional(pool)
        .await
    }

    /// Look up an event by primary key.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM documentation_events
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Count stored events. Used by tests and reconciliation tooling.
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM documentation_events")
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }
}
