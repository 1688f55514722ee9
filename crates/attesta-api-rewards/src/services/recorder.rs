//! Event Recorder: validate, canonicalize, and idempotently persist.
//!
//! Runs strictly after signature verification. Validation failures abort
//! with no side effects; a duplicate content hash is the designed
//! idempotency path and reports the original event.

use attesta_core::content_hash;
use attesta_db::{
    Attestation, CreateDocumentationEvent, DocumentationEvent, Entity, NewAttestation,
    RecordOutcome,
};
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiResult, RewardsApiError};
use crate::models::IngestEventRequest;
use crate::validation::{
    parse_account, parse_event_kind, validate_freshness, validate_metadata,
    validate_subject_ref,
};

/// Outcome of one webhook delivery after recording.
#[derive(Debug)]
pub enum RecordedDelivery {
    /// First delivery of this event.
    Fresh {
        event: DocumentationEvent,
        attestation: Attestation,
    },
    /// Re-delivery of an already-recorded event; nothing was written.
    Duplicate { event: DocumentationEvent },
}

/// Validates and persists inbound documentation events.
#[derive(Clone)]
pub struct EventRecorder {
    pool: PgPool,
}

impl EventRecorder {
    /// Create a new recorder over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a signature-verified delivery.
    ///
    /// Validates kind, freshness and actor registration, computes the
    /// canonical content hash, and performs the atomic
    /// insert-or-detect-duplicate against the hash's unique constraint.
    pub async fn record(
        &self,
        request: IngestEventRequest,
        integration_id: Uuid,
        signature: &str,
    ) -> ApiResult<RecordedDelivery> {
        let kind = parse_event_kind(&request.event_kind)?;
        validate_freshness(Utc::now(), request.timestamp)?;
        let subject_ref = validate_subject_ref(request.subject_id.as_deref())?;
        let metadata = validate_metadata(request.metadata)?;

        let actor_account = parse_account(&request.actor_account_id)?;
        let actor = Entity::find_by_account_id(&self.pool, &actor_account)
            .await?
            .ok_or_else(|| RewardsApiError::ActorNotRegistered(actor_account.to_string()))?;

        // An organization context that does not resolve is recorded as
        // absent; the event itself still stands.
        let org_entity_id = match request.organization_context.as_deref() {
            Some(raw) => {
                let account = parse_account(raw)?;
                match Entity::find_by_account_id(&self.pool, &account).await? {
                    Some(org) => Some(org.id),
                    None => {
                        tracing::warn!(
                            org_account = %account,
                            "Organization context does not resolve to a registered entity"
                        );
                        None
                    }
                }
            }
            None => None,
        };

        let hash = content_hash(kind, request.timestamp, actor.id, subject_ref.as_deref());

        let outcome = DocumentationEvent::record_with_attestation(
            &self.pool,
            CreateDocumentationEvent {
                content_hash: hash,
                kind,
                occurred_at: request.timestamp,
                actor_entity_id: actor.id,
                org_entity_id,
                subject_ref,
                metadata,
            },
            NewAttestation {
                integration_id,
                signature: signature.to_string(),
            },
        )
        .await?;

        match outcome {
            RecordOutcome::Recorded { event, attestation } => {
                tracing::info!(
                    event_id = %event.id,
                    kind = %event.kind,
                    actor = %actor.account_id,
                    "Documentation event recorded"
                );
                Ok(RecordedDelivery::Fresh { event, attestation })
            }
            RecordOutcome::Duplicate { event } => {
                tracing::debug!(
                    event_id = %event.id,
                    "Duplicate delivery absorbed"
                );
                Ok(RecordedDelivery::Duplicate { event })
            }
        }
    }

    /// The pool this recorder writes through.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
