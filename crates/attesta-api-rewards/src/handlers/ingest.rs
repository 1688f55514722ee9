//! Webhook ingestion endpoint.
//!
//! POST /events - Receive one signed documentation event.
//!
//! The handler takes the raw body so the HMAC covers the exact bytes as
//! sent; JSON parsing happens only after the signature verifies. Everything
//! in the payload is untrusted until then.

use attesta_core::EventId;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use uuid::Uuid;

use crate::crypto::{decrypt_secret, verify_signature};
use crate::error::RewardsApiError;
use crate::models::{IngestEventRequest, IngestEventResponse};
use crate::router::RewardsState;
use crate::services::recorder::RecordedDelivery;
use attesta_db::WebhookIntegration;

/// Header carrying the sender's integration id.
pub const INTEGRATION_ID_HEADER: &str = "x-integration-id";

/// Header carrying the hex HMAC-SHA256 signature of the raw body.
pub const SIGNATURE_HEADER: &str = "x-attesta-signature";

/// Receives one signed documentation event.
///
/// Duplicates of an already-recorded event return 200 with the original
/// event id; senders with at-least-once delivery must not treat them as
/// errors.
#[utoipa::path(
    post,
    path = "/events",
    request_body = IngestEventRequest,
    responses(
        (status = 200, description = "Event recorded (or already processed)", body = IngestEventResponse),
        (status = 400, description = "Malformed, stale, or unknown-kind event"),
        (status = 401, description = "Missing or invalid signature"),
        (status = 404, description = "Actor account not registered"),
        (status = 500, description = "Storage or configuration failure"),
    ),
    tag = "Events"
)]
pub async fn ingest_event_handler(
    State(state): State<RewardsState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<IngestEventResponse>), RewardsApiError> {
    // Authenticate before any parsing or persistence.
    let integration = authenticate(&state, &headers, &body).await?;
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(RewardsApiError::Signature)?;

    let request: IngestEventRequest = serde_json::from_slice(&body)
        .map_err(|e| RewardsApiError::MalformedPayload(e.to_string()))?;

    tracing::info!(
        integration = %integration.name,
        event_kind = %request.event_kind,
        "Webhook delivery received"
    );

    match state
        .recorder()
        .record(request, integration.id, signature)
        .await?
    {
        RecordedDelivery::Duplicate { event } => {
            state.audit().record_detached(
                "event.duplicate",
                format!("integration:{}", integration.id),
                "documentation_event",
                event.id.to_string(),
                serde_json::json!({ "contentHash": event.content_hash }),
            );
            Ok((
                StatusCode::OK,
                Json(IngestEventResponse::duplicate(EventId::from_uuid(event.id))),
            ))
        }
        RecordedDelivery::Fresh { event, attestation } => {
            state.audit().record_detached(
                "event.recorded",
                format!("integration:{}", integration.id),
                "documentation_event",
                event.id.to_string(),
                serde_json::json!({
                    "kind": event.kind,
                    "contentHash": event.content_hash,
                }),
            );

            let summary = state.distributor().distribute(&event, &attestation).await?;

            let response = match summary {
                Some(summary) => {
                    state.audit().record_detached(
                        "reward.distributed",
                        format!("integration:{}", integration.id),
                        "attestation",
                        attestation.id.to_string(),
                        serde_json::json!({
                            "entries": summary.entries_written,
                            "actorReward": summary.actor_reward,
                            "networkFee": summary.network_fee,
                        }),
                    );
                    IngestEventResponse::recorded(
                        EventId::from_uuid(event.id),
                        Some(summary.actor_reward),
                        Some(summary.network_fee),
                    )
                }
                None => {
                    IngestEventResponse::recorded(EventId::from_uuid(event.id), None, None)
                }
            };

            Ok((StatusCode::OK, Json(response)))
        }
    }
}

/// Resolve the claimed integration and verify the payload signature.
///
/// Missing header, unknown or inactive integration, undecryptable secret,
/// and signature mismatch all collapse into the same 401; none of those
/// distinctions belong in responses to an unauthenticated caller.
async fn authenticate(
    state: &RewardsState,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<WebhookIntegration, RewardsApiError> {
    let integration_id: Uuid = headers
        .get(INTEGRATION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.parse().ok())
        .ok_or(RewardsApiError::Signature)?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or(RewardsApiError::Signature)?;

    let integration = WebhookIntegration::find_by_id(state.pool(), integration_id)
        .await?
        .filter(|i| i.is_active)
        .ok_or(RewardsApiError::Signature)?;

    let secret =
        decrypt_secret(&integration.secret_encrypted, state.encryption_key()).map_err(|e| {
            tracing::error!(
                integration_id = %integration.id,
                error = %e,
                "Integration secret could not be decrypted"
            );
            RewardsApiError::Signature
        })?;

    if !verify_signature(signature, &secret, body) {
        tracing::warn!(
            integration_id = %integration.id,
            "Signature verification failed"
        );
        return Err(RewardsApiError::Signature);
    }

    Ok(integration)
}
