//! Error types for the rewards API.
//!
//! Every failure maps to a stable machine-readable code: senders are
//! automated systems, not humans, and retry decisions key off the code.
//! The duplicate-hash path is NOT an error: it is the designed idempotency
//! path and returns 2xx from the handler.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;

/// Rewards API error variants.
#[derive(Debug, thiserror::Error)]
pub enum RewardsApiError {
    /// Missing, malformed, or mismatching HMAC signature; also unknown or
    /// inactive integrations. Deliberately indistinguishable to the sender.
    #[error("Signature verification failed")]
    Signature,

    #[error("Malformed payload: {0}")]
    MalformedPayload(String),

    #[error("Unknown event kind: {0}")]
    UnknownEventKind(String),

    #[error("Event timestamp is outside the accepted freshness window (too old)")]
    StaleTimestamp,

    #[error("Event timestamp is too far in the future")]
    FutureTimestamp,

    #[error("Actor account is not registered: {0}")]
    ActorNotRegistered(String),

    #[error("Entity not found")]
    EntityNotFound,

    #[error("Integration not found")]
    IntegrationNotFound,

    #[error("Event not found")]
    EventNotFound,

    /// The configured treasury account does not resolve to a registered
    /// entity. Money is owed but cannot be routed; surfaced, never dropped.
    #[error("Treasury account is not registered: {0}")]
    TreasuryUnresolved(String),

    #[error("Already registered: {0}")]
    Conflict(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Secret cipher error: {0}")]
    SecretCipher(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database error: {0}")]
    Db(#[from] attesta_db::DbError),
}

/// JSON error response returned by rewards API endpoints.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    /// Stable machine-readable code.
    pub error: String,
    /// Human-oriented detail.
    pub message: String,
    pub status: u16,
}

impl RewardsApiError {
    /// The stable machine code and HTTP status for this error.
    #[must_use]
    pub fn code(&self) -> (StatusCode, &'static str) {
        match self {
            RewardsApiError::Signature => (StatusCode::UNAUTHORIZED, "invalid_signature"),
            RewardsApiError::MalformedPayload(_) => {
                (StatusCode::BAD_REQUEST, "malformed_payload")
            }
            RewardsApiError::UnknownEventKind(_) => {
                (StatusCode::BAD_REQUEST, "unknown_event_kind")
            }
            RewardsApiError::StaleTimestamp => (StatusCode::BAD_REQUEST, "stale_timestamp"),
            RewardsApiError::FutureTimestamp => {
                (StatusCode::BAD_REQUEST, "timestamp_in_future")
            }
            RewardsApiError::ActorNotRegistered(_) => {
                (StatusCode::NOT_FOUND, "actor_not_registered")
            }
            RewardsApiError::EntityNotFound => (StatusCode::NOT_FOUND, "entity_not_found"),
            RewardsApiError::IntegrationNotFound => {
                (StatusCode::NOT_FOUND, "integration_not_found")
            }
            RewardsApiError::EventNotFound => (StatusCode::NOT_FOUND, "event_not_found"),
            RewardsApiError::TreasuryUnresolved(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "treasury_unresolved")
            }
            RewardsApiError::Conflict(_) => (StatusCode::CONFLICT, "already_registered"),
            RewardsApiError::Validation(_) => (StatusCode::BAD_REQUEST, "validation_error"),
            RewardsApiError::SecretCipher(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "secret_cipher_error")
            }
            RewardsApiError::Database(_) | RewardsApiError::Db(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "storage_error")
            }
        }
    }
}

impl IntoResponse for RewardsApiError {
    fn into_response(self) -> Response {
        let (status, error_type) = self.code();

        if status.is_server_error() {
            tracing::error!(error = %self, code = error_type, "Request failed");
        }

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, RewardsApiError>;
