//! Health and readiness probes.
//!
//! `/livez` answers as long as the process runs; `/readyz` drains during
//! graceful shutdown and checks the database; `/health` is the
//! human-facing summary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

/// Shared probe state.
#[derive(Clone)]
pub struct HealthState {
    pub pool: PgPool,
    pub shutting_down: Arc<AtomicBool>,
}

impl HealthState {
    /// Create probe state for the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Health summary body.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(value_type = String, example = "ok")]
    pub status: &'static str,
    #[schema(value_type = String, example = "up")]
    pub database: &'static str,
}

async fn database_ok(pool: &PgPool) -> bool {
    sqlx::query("SELECT 1").execute(pool).await.is_ok()
}

/// Service health summary.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "A dependency is unavailable"),
    ),
    tag = "Health"
)]
pub async fn health_handler(
    State(state): State<HealthState>,
) -> (StatusCode, Json<HealthResponse>) {
    if database_ok(&state.pool).await {
        (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                database: "up",
            }),
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                database: "down",
            }),
        )
    }
}

/// Liveness probe: the process is running.
pub async fn livez_handler() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe: 503 while draining or when the database is away.
pub async fn readyz_handler(State(state): State<HealthState>) -> StatusCode {
    if state.shutting_down.load(Ordering::Acquire) {
        return StatusCode::SERVICE_UNAVAILABLE;
    }
    if database_ok(&state.pool).await {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
