//! Fire-and-forget audit sink.
//!
//! Audit writes never block or fail a request: `record` swallows and logs
//! storage errors, and `record_detached` moves the write off the request
//! path entirely.

use attesta_db::{AuditRecord, NewAuditRecord};
use sqlx::PgPool;

/// Appends audit records describing pipeline actions.
#[derive(Clone)]
pub struct AuditService {
    pool: PgPool,
}

impl AuditService {
    /// Create a new audit service.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Append one audit record. Failures are logged, never propagated.
    pub async fn record(
        &self,
        action: &str,
        actor_ref: &str,
        resource_type: &str,
        resource_id: &str,
        details: serde_json::Value,
    ) {
        let record = NewAuditRecord {
            action: action.to_string(),
            actor_ref: actor_ref.to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
            details,
        };

        if let Err(e) = AuditRecord::insert(&self.pool, record).await {
            tracing::warn!(
                action = action,
                resource_id = resource_id,
                error = %e,
                "Failed to write audit record"
            );
        }
    }

    /// Append one audit record in a background task, off the request path.
    pub fn record_detached(
        &self,
        action: &'static str,
        actor_ref: String,
        resource_type: &'static str,
        resource_id: String,
        details: serde_json::Value,
    ) {
        let svc = self.clone();
        tokio::spawn(async move {
            svc.record(action, &actor_ref, resource_type, &resource_id, details)
                .await;
        });
    }
}
