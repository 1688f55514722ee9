//! Fire-and-forget audit log sink.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// One audit record.
#[derive(Debug, Clone, FromRow)]
pub struct AuditRecord {
    pub id: Uuid,
    pub action: String,
    pub actor_ref: String,
    pub resource_type: String,
    pub resource_id: String,
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// Data for a new audit record.
#[derive(Debug, Clone)]
pub struct NewAuditRecord {
    pub action: String,
    pub actor_ref: String,
    pub resource_type: String,
    pub resource_id: String,
    pub details: serde_json::Value,
}

impl AuditRecord {
    /// Append an audit record.
    pub async fn insert(pool: &PgPool, record: NewAuditRecord) -> Result<(), sqlx::Error> {
        sqlx::query(
            r"
            INSERT INTO audit_log (action, actor_ref, resource_type, resource_id, details)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(&record.action)
        .bind(&record.actor_ref)
        .bind(&record.resource_type)
        .bind(&record.resource_id)
        .bind(&record.details)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Most recent audit records, for reconciliation tooling.
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM audit_log
            ORDER BY created_at DESC
            LIMIT $1
            ",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_shape() {
        let record = NewAuditRecord {
            action: "event.recorded".to_string(),
            actor_ref: "integration:3b1f".to_string(),
            resource_type: "documentation_event".to_string(),
            resource_id: Uuid::new_v4().to_string(),
            details: serde_json::json!({"kind": "note_signed"}),
        };
        assert!(!record.action.is_empty());
        assert!(record.details.is_object());
    }
}
