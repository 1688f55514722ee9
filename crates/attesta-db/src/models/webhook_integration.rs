//! Registered webhook integrations.
//!
//! An integration is a third-party sender (an EHR, a documentation platform)
//! trusted to deliver events. Its shared secret is stored AES-GCM encrypted;
//! the plaintext exists only transiently during signature verification.

use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// A registered webhook sender.
#[derive(Debug, Clone, FromRow)]
pub struct WebhookIntegration {
    /// Primary key; senders present this in the `X-Integration-Id` header.
    pub id: Uuid,
    /// Human-readable unique name.
    pub name: String,
    /// AES-256-GCM encrypted shared secret, base64(nonce || ciphertext).
    pub secret_encrypted: String,
    /// Inactive integrations fail signature verification outright.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Data needed to register a new integration.
#[derive(Debug, Clone)]
pub struct CreateWebhookIntegration {
    pub name: String,
    pub secret_encrypted: String,
}

impl WebhookIntegration {
    /// Register a new integration.
    pub async fn create(
        pool: &PgPool,
        data: CreateWebhookIntegration,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO webhook_integrations (name, secret_encrypted)
            VALUES ($1, $2)
            RETURNING *
            ",
        )
        .bind(&data.name)
        .bind(&data.secret_encrypted)
        .fetch_one(pool)
        .await
    }

    /// Look up an integration by id.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM webhook_integrations
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// List all integrations, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM webhook_integrations
            ORDER BY created_at DESC
            ",
        )
        .fetch_all(pool)
        .await
    }

    /// Deactivate an integration. Returns false if it did not exist.
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE webhook_integrations
            SET is_active = FALSE
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_data_shape() {
        let data = CreateWebhookIntegration {
            name: "ehr-north".to_string(),
            secret_encrypted: "bm9uY2U=".to_string(),
        };
        assert!(!data.name.is_empty());
        assert!(!data.secret_encrypted.is_empty());
    }
}
