//! Registered entities: providers, patients, organizations, treasury accounts.
//!
//! Entities are created on registration and never deleted; ledger history
//! references them. The `account_id` column is the normalized lowercase
//! wallet/account identifier external systems use to name an entity; it is
//! unique and every lookup goes through it.

use attesta_core::{AccountId, EntityKind};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// An actor in the system.
#[derive(Debug, Clone, FromRow)]
pub struct Entity {
    pub id: Uuid,
    /// Normalized lowercase account identifier, unique.
    pub account_id: String,
    pub display_name: Option<String>,
    /// Storage form of [`EntityKind`].
    pub kind: String,
    /// Sponsoring organization, for providers that belong to one.
    pub parent_org_id: Option<Uuid>,
    pub is_verified: bool,
    /// Free-form metadata; may carry the org bonus recipient keys
    /// (`reward_wallet`, `owner_wallet`).
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Data needed to register a new entity.
#[derive(Debug, Clone)]
pub struct CreateEntity {
    pub account_id: AccountId,
    pub display_name: Option<String>,
    pub kind: EntityKind,
    pub parent_org_id: Option<Uuid>,
    pub metadata: serde_json::Value,
}

impl Entity {
    /// Get the typed entity kind.
    ///
    /// Rows are only written through [`EntityKind::as_str`], so an
    /// unrecognized value means external tampering; default to Provider
    /// rather than panicking in a read path.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        EntityKind::from_db(&self.kind).unwrap_or(EntityKind::Provider)
    }

    /// Register a new entity.
    ///
    /// A duplicate account id surfaces as a unique violation; callers map it
    /// to a conflict via [`crate::is_unique_violation`].
    pub async fn create(pool: &PgPool, data: CreateEntity) -> Result<Self, sqlx::Error> {
        sqlx::query_as(
            r"
            INSERT INTO entities (account_id, display_name, kind, parent_org_id, metadata)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(data.account_id.as_str())
        .bind(&data.display_name)
        .bind(data.kind.as_str())
        .bind(data.parent_org_id)
        .bind(&data.metadata)
        .fetch_one(pool)
        .await
    }

    /// Look up an entity by normalized account id.
    pub async fn find_by_account_id(
        pool: &PgPool,
        account_id: &AccountId,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM entities
            WHERE account_id = $1
            ",
        )
        .bind(account_id.as_str())
        .fetch_optional(pool)
        .await
    }

    /// Look up an entity by primary key.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM entities
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    /// Mark an entity verified. Returns false if it did not exist.
    pub async fn mark_verified(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE entities
            SET is_verified = TRUE, updated_at = NOW()
            WHERE id = $1
            ",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
