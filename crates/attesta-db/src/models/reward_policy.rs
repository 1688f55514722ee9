//! Reward policies: event kind → base reward and stakeholder splits.
//!
//! Read-only to the pipeline. Split percentages are range-checked [0, 100]
//! individually; whether they sum to 100 is a policy-author decision, not
//! enforced here; a policy may intentionally under- or over-allocate.

use attesta_core::EventKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DbError;

/// Reward configuration for one event kind.
#[derive(Debug, Clone, FromRow)]
pub struct RewardPolicy {
    pub id: Uuid,
    /// Storage form of [`EventKind`].
    pub event_kind: String,
    pub base_reward: Decimal,
    pub actor_split_percent: Decimal,
    pub org_split_percent: Decimal,
    pub beneficiary_split_percent: Decimal,
    /// Optional per-actor cap on confirmed actor credits per UTC day.
    pub daily_cap: Option<Decimal>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Data needed to create a policy (seed tooling and tests).
#[derive(Debug, Clone)]
pub struct CreateRewardPolicy {
    pub event_kind: EventKind,
    pub base_reward: Decimal,
    pub actor_split_percent: Decimal,
    pub org_split_percent: Decimal,
    pub beneficiary_split_percent: Decimal,
    pub daily_cap: Option<Decimal>,
}

fn percent_in_range(value: Decimal) -> bool {
    value >= Decimal::ZERO && value <= Decimal::from(100)
}

impl RewardPolicy {
    /// The active policy for an event kind, newest first.
    pub async fn find_active(
        pool: &PgPool,
        kind: EventKind,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM reward_policies
            WHERE event_kind = $1 AND is_active = TRUE
            ORDER BY created_at DESC
            LIMIT 1
            ",
        )
        .bind(kind.as_str())
        .fetch_optional(pool)
        .await
    }

    /// Create a policy after range-checking every percentage.
    pub async fn create(pool: &PgPool, data: CreateRewardPolicy) -> Result<Self, DbError> {
        if data.base_reward < Decimal::ZERO {
            return Err(DbError::ValidationFailed(
                "base reward must be non-negative".to_string(),
            ));
        }
        for (name, value) in [
            ("actor split", data.actor_split_percent),
            ("org split", data.org_split_percent),
            ("beneficiary split", data.beneficiary_split_percent),
        ] {
            if !percent_in_range(value) {
                return Err(DbError::ValidationFailed(format!(
                    "{name} percent must be within [0, 100], got {value}"
                )));
            }
        }
        if let Some(cap) = data.daily_cap {
            if cap < Decimal::ZERO {
                return Err(DbError::ValidationFailed(
                    "daily cap must be non-negative".to_string(),
                ));
            }
        }

        let policy = sqlx::query_as(
            r"
            INSERT INTO reward_policies (
                event_kind, base_reward, actor_split_percent,
                org_split_percent, beneficiary_split_percent, daily_cap
            )
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(data.event_kind.as_str())
        .bind(data.base_reward)
        .bind(data.actor_split_percent)
        .bind(data.org_split_percent)
        .bind(data.beneficiary_split_percent)
        .bind(data.daily_cap)
        .fetch_one(pool)
        .await?;

        Ok(policy)
    }

    /// Deactivate a policy. Returns false if it did not exist.
    pub async fn deactivate(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r"
            UPDATE reward_policies
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
