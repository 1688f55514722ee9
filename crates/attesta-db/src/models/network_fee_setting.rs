//! Global network fee configuration.
//!
//! A single logical setting: the treasury account identifier and the fee
//! percentage taken off the top of every base reward. Read-only to the
//! pipeline; updated via seed/ops tooling (`set` appends a new row, newest
//! wins).

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::error::DbError;

/// The current network fee configuration.
#[derive(Debug, Clone, FromRow)]
pub struct NetworkFeeSetting {
    pub id: Uuid,
    /// Normalized account id of the treasury entity.
    pub treasury_account_id: String,
    /// Percentage of every base reward routed to the network, [0, 100].
    pub fee_percent: Decimal,
    pub updated_at: DateTime<Utc>,
}

impl NetworkFeeSetting {
    /// The newest fee setting, if any has been configured.
    pub async fn current(pool: &PgPool) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM network_fee_settings
            ORDER BY updated_at DESC
            LIMIT 1
            ",
        )
        .fetch_optional(pool)
        .await
    }

    /// Append a new fee setting (ops/seed tooling).
    pub async fn set(
        pool: &PgPool,
        treasury_account_id: &str,
        fee_percent: Decimal,
    ) -> Result<Self, DbError> {
        if fee_percent < Decimal::ZERO || fee_percent > Decimal::from(100) {
            return Err(DbError::ValidationFailed(format!(
                "fee percent must be within [0, 100], got {fee_percent}"
            )));
        }

        let setting = sqlx::query_as(
            r"
            INSERT INTO network_fee_settings (treasury_account_id, fee_percent)
            VALUES ($1, $2)
            RETURNING *
            ",
        )
        .bind(treasury_account_id)
        .bind(fee_percent)
        .fetch_one(pool)
        .await?;

        Ok(setting)
    }
}
