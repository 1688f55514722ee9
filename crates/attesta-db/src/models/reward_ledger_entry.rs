//! The append-only reward ledger.
//!
//! One entry per stakeholder credit, all entries of a distribution written
//! in a single transaction together with the attestation confirmation.
//! Confirmed entries are never updated; corrections are new offsetting rows
//! linked via `offsets_entry_id`.

use attesta_core::RecipientKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

/// Ledger entry lifecycle status, mirroring the attestation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LedgerStatus {
    Pending,
    Confirmed,
    Rejected,
    Expired,
}

impl LedgerStatus {
    /// Convert from database string representation.
    #[must_use]
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "confirmed" => Some(Self::Confirmed),
            "rejected" => Some(Self::Rejected),
            "expired" => Some(Self::Expired),
            _ => None,
        }
    }

    /// Convert to database string representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Rejected => "rejected",
            Self::Expired => "expired",
        }
    }

    /// Terminal entries are immutable: amount and recipient never change.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// One credit to one recipient, derived from one attestation.
#[derive(Debug, Clone, FromRow)]
pub struct RewardLedgerEntry {
    pub id: Uuid,
    pub attestation_id: Uuid,
    pub recipient_entity_id: Uuid,
    /// Storage form of [`RecipientKind`].
    pub recipient_kind: String,
    /// Non-negative fixed-point amount.
    pub amount: Decimal,
    pub status: String,
    /// Reference supplied by the settlement backend.
    pub settlement_ref: Option<String>,
    /// When this entry corrects an earlier one, the entry it offsets.
    pub offsets_entry_id: Option<Uuid>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A planned credit, produced by the distributor's pure computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLedgerCredit {
    pub recipient_entity_id: Uuid,
    pub recipient_kind: RecipientKind,
    pub amount: Decimal,
}

impl RewardLedgerEntry {
    /// Get the typed status.
    #[must_use]
    pub fn status(&self) -> LedgerStatus {
        LedgerStatus::from_db(&self.status).unwrap_or(LedgerStatus::Pending)
    }

    /// Get the typed recipient kind.
    #[must_use]
    pub fn recipient_kind(&self) -> Option<RecipientKind> {
        RecipientKind::from_db(&self.recipient_kind)
    }

    /// Write a full distribution atomically.
    ///
    /// Every credit is inserted as `confirmed` and the attestation flips
    /// pending → confirmed in the same transaction. Any failure rolls the
    /// whole batch back, leaving the attestation pending with zero entries,
    /// never a half-paid state. Returns the entries in insertion order.
    pub async fn commit_distribution(
        pool: &PgPool,
        attestation_id: Uuid,
        credits: &[NewLedgerCredit],
        settlement_ref: Option<&str>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut written = Vec::with_capacity(credits.len());

        for credit in credits {
            let entry: RewardLedgerEntry = sqlx::query_as(
                r"
                INSERT INTO reward_ledger (
                    attestation_id, recipient_entity_id, recipient_kind,
                    amount, status, settlement_ref, confirmed_at
                )
                VALUES ($1, $2, $3, $4, 'confirmed', $5, NOW())
                RETURNING *
                ",
            )
            .bind(attestation_id)
            .bind(credit.recipient_entity_id)
            .bind(credit.recipient_kind.as_str())
            .bind(credit.amount)
            .bind(settlement_ref)
            .fetch_one(&mut *tx)
            .await?;
            written.push(entry);
        }

        sqlx::query(
            r"
            UPDATE attestations
            SET status = 'confirmed', updated_at = NOW()
            WHERE id = $1 AND status = 'pending'
            ",
        )
        .bind(attestation_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(written)
    }

    /// Entries for a recipient, newest first, optionally filtered by status.
    pub async fn list_for_recipient(
        pool: &PgPool,
        recipient_entity_id: Uuid,
        status: Option<LedgerStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        match status {
            Some(s) => {
                sqlx::query_as(
                    r"
                    SELECT * FROM reward_ledger
                    WHERE recipient_entity_id = $1 AND status = $2
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    ",
                )
                .bind(recipient_entity_id)
                .bind(s.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
            }
            None => {
                sqlx::query_as(
                    r"
                    SELECT * FROM reward_ledger
                    WHERE recipient_entity_id = $1
                    ORDER BY created_at DESC
                    LIMIT $2 OFFSET $3
                    ",
                )
                .bind(recipient_entity_id)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
            }
        }
    }

    /// Sum of confirmed amounts for a recipient. The balance view external
    /// dashboards aggregate from.
    pub async fn confirmed_balance(
        pool: &PgPool,
        recipient_entity_id: Uuid,
    ) -> Result<Decimal, sqlx::Error> {
        let row: (Decimal,) = sqlx::query_as(
            r"
            SELECT COALESCE(SUM(amount), 0) FROM reward_ledger
            WHERE recipient_entity_id = $1 AND status = 'confirmed'
            ",
        )
        .bind(recipient_entity_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// Sum of confirmed actor credits for a recipient on the current UTC
    /// day. Used for daily-cap checks.
    pub async fn confirmed_actor_total_today(
        pool: &PgPool,
        recipient_entity_id: Uuid,
    ) -> Result<Decimal, sqlx::Error> {
        let row: (Decimal,) = sqlx::query_as(
            r"
            SELECT COALESCE(SUM(amount), 0) FROM reward_ledger
            WHERE recipient_entity_id = $1
              AND recipient_kind = 'actor'
              AND status = 'confirmed'
              AND confirmed_at >= date_trunc('day', NOW() AT TIME ZONE 'UTC') AT TIME ZONE 'UTC'
            ",
        )
        .bind(recipient_entity_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }

    /// All entries stemming from one attestation, in insertion order.
    pub async fn list_for_attestation(
        pool: &PgPool,
        attestation_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as(
            r"
            SELECT * FROM reward_ledger
            WHERE attestation_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(attestation_id)
        .fetch_all(pool)
        .await
    }

    /// Number of entries stemming from one attestation.
    pub async fn count_for_attestation(
        pool: &PgPool,
        attestation_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as(
            r"
            SELECT COUNT(*) FROM reward_ledger
            WHERE attestation_id = $1
            ",
        )
        .bind(attestation_id)
        .fetch_one(pool)
        .await?;
        Ok(row.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            LedgerStatus::Pending,
            LedgerStatus::Confirmed,
            LedgerStatus::Rejected,
            LedgerStatus::Expired,
        ] {
            assert_eq!(LedgerStatus::from_db(status.as_str()), Some(status));
        }
        assert_eq!(LedgerStatus::from_db("unknown"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!LedgerStatus::Pending.is_terminal());
        assert!(LedgerStatus::Confirmed.is_terminal());
        assert!(LedgerStatus::Rejected.is_terminal());
        assert!(LedgerStatus::Expired.is_terminal());
    }

    #[test]
    fn test_new_credit_shape() {
        let credit = NewLedgerCredit {
            recipient_entity_id: Uuid::new_v4(),
            recipient_kind: RecipientKind::Treasury,
            amount: dec!(75),
        };
        assert_eq!(credit.recipient_kind.as_str(), "treasury");
        assert!(credit.amount >= Decimal::ZERO);
    }
}
