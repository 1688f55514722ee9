//! Policy and fee-setting resolution.
//!
//! Pure lookups, no side effects. Policy absence is not an error; it means
//! "record the event, no reward accrues". The provider is a trait so the
//! distributor is testable without a live store.

use async_trait::async_trait;
use attesta_core::{AccountId, EventKind};
use attesta_db::{Entity, NetworkFeeSetting, RewardPolicy};
use sqlx::PgPool;

/// Metadata keys consulted for an organization's designated bonus
/// recipient, in precedence order. The first key present with a non-empty,
/// parseable value wins; no other keys are consulted. This order is part of
/// the configuration contract: changing it re-routes money.
pub const ORG_BONUS_RECIPIENT_KEYS: [&str; 2] = ["reward_wallet", "owner_wallet"];

/// Read-only reward configuration provider.
#[async_trait]
pub trait RewardConfigProvider: Send + Sync {
    /// The active policy for an event kind, if any.
    async fn active_policy(
        &self,
        kind: EventKind,
    ) -> Result<Option<RewardPolicy>, sqlx::Error>;

    /// The current network fee setting, if configured.
    async fn network_fee(&self) -> Result<Option<NetworkFeeSetting>, sqlx::Error>;
}

/// Postgres-backed configuration provider.
#[derive(Clone)]
pub struct PgRewardConfig {
    pool: PgPool,
}

impl PgRewardConfig {
    /// Create a new provider over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RewardConfigProvider for PgRewardConfig {
    async fn active_policy(
        &self,
        kind: EventKind,
    ) -> Result<Option<RewardPolicy>, sqlx::Error> {
        RewardPolicy::find_active(&self.pool, kind).await
    }

    async fn network_fee(&self) -> Result<Option<NetworkFeeSetting>, sqlx::Error> {
        NetworkFeeSetting::current(&self.pool).await
    }
}

/// Resolve an organization's designated bonus recipient from its metadata.
///
/// Returns the normalized account id, or `None` when no key is configured
/// or the configured value does not normalize. Whether that account belongs
/// to a registered entity is the distributor's concern.
#[must_use]
pub fn org_bonus_recipient(org: &Entity) -> Option<AccountId> {
    let metadata = org.metadata.as_object()?;
    for key in ORG_BONUS_RECIPIENT_KEYS {
        if let Some(raw) = metadata.get(key).and_then(|v| v.as_str()) {
            if let Ok(account) = raw.parse::<AccountId>() {
                return Some(account);
            }
        }
    }
    None
}
