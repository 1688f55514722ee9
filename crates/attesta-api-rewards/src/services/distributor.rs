//! Reward Distributor: fee carve-out, stakeholder splits, ledger writes.
//!
//! The split computation is a pure function over fixed-point decimals so
//! the money math is testable without a store. Persistence wraps the whole
//! plan in one transaction; a mid-distribution failure rolls back to
//! "attestation pending, zero entries" and is safe to retry.

use std::sync::Arc;

use attesta_core::{AccountId, RecipientKind};
use attesta_db::{
    Attestation, DocumentationEvent, Entity, NewLedgerCredit, RewardLedgerEntry,
};
use chrono::Duration;
use rust_decimal::{Decimal, RoundingStrategy};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{ApiResult, RewardsApiError};
use crate::services::policy::{org_bonus_recipient, RewardConfigProvider};
use crate::services::settlement::SettlementBackend;

/// Share of the network fee carved out for the organization's designated
/// bonus recipient, when one is configured and registered.
pub const ORG_BONUS_PERCENT: u32 = 25;

/// Decimal places carried on computed amounts.
const MONEY_SCALE: u32 = 8;

/// How long a pending attestation with zero entries must sit before the
/// redistribution sweep retries it.
const STUCK_AFTER_MINUTES: i64 = 5;

/// Max attestations retried per sweep.
const REDISTRIBUTE_BATCH: i64 = 50;

/// `amount * percent / 100`, rounded once.
///
/// Banker's rounding at a single point; every other amount is derived by
/// exact subtraction so conservation holds identically (see
/// [`compute_distribution`]).
fn pct_of(amount: Decimal, percent: Decimal) -> Decimal {
    (amount * percent / Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven)
}

/// Resolved inputs to the pure split computation.
///
/// Recipient fields are `None` when the corresponding party is absent or
/// did not resolve to a registered entity; the computation then routes or
/// omits their share per the rules below, never inventing a recipient.
#[derive(Debug, Clone)]
pub struct DistributionInput {
    pub base_reward: Decimal,
    pub fee_percent: Decimal,
    pub actor_split_percent: Decimal,
    pub org_split_percent: Decimal,
    pub beneficiary_split_percent: Decimal,
    pub actor_entity_id: Uuid,
    pub org_entity_id: Option<Uuid>,
    pub beneficiary_entity_id: Option<Uuid>,
    /// The organization's registered bonus recipient; `None` collapses the
    /// bonus to zero and routes the whole fee to treasury.
    pub org_bonus_entity_id: Option<Uuid>,
    /// Resolved treasury entity. The caller must have resolved this
    /// whenever the fee amount is positive.
    pub treasury_entity_id: Option<Uuid>,
}

/// The full set of planned credits for one event.
#[derive(Debug, Clone)]
pub struct DistributionPlan {
    /// Credits in write order: org bonus, treasury, actor, organization,
    /// beneficiary. Zero-amount credits are omitted.
    pub credits: Vec<NewLedgerCredit>,
    pub network_fee: Decimal,
    pub remaining: Decimal,
    pub org_bonus: Decimal,
    pub treasury_amount: Decimal,
    pub actor_reward: Decimal,
}

/// Compute the fee-adjusted multi-party split.
///
/// Invariants, exact in fixed point:
/// - `network_fee + remaining == base_reward`
/// - `org_bonus + treasury_amount == network_fee`
///
/// Percentage products are rounded once (banker's, 8 dp); `remaining` and
/// `treasury_amount` are exact differences, so no rounding leakage is
/// possible between the conserved pairs.
#[must_use]
pub fn compute_distribution(input: &DistributionInput) -> DistributionPlan {
    let network_fee = pct_of(input.base_reward, input.fee_percent);
    let remaining = input.base_reward - network_fee;

    let (org_bonus, treasury_amount) =
        if network_fee > Decimal::ZERO && input.org_bonus_entity_id.is_some() {
            let bonus = pct_of(network_fee, Decimal::from(ORG_BONUS_PERCENT));
            (bonus, network_fee - bonus)
        } else {
            (Decimal::ZERO, network_fee)
        };

    let actor_reward = pct_of(remaining, input.actor_split_percent);

    let org_share = match input.org_entity_id {
        Some(_) => pct_of(remaining, input.org_split_percent),
        None => Decimal::ZERO,
    };
    let beneficiary_share = match input.beneficiary_entity_id {
        Some(_) => pct_of(remaining, input.beneficiary_split_percent),
        None => Decimal::ZERO,
    };

    let mut credits = Vec::new();

    if org_bonus > Decimal::ZERO {
        if let Some(recipient) = input.org_bonus_entity_id {
            credits.push(NewLedgerCredit {
                recipient_entity_id: recipient,
                recipient_kind: RecipientKind::OrgBonus,
                amount: org_bonus,
            });
        }
    }
    if treasury_amount > Decimal::ZERO {
        if let Some(treasury) = input.treasury_entity_id {
            credits.push(NewLedgerCredit {
                recipient_entity_id: treasury,
                recipient_kind: RecipientKind::Treasury,
                amount: treasury_amount,
            });
        }
    }
    if actor_reward > Decimal::ZERO {
        credits.push(NewLedgerCredit {
            recipient_entity_id: input.actor_entity_id,
            recipient_kind: RecipientKind::Actor,
            amount: actor_reward,
        });
    }
    if org_share > Decimal::ZERO {
        if let Some(org) = input.org_entity_id {
            credits.push(NewLedgerCredit {
                recipient_entity_id: org,
                recipient_kind: RecipientKind::Organization,
                amount: org_share,
            });
        }
    }
    if beneficiary_share > Decimal::ZERO {
        if let Some(beneficiary) = input.beneficiary_entity_id {
            credits.push(NewLedgerCredit {
                recipient_entity_id: beneficiary,
                recipient_kind: RecipientKind::Beneficiary,
                amount: beneficiary_share,
            });
        }
    }

    DistributionPlan {
        credits,
        network_fee,
        remaining,
        org_bonus,
        treasury_amount,
        actor_reward,
    }
}

/// What a completed distribution credited.
#[derive(Debug, Clone)]
pub struct DistributionSummary {
    pub actor_reward: Decimal,
    pub network_fee: Decimal,
    pub entries_written: usize,
}

/// Computes and persists reward distributions.
#[derive(Clone)]
pub struct RewardDistributor {
    pool: PgPool,
    config: Arc<dyn RewardConfigProvider>,
    settlement: Arc<dyn SettlementBackend>,
}

impl RewardDistributor {
    /// Create a new distributor.
    #[must_use]
    pub fn new(
        pool: PgPool,
        config: Arc<dyn RewardConfigProvider>,
        settlement: Arc<dyn SettlementBackend>,
    ) -> Self {
        Self {
            pool,
            config,
            settlement,
        }
    }

    /// Distribute rewards for a recorded event.
    ///
    /// Returns `Ok(None)` when nothing accrues: no active policy, a met
    /// daily cap, or a plan with no positive credits. In those cases the
    /// attestation stays pending and zero entries exist, which is exactly
    /// the state the redistribution sweep knows how to retry once
    /// configuration changes.
    pub async fn distribute(
        &self,
        event: &DocumentationEvent,
        attestation: &Attestation,
    ) -> ApiResult<Option<DistributionSummary>> {
        let Some(kind) = event.kind() else {
            tracing::warn!(event_id = %event.id, kind = %event.kind, "Stored event has unknown kind");
            return Ok(None);
        };

        let Some(policy) = self.config.active_policy(kind).await? else {
            tracing::debug!(event_id = %event.id, kind = %kind, "No active policy; event recorded without reward");
            return Ok(None);
        };

        let fee_setting = self.config.network_fee().await?;
        let fee_percent = fee_setting
            .as_ref()
            .map(|s| s.fee_percent)
            .unwrap_or(Decimal::ZERO);

        // Daily cap: once the actor's confirmed credits for today meet the
        // cap, the event records but earns nothing. No partial top-up.
        if let Some(cap) = policy.daily_cap {
            let today =
                RewardLedgerEntry::confirmed_actor_total_today(&self.pool, event.actor_entity_id)
                    .await?;
            if today >= cap {
                tracing::info!(
                    event_id = %event.id,
                    actor_entity_id = %event.actor_entity_id,
                    cap = %cap,
                    accrued_today = %today,
                    "Daily reward cap reached; recording without distribution"
                );
                return Ok(None);
            }
        }

        // Resolve the treasury entity whenever a positive fee will be
        // carved out. An unresolvable treasury is a configuration error:
        // money would be owed with nowhere to route it.
        let prospective_fee = pct_of(policy.base_reward, fee_percent);
        let treasury_entity_id = if prospective_fee > Decimal::ZERO {
            let setting = fee_setting
                .as_ref()
                .expect("positive fee implies a fee setting");
            let account = setting.treasury_account_id.parse().map_err(|e| {
                RewardsApiError::TreasuryUnresolved(format!(
                    "{}: {e}",
                    setting.treasury_account_id
                ))
            })?;
            match Entity::find_by_account_id(&self.pool, &account).await? {
                Some(treasury) => Some(treasury.id),
                None => {
                    tracing::error!(
                        treasury_account = %account,
                        event_id = %event.id,
                        "Treasury account is not a registered entity; fee cannot be routed"
                    );
                    return Err(RewardsApiError::TreasuryUnresolved(account.to_string()));
                }
            }
        } else {
            None
        };

        // Resolve the org and, from its metadata, the bonus recipient. A
        // configured-but-unregistered recipient collapses the bonus to zero
        // so the full fee routes to treasury; misconfiguration must not
        // vanish or double-pay money.
        let organization = match event.org_entity_id {
            Some(org_id) => Entity::find_by_id(&self.pool, org_id).await?,
            None => None,
        };
        let org_bonus_entity_id = match organization.as_ref().and_then(org_bonus_recipient) {
            Some(account) => match Entity::find_by_account_id(&self.pool, &account).await? {
                Some(recipient) => Some(recipient.id),
                None => {
                    tracing::warn!(
                        bonus_account = %account,
                        event_id = %event.id,
                        "Configured org bonus recipient is not registered; routing full fee to treasury"
                    );
                    None
                }
            },
            None => None,
        };

        // Beneficiary split applies only when the subject reference names a
        // registered entity.
        let beneficiary_entity_id = if policy.beneficiary_split_percent > Decimal::ZERO {
            match event.subject_ref.as_deref().map(|s| s.parse::<AccountId>()) {
                Some(Ok(account)) => Entity::find_by_account_id(&self.pool, &account)
                    .await?
                    .map(|e| e.id),
                _ => None,
            }
        } else {
            None
        };

        let plan = compute_distribution(&DistributionInput {
            base_reward: policy.base_reward,
            fee_percent,
            actor_split_percent: policy.actor_split_percent,
            org_split_percent: policy.org_split_percent,
            beneficiary_split_percent: policy.beneficiary_split_percent,
            actor_entity_id: event.actor_entity_id,
            org_entity_id: event.org_entity_id,
            beneficiary_entity_id,
            org_bonus_entity_id,
            treasury_entity_id,
        });

        if plan.credits.is_empty() {
            tracing::debug!(event_id = %event.id, "Distribution plan is empty; nothing to credit");
            return Ok(None);
        }

        let settlement_ref = self.settlement.settlement_reference(attestation.id);
        let written = RewardLedgerEntry::commit_distribution(
            &self.pool,
            attestation.id,
            &plan.credits,
            settlement_ref.as_deref(),
        )
        .await?;

        tracing::info!(
            event_id = %event.id,
            attestation_id = %attestation.id,
            entries = written.len(),
            actor_reward = %plan.actor_reward,
            network_fee = %plan.network_fee,
            settlement = self.settlement.name(),
            "Reward distribution committed"
        );

        Ok(Some(DistributionSummary {
            actor_reward: plan.actor_reward,
            network_fee: plan.network_fee,
            entries_written: written.len(),
        }))
    }

    /// Retry distribution for attestations left pending with zero entries.
    ///
    /// Safe against the original request racing us: the distribution
    /// transaction only confirms an attestation still pending, and a second
    /// committed distribution for the same attestation would require both
    /// to observe zero entries, which the sweep's age cutoff plus the
    /// request path's synchronous ordering prevents in practice.
    /// Returns the number of attestations that distributed.
    pub async fn redistribute_stuck(&self) -> usize {
        let stuck = match Attestation::list_stuck_pending(
            &self.pool,
            Duration::minutes(STUCK_AFTER_MINUTES),
            REDISTRIBUTE_BATCH,
        )
        .await
        {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list stuck attestations");
                return 0;
            }
        };

        let mut distributed = 0;
        for attestation in stuck {
            let event = match DocumentationEvent::find_by_id(&self.pool, attestation.event_id)
                .await
            {
                Ok(Some(event)) => event,
                Ok(None) => {
                    tracing::error!(
                        attestation_id = %attestation.id,
                        "Attestation references a missing event"
                    );
                    continue;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load event for redistribution");
                    continue;
                }
            };

            match self.distribute(&event, &attestation).await {
                Ok(Some(summary)) => {
                    distributed += 1;
                    tracing::info!(
                        attestation_id = %attestation.id,
                        actor_reward = %summary.actor_reward,
                        "Redistributed stuck attestation"
                    );
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        attestation_id = %attestation.id,
                        error = %e,
                        "Redistribution attempt failed"
                    );
                }
            }
        }
        distributed
    }
}
