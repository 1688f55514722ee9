//! Integration tests for reward distribution: fee carve-outs, org bonus
//! routing, daily caps, the treasury misconfiguration path and its retry,
//! and the ledger query surface.

#![cfg(feature = "integration")]

mod common;

use common::*;

use attesta_core::{EntityKind, RecipientKind};
use attesta_db::{Attestation, AttestationStatus, LedgerStatus, RewardLedgerEntry};
use axum::http::StatusCode;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Full split: B=1000, F=10 → fee=100 (bonus 25 / treasury 75), actor 900.
#[tokio::test]
async fn test_full_distribution_with_org_bonus() {
    let treasury_account = unique_account("treasury");
    let harness = TestHarness::with_config(FixedConfig {
        policy: Some(FixedConfig::policy(dec!(1000))),
        fee: Some(FixedConfig::fee(&treasury_account, dec!(10))),
    })
    .await;
    let (integration_id, secret) = harness.register_integration().await;

    harness
        .register_entity(&treasury_account, EntityKind::Treasury, serde_json::json!({}))
        .await;
    let bonus_account = unique_account("owner");
    let bonus_entity = harness
        .register_entity(&bonus_account, EntityKind::Provider, serde_json::json!({}))
        .await;
    let org_account = unique_account("org");
    harness
        .register_entity(
            &org_account,
            EntityKind::Organization,
            serde_json::json!({ "reward_wallet": bonus_account }),
        )
        .await;
    let actor_account = unique_account("prov");
    let actor = harness
        .register_entity(&actor_account, EntityKind::Provider, serde_json::json!({}))
        .await;

    let mut payload = event_payload(&actor_account, "enc-full");
    payload["organizationContext"] = serde_json::json!(org_account);

    let (status, body) = harness.deliver(integration_id, &secret, &payload).await;
    assert_eq!(status, StatusCode::OK);
    let reward: Decimal = body["rewardAmount"].as_str().unwrap().parse().unwrap();
    let fee: Decimal = body["networkFee"].as_str().unwrap().parse().unwrap();
    assert_eq!(reward, dec!(900));
    assert_eq!(fee, dec!(100));

    let event_id: Uuid = body["eventId"].as_str().unwrap().parse().unwrap();
    let attestation = Attestation::find_by_event_id(&harness.pool, event_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(attestation.status(), AttestationStatus::Confirmed);

    let entries = RewardLedgerEntry::list_for_attestation(&harness.pool, attestation.id)
        .await
        .unwrap();
    assert_eq!(entries.len(), 3);

    let by_kind = |kind: RecipientKind| {
        entries
            .iter()
            .find(|e| e.recipient_kind() == Some(kind))
            .unwrap_or_else(|| panic!("missing {kind} entry"))
    };

    let bonus = by_kind(RecipientKind::OrgBonus);
    assert_eq!(bonus.amount, dec!(25));
    assert_eq!(bonus.recipient_entity_id, bonus_entity.id);

    let treasury = by_kind(RecipientKind::Treasury);
    assert_eq!(treasury.amount, dec!(75));

    let actor_entry = by_kind(RecipientKind::Actor);
    assert_eq!(actor_entry.amount, dec!(900));
    assert_eq!(actor_entry.recipient_entity_id, actor.id);

    // Fee conservation end to end.
    let fee_total = bonus.amount + treasury.amount;
    assert_eq!(fee_total, dec!(100));
    assert_eq!(fee_total + actor_entry.amount, dec!(1000));

    // Every entry is confirmed with the mock settlement reference.
    for entry in &entries {
        assert_eq!(entry.status(), LedgerStatus::Confirmed);
        assert_eq!(
            entry.settlement_ref.as_deref(),
            Some(format!("sim-{}", attestation.id).as_str())
        );
        assert!(entry.confirmed_at.is_some());
    }
}

/// An org whose configured bonus wallet is not a registered entity routes
/// the entire fee to treasury; no entry is created for the unresolved
/// recipient.
#[tokio::test]
async fn test_unregistered_bonus_recipient_falls_back_to_treasury() {
    let treasury_account = unique_account("treasury");
    let harness = TestHarness::with_config(FixedConfig {
        policy: Some(FixedConfig::policy(dec!(1000))),
        fee: Some(FixedConfig::fee(&treasury_account, dec!(10))),
    })
    .await;
    let (integration_id, secret) = harness.register_integration().await;

    harness
        .register_entity(&treasury_account, EntityKind::Treasury, serde_json::json!({}))
        .await;
    let org_account = unique_account("org");
    harness
        .register_entity(
            &org_account,
            EntityKind::Organization,
            serde_json::json!({ "reward_wallet": unique_account("nobody") }),
        )
        .await;
    let actor_account = unique_account("prov");
    harness
        .register_entity(&actor_account, EntityKind::Provider, serde_json::json!({}))
        .await;

    let mut payload = event_payload(&actor_account, "enc-fallback");
    payload["organizationContext"] = serde_json::json!(org_account);

    let (status, body) = harness.deliver(integration_id, &secret, &payload).await;
    assert_eq!(status, StatusCode::OK);

    let event_id: Uuid = body["eventId"].as_str().unwrap().parse().unwrap();
    let attestation = Attestation::find_by_event_id(&harness.pool, event_id)
        .await
        .unwrap()
        .unwrap();
    let entries = RewardLedgerEntry::list_for_attestation(&harness.pool, attestation.id)
        .await
        .unwrap();

    assert!(entries
        .iter()
        .all(|e| e.recipient_kind() != Some(RecipientKind::OrgBonus)));
    let treasury = entries
        .iter()
        .find(|e| e.recipient_kind() == Some(RecipientKind::Treasury))
        .unwrap();
    assert_eq!(treasury.amount, dec!(100));
}

/// An unresolvable treasury surfaces as a 500 configuration error, leaves
/// the attestation pending with zero entries, and distributes cleanly once
/// the treasury is registered.
#[tokio::test]
async fn test_treasury_unresolved_then_retry() {
    let treasury_account = unique_account("treasury");
    let harness = TestHarness::with_config(FixedConfig {
        policy: Some(FixedConfig::policy(dec!(1000))),
        fee: Some(FixedConfig::fee(&treasury_account, dec!(10))),
    })
    .await;
    let (integration_id, secret) = harness.register_integration().await;

    // Deliberately do NOT register the treasury entity.
    let actor_account = unique_account("prov");
    harness
        .register_entity(&actor_account, EntityKind::Provider, serde_json::json!({}))
        .await;

    let payload = event_payload(&actor_account, "enc-treasury");
    let (status, body) = harness.deliver(integration_id, &secret, &payload).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "treasury_unresolved");

    // The event itself is durably recorded: a re-delivery is absorbed as a
    // duplicate even though distribution failed the first time.
    let (dup_status, dup_body) = harness.deliver(integration_id, &secret, &payload).await;
    assert_eq!(dup_status, StatusCode::OK);
    assert_eq!(dup_body["message"], "already processed");

    // Fix the configuration, then retry distribution for the stuck
    // attestation the way the sweep does.
    harness
        .register_entity(&treasury_account, EntityKind::Treasury, serde_json::json!({}))
        .await;

    let event_id: Uuid = dup_body["eventId"].as_str().unwrap().parse().unwrap();
    let attestation = Attestation::find_by_event_id(&harness.pool, event_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(attestation.status(), AttestationStatus::Pending);

    let event = attesta_db::DocumentationEvent::find_by_id(&harness.pool, event_id)
        .await
        .unwrap()
        .unwrap();
    let summary = harness
        .state
        .distributor()
        .distribute(&event, &attestation)
        .await
        .unwrap()
        .expect("distribution succeeds after treasury registration");
    assert_eq!(summary.actor_reward, dec!(900));

    let confirmed = Attestation::find_by_event_id(&harness.pool, event_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(confirmed.status(), AttestationStatus::Confirmed);
}

/// Once the actor's confirmed credits meet the daily cap, further events
/// record without distribution.
#[tokio::test]
async fn test_daily_cap_stops_distribution() {
    let mut policy = FixedConfig::policy(dec!(100));
    policy.daily_cap = Some(dec!(150));
    let harness = TestHarness::with_config(FixedConfig {
        policy: Some(policy),
        fee: None,
    })
    .await;
    let (integration_id, secret) = harness.register_integration().await;

    let actor_account = unique_account("prov");
    harness
        .register_entity(&actor_account, EntityKind::Provider, serde_json::json!({}))
        .await;

    // First two events credit 100 each; after the second, today's total
    // (200) exceeds the 150 cap.
    for (i, expect_reward) in [(0, true), (1, true), (2, false)] {
        let payload = event_payload(&actor_account, &format!("enc-cap-{i}"));
        let (status, body) = harness.deliver(integration_id, &secret, &payload).await;
        assert_eq!(status, StatusCode::OK, "delivery {i}");
        assert_eq!(body["success"], true);
        assert_eq!(
            body.get("rewardAmount").is_some(),
            expect_reward,
            "delivery {i}"
        );
    }
}

/// Ledger listing and balance endpoints aggregate confirmed entries.
#[tokio::test]
async fn test_ledger_query_surface() {
    let harness = TestHarness::with_config(FixedConfig {
        policy: Some(FixedConfig::policy(dec!(250))),
        fee: None,
    })
    .await;
    let (integration_id, secret) = harness.register_integration().await;

    let actor_account = unique_account("prov");
    harness
        .register_entity(&actor_account, EntityKind::Provider, serde_json::json!({}))
        .await;

    for i in 0..2 {
        let payload = event_payload(&actor_account, &format!("enc-ledger-{i}"));
        let (status, _) = harness.deliver(integration_id, &secret, &payload).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, entries) = harness
        .get(&format!("/rewards/ledger/{actor_account}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let entries = entries.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    for entry in entries {
        assert_eq!(entry["status"], "confirmed");
        assert_eq!(entry["recipientKind"], "actor");
    }

    let (status, balance) = harness
        .get(&format!("/rewards/balance/{actor_account}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let total: Decimal = balance["balance"].as_str().unwrap().parse().unwrap();
    assert_eq!(total, dec!(500));

    // Unknown accounts are a 404, not an empty list.
    let (status, _) = harness
        .get(&format!("/rewards/ledger/{}", unique_account("ghost")))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

/// The Postgres-backed configuration provider resolves the newest active
/// policy per kind and the newest fee setting.
#[tokio::test]
async fn test_pg_reward_config_resolution() {
    use attesta_api_rewards::services::{PgRewardConfig, RewardConfigProvider};
    use attesta_core::EventKind;
    use attesta_db::{CreateRewardPolicy, NetworkFeeSetting, RewardPolicy};

    let pool = setup_pool().await;
    let config = PgRewardConfig::new(pool.clone());

    // This test owns the care_plan.updated kind; others use injected config.
    let created = RewardPolicy::create(
        &pool,
        CreateRewardPolicy {
            event_kind: EventKind::CarePlanUpdated,
            base_reward: dec!(42),
            actor_split_percent: dec!(80),
            org_split_percent: dec!(10),
            beneficiary_split_percent: dec!(10),
            daily_cap: Some(dec!(500)),
        },
    )
    .await
    .unwrap();

    let resolved = config
        .active_policy(EventKind::CarePlanUpdated)
        .await
        .unwrap()
        .expect("newest active policy resolves");
    assert_eq!(resolved.id, created.id);
    assert_eq!(resolved.base_reward, dec!(42));

    // Deactivated policies stop resolving.
    RewardPolicy::deactivate(&pool, created.id).await.unwrap();
    let after = config
        .active_policy(EventKind::CarePlanUpdated)
        .await
        .unwrap();
    assert_ne!(after.map(|p| p.id), Some(created.id));

    // Out-of-range splits are refused before the write.
    let invalid = RewardPolicy::create(
        &pool,
        CreateRewardPolicy {
            event_kind: EventKind::CarePlanUpdated,
            base_reward: dec!(1),
            actor_split_percent: dec!(101),
            org_split_percent: dec!(0),
            beneficiary_split_percent: dec!(0),
            daily_cap: None,
        },
    )
    .await;
    assert!(matches!(
        invalid,
        Err(attesta_db::DbError::ValidationFailed(_))
    ));

    // Fee settings: newest wins.
    let treasury = unique_account("treasury");
    NetworkFeeSetting::set(&pool, &treasury, dec!(7)).await.unwrap();
    let current = config.network_fee().await.unwrap().expect("fee configured");
    assert_eq!(current.treasury_account_id, treasury);
    assert_eq!(current.fee_percent, dec!(7));
}

/// The attestation inspection endpoint exposes status plus entries.
#[tokio::test]
async fn test_attestation_inspection() {
    let harness = TestHarness::with_config(FixedConfig {
        policy: Some(FixedConfig::policy(dec!(100))),
        fee: None,
    })
    .await;
    let (integration_id, secret) = harness.register_integration().await;

    let actor_account = unique_account("prov");
    harness
        .register_entity(&actor_account, EntityKind::Provider, serde_json::json!({}))
        .await;

    let payload = event_payload(&actor_account, "enc-inspect");
    let (_, body) = harness.deliver(integration_id, &secret, &payload).await;
    let event_id = body["eventId"].as_str().unwrap();

    let (status, attestation) = harness
        .get(&format!("/rewards/attestations/{event_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(attestation["status"], "confirmed");
    assert_eq!(attestation["eventId"], event_id);
    assert_eq!(attestation["entries"].as_array().unwrap().len(), 1);

    let (missing_status, _) = harness
        .get(&format!("/rewards/attestations/{}", Uuid::new_v4()))
        .await;
    assert_eq!(missing_status, StatusCode::NOT_FOUND);
}
