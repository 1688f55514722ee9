//! Common test utilities for rewards API integration tests.
//!
//! Builds a real `RewardsState` over the database named by `DATABASE_URL`,
//! with per-test fixed reward configuration injected through the
//! `RewardConfigProvider` seam so concurrent tests never race on the global
//! policy tables.

// Each test binary compiles its own copy; not every helper is used by both.
#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tower::util::ServiceExt;
use uuid::Uuid;

use attesta_api_rewards::crypto::{compute_signature, encrypt_secret, generate_secret};
use attesta_api_rewards::services::{MockSettlement, RewardConfigProvider};
use attesta_api_rewards::{rewards_router, RewardsState};
use attesta_core::{AccountId, EntityKind, EventKind};
use attesta_db::{
    CreateEntity, CreateWebhookIntegration, Entity, NetworkFeeSetting, RewardPolicy,
    WebhookIntegration,
};

/// Encryption key used by every test harness.
pub const TEST_KEY: [u8; 32] = [0x42u8; 32];

/// Connect to the test database and apply migrations.
pub async fn setup_pool() -> PgPool {
    let url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must point at a test database for integration tests");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("failed to connect to test database");
    attesta_db::run_migrations(&pool)
        .await
        .expect("migrations failed");
    pool
}

/// A unique account identifier with a recognizable prefix.
pub fn unique_account(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

// ---------------------------------------------------------------------------
// Fixed reward configuration
// ---------------------------------------------------------------------------

/// In-memory configuration provider: one policy (for any kind), one fee.
pub struct FixedConfig {
    pub policy: Option<RewardPolicy>,
    pub fee: Option<NetworkFeeSetting>,
}

impl FixedConfig {
    /// A policy paying `base` with a 100% actor split and no cap.
    pub fn policy(base: Decimal) -> RewardPolicy {
        RewardPolicy {
            id: Uuid::new_v4(),
            event_kind: EventKind::NoteSigned.as_str().to_string(),
            base_reward: base,
            actor_split_percent: Decimal::ONE_HUNDRED,
            org_split_percent: Decimal::ZERO,
            beneficiary_split_percent: Decimal::ZERO,
            daily_cap: None,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    /// A fee setting routing `fee_percent` to the given treasury account.
    pub fn fee(treasury_account: &str, fee_percent: Decimal) -> NetworkFeeSetting {
        NetworkFeeSetting {
            id: Uuid::new_v4(),
            treasury_account_id: treasury_account.to_string(),
            fee_percent,
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl RewardConfigProvider for FixedConfig {
    async fn active_policy(
        &self,
        _kind: EventKind,
    ) -> Result<Option<RewardPolicy>, sqlx::Error> {
        Ok(self.policy.clone())
    }

    async fn network_fee(&self) -> Result<Option<NetworkFeeSetting>, sqlx::Error> {
        Ok(self.fee.clone())
    }
}

// ---------------------------------------------------------------------------
// Test harness
// ---------------------------------------------------------------------------

/// A wired pipeline over the test database.
pub struct TestHarness {
    pub pool: PgPool,
    pub state: RewardsState,
    pub router: Router,
}

impl TestHarness {
    /// Harness with injected fixed configuration.
    pub async fn with_config(config: FixedConfig) -> Self {
        let pool = setup_pool().await;
        let state = RewardsState::with_config(
            pool.clone(),
            TEST_KEY.to_vec(),
            Arc::new(config),
            Arc::new(MockSettlement),
        );
        let router = rewards_router(state.clone());
        Self {
            pool,
            state,
            router,
        }
    }

    /// Register a webhook integration, returning its id and plaintext secret.
    pub async fn register_integration(&self) -> (Uuid, String) {
        let secret = generate_secret();
        let encrypted = encrypt_secret(&secret, &TEST_KEY).expect("encrypt");
        let integration = WebhookIntegration::create(
            &self.pool,
            CreateWebhookIntegration {
                name: unique_account("itg"),
                secret_encrypted: encrypted,
            },
        )
        .await
        .expect("create integration");
        (integration.id, secret)
    }

    /// Register an entity with the given kind and metadata.
    pub async fn register_entity(
        &self,
        account: &str,
        kind: EntityKind,
        metadata: serde_json::Value,
    ) -> Entity {
        let account_id: AccountId = account.parse().expect("valid account id");
        Entity::create(
            &self.pool,
            CreateEntity {
                account_id,
                display_name: None,
                kind,
                parent_org_id: None,
                metadata,
            },
        )
        .await
        .expect("create entity")
    }

    /// Sign and deliver a payload, returning status and parsed body.
    pub async fn deliver(
        &self,
        integration_id: Uuid,
        secret: &str,
        payload: &serde_json::Value,
    ) -> (StatusCode, serde_json::Value) {
        let body_bytes = serde_json::to_vec(payload).expect("serialize payload");
        let signature = compute_signature(secret, &body_bytes);
        self.deliver_raw(integration_id, &signature, body_bytes).await
    }

    /// Deliver raw bytes with an explicit signature header.
    pub async fn deliver_raw(
        &self,
        integration_id: Uuid,
        signature: &str,
        body_bytes: Vec<u8>,
    ) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/events")
            .header("content-type", "application/json")
            .header("x-integration-id", integration_id.to_string())
            .header("x-attesta-signature", signature)
            .body(Body::from(body_bytes))
            .expect("build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router call");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    /// A GET against the router, returning status and parsed body.
    pub async fn get(&self, uri: &str) -> (StatusCode, serde_json::Value) {
        let request = Request::builder()
            .method("GET")
            .uri(uri)
            .body(Body::empty())
            .expect("build request");
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router call");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
        (status, json)
    }
}

/// A minimal valid event payload.
pub fn event_payload(actor_account: &str, subject: &str) -> serde_json::Value {
    serde_json::json!({
        "eventKind": "note.signed",
        "timestamp": Utc::now().to_rfc3339(),
        "actorAccountId": actor_account,
        "subjectId": subject,
    })
}
