//! Axum router and shared state for the rewards API.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use sqlx::PgPool;

use crate::handlers::{admin, ingest, ledger};
use crate::services::{
    AuditService, EventRecorder, PgRewardConfig, RewardConfigProvider, RewardDistributor,
    SettlementBackend,
};

/// Shared state for rewards handlers.
#[derive(Clone)]
pub struct RewardsState {
    pool: PgPool,
    encryption_key: Arc<Vec<u8>>,
    recorder: Arc<EventRecorder>,
    distributor: Arc<RewardDistributor>,
    audit: Arc<AuditService>,
}

impl RewardsState {
    /// Assemble the state with the Postgres-backed configuration provider
    /// and the given settlement backend.
    #[must_use]
    pub fn new(
        pool: PgPool,
        encryption_key: Vec<u8>,
        settlement: Arc<dyn SettlementBackend>,
    ) -> Self {
        let config: Arc<dyn RewardConfigProvider> =
            Arc::new(PgRewardConfig::new(pool.clone()));
        Self::with_config(pool, encryption_key, config, settlement)
    }

    /// Assemble the state with an explicit configuration provider
    /// (injected so the distributor is testable without a live store).
    #[must_use]
    pub fn with_config(
        pool: PgPool,
        encryption_key: Vec<u8>,
        config: Arc<dyn RewardConfigProvider>,
        settlement: Arc<dyn SettlementBackend>,
    ) -> Self {
        let recorder = Arc::new(EventRecorder::new(pool.clone()));
        let distributor = Arc::new(RewardDistributor::new(pool.clone(), config, settlement));
        let audit = Arc::new(AuditService::new(pool.clone()));
        Self {
            pool,
            encryption_key: Arc::new(encryption_key),
            recorder,
            distributor,
            audit,
        }
    }

    /// The database pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// The key integration secrets are encrypted under.
    #[must_use]
    pub fn encryption_key(&self) -> &[u8] {
        &self.encryption_key
    }

    /// The event recorder.
    #[must_use]
    pub fn recorder(&self) -> &EventRecorder {
        &self.recorder
    }

    /// The reward distributor.
    #[must_use]
    pub fn distributor(&self) -> &RewardDistributor {
        &self.distributor
    }

    /// The audit sink.
    #[must_use]
    pub fn audit(&self) -> &AuditService {
        &self.audit
    }
}

/// Creates the rewards router with all routes.
pub fn rewards_router(state: RewardsState) -> Router {
    Router::new()
        // Webhook ingestion
        .route("/events", post(ingest::ingest_event_handler))
        // Ledger query surface
        .route(
            "/rewards/ledger/:account_id",
            get(ledger::list_ledger_handler),
        )
        .route(
            "/rewards/balance/:account_id",
            get(ledger::balance_handler),
        )
        .route(
            "/rewards/attestations/:event_id",
            get(ledger::attestation_handler),
        )
        // Registration surface
        .route(
            "/integrations",
            post(admin::create_integration_handler).get(admin::list_integrations_handler),
        )
        .route("/entities", post(admin::register_entity_handler))
        .route("/entities/:account_id", get(admin::get_entity_handler))
        .with_state(state)
}
