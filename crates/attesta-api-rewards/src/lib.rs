//! attesta Rewards API
//!
//! The event ingestion → attestation → reward distribution pipeline:
//! authenticates untrusted webhook senders (HMAC over the exact raw body),
//! deduplicates at-least-once delivery on a canonical content hash, and
//! atomically computes and records multi-party reward splits in an
//! append-only ledger.
//!
//! Request flow: signature verification → event recording (dedup +
//! persist) → policy resolution → reward distribution → ledger writes.
//! Failures before persistence have no side effects; failures after the
//! event is recorded leave a pending attestation with zero entries, which
//! the redistribution sweep retries.

pub mod crypto;
pub mod error;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod validation;

pub use error::{ApiResult, ErrorResponse, RewardsApiError};
pub use router::{rewards_router, RewardsState};
pub use services::{
    AuditService, EventRecorder, MockSettlement, PgRewardConfig, RewardConfigProvider,
    RewardDistributor, SettlementBackend,
};
