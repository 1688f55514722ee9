//! attesta Database Layer
//!
//! Postgres persistence for the reward pipeline: registered entities and
//! integrations, documentation events (unique on content hash), attestations,
//! the append-only reward ledger, and the read-only reward configuration
//! tables (policies, network fee settings).
//!
//! Models follow one convention: a `FromRow` struct per table with inherent
//! async methods taking `&PgPool`. Multi-row writes that must be atomic own
//! their transaction internally.

pub mod error;
pub mod migrations;
pub mod models;

pub use error::DbError;
pub use migrations::run_migrations;
pub use models::attestation::{Attestation, AttestationStatus};
pub use models::audit_log::{AuditRecord, NewAuditRecord};
pub use models::documentation_event::{
    CreateDocumentationEvent, DocumentationEvent, NewAttestation, RecordOutcome,
};
pub use models::entity::{CreateEntity, Entity};
pub use models::network_fee_setting::NetworkFeeSetting;
pub use models::reward_ledger_entry::{LedgerStatus, NewLedgerCredit, RewardLedgerEntry};
pub use models::reward_policy::{CreateRewardPolicy, RewardPolicy};
pub use models::webhook_integration::{CreateWebhookIntegration, WebhookIntegration};

/// Check whether a sqlx error is a Postgres unique-constraint violation.
///
/// The duplicate-hash conflict on `documentation_events` is handled by the
/// `ON CONFLICT` insert path and never surfaces as an error; this helper is
/// for the remaining unique columns (entity account ids, integration names)
/// where a violation maps to an HTTP conflict rather than a 500.
#[must_use]
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.code().as_deref() == Some("23505"),
        _ => false,
    }
}
