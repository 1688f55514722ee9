//! Settlement backend strategy.
//!
//! The ledger records a settlement reference on confirmed entries. Which
//! system produces that reference is a deployment decision made once at
//! startup, not an inline conditional in the distribution path. The mock
//! backend fabricates deterministic simulated references; a live backend
//! would hand out identifiers from an external settlement system.

use uuid::Uuid;

/// Source of settlement references for confirmed ledger entries.
pub trait SettlementBackend: Send + Sync {
    /// Backend name, for logs.
    fn name(&self) -> &'static str;

    /// The settlement reference to record for a distribution, or `None`
    /// when the backend does not issue references.
    fn settlement_reference(&self, attestation_id: Uuid) -> Option<String>;
}

/// Simulated settlement: deterministic reference derived from the
/// attestation id.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockSettlement;

impl SettlementBackend for MockSettlement {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn settlement_reference(&self, attestation_id: Uuid) -> Option<String> {
        Some(format!("sim-{attestation_id}"))
    }
}
