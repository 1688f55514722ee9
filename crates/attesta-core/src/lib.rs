//! attesta Core Library
//!
//! Shared types for the attesta reward pipeline.
//!
//! # Modules
//!
//! - [`ids`] - Strongly typed identifiers (EntityId, EventId, AttestationId, ...)
//! - [`account`] - Normalized account identifiers (AccountId)
//! - [`kind`] - Event and entity kind enumerations
//! - [`hash`] - Canonical content hashing for event idempotency
//!
//! # Example
//!
//! ```
//! use attesta_core::{AccountId, EntityId, EventKind};
//!
//! let entity_id = EntityId::new();
//! let account: AccountId = "  0xAB12ff  ".parse().unwrap();
//! assert_eq!(account.as_str(), "0xab12ff");
//!
//! let kind = EventKind::from_wire("note.signed").unwrap();
//! assert_eq!(kind, EventKind::NoteSigned);
//! ```

pub mod account;
pub mod hash;
pub mod ids;
pub mod kind;

// Re-export main types for convenient access
pub use account::{AccountId, ParseAccountIdError};
pub use hash::content_hash;
pub use ids::{AttestationId, EntityId, EventId, IntegrationId, LedgerEntryId};
pub use kind::{EntityKind, EventKind, RecipientKind, UnknownEventKind};
