//! Strongly Typed Identifiers
//!
//! Newtype wrappers around UUIDs for the entities flowing through the reward
//! pipeline. The newtype pattern prevents accidental misuse of different ID
//! types at compile time.
//!
//! # Example
//!
//! ```
//! use attesta_core::{EntityId, EventId};
//!
//! let entity = EntityId::new();
//! let event = EventId::new();
//!
//! fn requires_entity(id: EntityId) -> String {
//!     id.to_string()
//! }
//!
//! let result = requires_entity(entity);
//! // requires_entity(event); // This would not compile!
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Error type for ID parsing failures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse
    pub id_type: &'static str,
    /// The underlying UUID parse error message
    pub message: String,
}

impl Display for ParseIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Failed to parse {}: {}", self.id_type, self.message)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to define a strongly-typed ID type
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random ID using UUID v4.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns a reference to the underlying UUID.
            #[must_use]
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        message: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Strongly typed identifier for registered entities
    /// (providers, patients, organizations, treasury accounts).
    EntityId
);

define_id!(
    /// Strongly typed identifier for documentation events.
    ///
    /// Identifies a single attested real-world action. The event's
    /// idempotency key is its content hash, not this ID; the ID is
    /// assigned at first persistence.
    EventId
);

define_id!(
    /// Strongly typed identifier for attestations.
    AttestationId
);

define_id!(
    /// Strongly typed identifier for reward ledger entries.
    LedgerEntryId
);

define_id!(
    /// Strongly typed identifier for registered webhook integrations.
    IntegrationId
);
