//! Event and entity kind enumerations.
//!
//! [`EventKind`] is the closed set of documentation actions the pipeline
//! accepts. Webhook payloads name kinds by their wire form (`note.signed`);
//! anything outside the enumeration is rejected at validation time, never
//! silently dropped.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use thiserror::Error;

/// Error returned when a wire event kind is not part of the enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind: {0}")]
pub struct UnknownEventKind(pub String);

/// A clinical documentation action that can earn rewards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A clinical note was signed by its author.
    NoteSigned,
    /// An encounter was documented and closed.
    EncounterClosed,
    /// A prescription was signed.
    PrescriptionSigned,
    /// A laboratory result was reviewed and acknowledged.
    LabReviewed,
    /// A care plan was updated.
    CarePlanUpdated,
}

impl EventKind {
    /// All kinds, in a stable order.
    pub const ALL: [EventKind; 5] = [
        EventKind::NoteSigned,
        EventKind::EncounterClosed,
        EventKind::PrescriptionSigned,
        EventKind::LabReviewed,
        EventKind::CarePlanUpdated,
    ];

    /// Storage representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoteSigned => "note_signed",
            Self::EncounterClosed => "encounter_closed",
            Self::PrescriptionSigned => "prescription_signed",
            Self::LabReviewed => "lab_reviewed",
            Self::CarePlanUpdated => "care_plan_updated",
        }
    }

    /// The dotted form external senders use in webhook payloads.
    #[must_use]
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::NoteSigned => "note.signed",
            Self::EncounterClosed => "encounter.closed",
            Self::PrescriptionSigned => "prescription.signed",
            Self::LabReviewed => "lab.reviewed",
            Self::CarePlanUpdated => "care_plan.updated",
        }
    }

    /// Parse the wire form. Unknown kinds are an error, not a fallback.
    pub fn from_wire(s: &str) -> Result<Self, UnknownEventKind> {
        match s {
            "note.signed" => Ok(Self::NoteSigned),
            "encounter.closed" => Ok(Self::EncounterClosed),
            "prescription.signed" => Ok(Self::PrescriptionSigned),
            "lab.reviewed" => Ok(Self::LabReviewed),
            "care_plan.updated" => Ok(Self::CarePlanUpdated),
            other => Err(UnknownEventKind(other.to_string())),
        }
    }

    /// Parse the storage form.
    #[must_use]
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "note_signed" => Some(Self::NoteSigned),
            "encounter_closed" => Some(Self::EncounterClosed),
            "prescription_signed" => Some(Self::PrescriptionSigned),
            "lab_reviewed" => Some(Self::LabReviewed),
            "care_plan_updated" => Some(Self::CarePlanUpdated),
            _ => None,
        }
    }
}

impl Display for EventKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The kind of a registered entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// An individual care provider.
    Provider,
    /// A patient.
    Patient,
    /// A sponsoring organization.
    Organization,
    /// An administrative or treasury account.
    Treasury,
}

impl EntityKind {
    /// Storage representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Provider => "provider",
            Self::Patient => "patient",
            Self::Organization => "organization",
            Self::Treasury => "treasury",
        }
    }

    /// Parse the storage form.
    #[must_use]
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "provider" => Some(Self::Provider),
            "patient" => Some(Self::Patient),
            "organization" => Some(Self::Organization),
            "treasury" => Some(Self::Treasury),
            _ => None,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The role a ledger entry's recipient played in a distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientKind {
    /// The acting provider's share of the remaining reward.
    Actor,
    /// The sponsoring organization's share of the remaining reward.
    Organization,
    /// The beneficiary's share of the remaining reward.
    Beneficiary,
    /// The organization bonus carved out of the network fee.
    OrgBonus,
    /// The treasury's portion of the network fee.
    Treasury,
}

impl RecipientKind {
    /// Storage representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Actor => "actor",
            Self::Organization => "organization",
            Self::Beneficiary => "beneficiary",
            Self::OrgBonus => "org_bonus",
            Self::Treasury => "treasury",
        }
    }

    /// Parse the storage form.
    #[must_use]
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "actor" => Some(Self::Actor),
            "organization" => Some(Self::Organization),
            "beneficiary" => Some(Self::Beneficiary),
            "org_bonus" => Some(Self::OrgBonus),
            "treasury" => Some(Self::Treasury),
            _ => None,
        }
    }
}

impl Display for RecipientKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_roundtrip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_wire(kind.wire_name()), Ok(kind));
        }
    }

    #[test]
    fn test_db_roundtrip() {
        for kind in EventKind::ALL {
            assert_eq!(EventKind::from_db(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn test_unknown_wire_kind_is_rejected() {
        let err = EventKind::from_wire("invoice.paid").unwrap_err();
        assert_eq!(err.0, "invoice.paid");
    }

    #[test]
    fn test_wire_and_db_forms_differ() {
        // Wire form is dotted, storage form is snake_case.
        assert_eq!(EventKind::NoteSigned.wire_name(), "note.signed");
        assert_eq!(EventKind::NoteSigned.as_str(), "note_signed");
        assert_eq!(EventKind::from_db("note.signed"), None);
    }

    #[test]
    fn test_entity_kind_roundtrip() {
        for kind in [
            EntityKind::Provider,
            EntityKind::Patient,
            EntityKind::Organization,
            EntityKind::Treasury,
        ] {
            assert_eq!(EntityKind::from_db(kind.as_str()), Some(kind));
        }
        assert_eq!(EntityKind::from_db("robot"), None);
    }

    #[test]
    fn test_recipient_kind_roundtrip() {
        for kind in [
            RecipientKind::Actor,
            RecipientKind::Organization,
            RecipientKind::Beneficiary,
            RecipientKind::OrgBonus,
            RecipientKind::Treasury,
        ] {
            assert_eq!(RecipientKind::from_db(kind.as_str()), Some(kind));
        }
    }
}
