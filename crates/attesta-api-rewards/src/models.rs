//! Request/response DTOs for the rewards API.
//!
//! Wire casing is camelCase; internal types use the core enums. Metadata is
//! accepted as a JSON object and validated at the boundary (see
//! `validation`) rather than flowing as an untyped bag into reward
//! computation.

use attesta_core::{
    AttestationId, EntityId, EntityKind, EventId, IntegrationId, LedgerEntryId,
};
use attesta_db::{Attestation, Entity, RewardLedgerEntry, WebhookIntegration};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Ingestion
// ---------------------------------------------------------------------------

/// Inbound webhook payload describing one documentation event.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IngestEventRequest {
    /// Wire event kind, e.g. `note.signed`.
    pub event_kind: String,
    /// When the action occurred (ISO-8601).
    pub timestamp: DateTime<Utc>,
    /// Account identifier of the acting entity.
    pub actor_account_id: String,
    /// Opaque subject reference (encounter, note, order id).
    #[serde(default)]
    pub subject_id: Option<String>,
    /// Account identifier of the sponsoring organization, if any.
    #[serde(default)]
    pub organization_context: Option<String>,
    /// Free-form metadata object.
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Response to a webhook delivery.
///
/// Duplicates return the same shape with `message = "already processed"`
/// and the original event id; still a 2xx, never an error.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IngestEventResponse {
    pub success: bool,
    #[schema(value_type = Uuid)]
    pub event_id: EventId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Actor reward credited; present only when an active policy applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_amount: Option<Decimal>,
    /// Network fee carved out of the base reward.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_fee: Option<Decimal>,
}

impl IngestEventResponse {
    /// Response for a freshly recorded event.
    #[must_use]
    pub fn recorded(
        event_id: EventId,
        reward_amount: Option<Decimal>,
        network_fee: Option<Decimal>,
    ) -> Self {
        Self {
            success: true,
            event_id,
            message: None,
            reward_amount,
            network_fee,
        }
    }

    /// Response for a duplicate delivery.
    #[must_use]
    pub fn duplicate(event_id: EventId) -> Self {
        Self {
            success: true,
            event_id,
            message: Some("already processed".to_string()),
            reward_amount: None,
            network_fee: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Ledger surface
// ---------------------------------------------------------------------------

/// One ledger entry as exposed to reporting consumers.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntryResponse {
    #[schema(value_type = Uuid)]
    pub id: LedgerEntryId,
    #[schema(value_type = Uuid)]
    pub attestation_id: AttestationId,
    #[schema(value_type = Uuid)]
    pub recipient_entity_id: EntityId,
    pub recipient_kind: String,
    pub amount: Decimal,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub settlement_ref: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<RewardLedgerEntry> for LedgerEntryResponse {
    fn from(entry: RewardLedgerEntry) -> Self {
        Self {
            id: LedgerEntryId::from_uuid(entry.id),
            attestation_id: AttestationId::from_uuid(entry.attestation_id),
            recipient_entity_id: EntityId::from_uuid(entry.recipient_entity_id),
            recipient_kind: entry.recipient_kind,
            amount: entry.amount,
            status: entry.status,
            settlement_ref: entry.settlement_ref,
            confirmed_at: entry.confirmed_at,
            created_at: entry.created_at,
        }
    }
}

/// Query parameters for the ledger listing endpoint.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub limit: Option<i64>,
    #[serde(default)]
    pub offset: Option<i64>,
}

/// Confirmed balance for one recipient.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResponse {
    pub account_id: String,
    #[schema(value_type = Uuid)]
    pub entity_id: EntityId,
    pub balance: Decimal,
}

/// Attestation status plus its ledger entries, for reconciliation tooling.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttestationResponse {
    #[schema(value_type = Uuid)]
    pub id: AttestationId,
    #[schema(value_type = Uuid)]
    pub event_id: EventId,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub entries: Vec<LedgerEntryResponse>,
}

impl AttestationResponse {
    #[must_use]
    pub fn from_parts(attestation: Attestation, entries: Vec<RewardLedgerEntry>) -> Self {
        Self {
            id: AttestationId::from_uuid(attestation.id),
            event_id: EventId::from_uuid(attestation.event_id),
            status: attestation.status,
            created_at: attestation.created_at,
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// Entity registration
// ---------------------------------------------------------------------------

/// Register a provider, patient, organization or treasury account.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterEntityRequest {
    pub account_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[schema(value_type = String, example = "provider")]
    pub kind: EntityKind,
    /// Account id of the parent organization, if any.
    #[serde(default)]
    pub parent_org_account_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// A registered entity.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EntityResponse {
    #[schema(value_type = Uuid)]
    pub id: EntityId,
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Uuid>)]
    pub parent_org_id: Option<EntityId>,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Entity> for EntityResponse {
    fn from(entity: Entity) -> Self {
        Self {
            id: EntityId::from_uuid(entity.id),
            account_id: entity.account_id,
            display_name: entity.display_name,
            kind: entity.kind,
            parent_org_id: entity.parent_org_id.map(EntityId::from_uuid),
            is_verified: entity.is_verified,
            created_at: entity.created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Integration registration
// ---------------------------------------------------------------------------

/// Register a webhook sender.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterIntegrationRequest {
    pub name: String,
}

/// Returned once at registration; the only time the secret is visible.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationCreatedResponse {
    #[schema(value_type = Uuid)]
    pub id: IntegrationId,
    pub name: String,
    /// Plaintext shared secret. Store it now; it is not retrievable later.
    pub secret: String,
}

/// A registered integration, secret omitted.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct IntegrationResponse {
    #[schema(value_type = Uuid)]
    pub id: IntegrationId,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<WebhookIntegration> for IntegrationResponse {
    fn from(integration: WebhookIntegration) -> Self {
        Self {
            id: IntegrationId::from_uuid(integration.id),
            name: integration.name,
            is_active: integration.is_active,
            created_at: integration.created_at,
        }
    }
}
