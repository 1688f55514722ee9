//! Ledger query surface.
//!
//! Read-only views over the reward ledger for balance dashboards and
//! reconciliation tooling.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;

use crate::error::RewardsApiError;
use crate::models::{AttestationResponse, BalanceResponse, LedgerEntryResponse, LedgerQuery};
use crate::router::RewardsState;
use crate::validation::parse_account;
use attesta_db::{Attestation, Entity, LedgerStatus, RewardLedgerEntry};

/// Default page size for ledger listings.
const DEFAULT_LIMIT: i64 = 50;

/// Hard page-size ceiling.
const MAX_LIMIT: i64 = 500;

/// Ledger entries for a recipient, newest first.
#[utoipa::path(
    get,
    path = "/rewards/ledger/{account_id}",
    params(
        ("account_id" = String, Path, description = "Recipient account identifier"),
    ),
    responses(
        (status = 200, description = "Ledger entries", body = [LedgerEntryResponse]),
        (status = 404, description = "Account not registered"),
    ),
    tag = "Ledger"
)]
pub async fn list_ledger_handler(
    State(state): State<RewardsState>,
    Path(account_id): Path<String>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<Vec<LedgerEntryResponse>>, RewardsApiError> {
    let entity = resolve_entity(&state, &account_id).await?;

    let status = match query.status.as_deref() {
        None => None,
        Some(raw) => Some(LedgerStatus::from_db(raw).ok_or_else(|| {
            RewardsApiError::Validation(format!("unknown ledger status: {raw}"))
        })?),
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let offset = query.offset.unwrap_or(0).max(0);

    let entries =
        RewardLedgerEntry::list_for_recipient(state.pool(), entity.id, status, limit, offset)
            .await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}

/// Confirmed balance for a recipient.
#[utoipa::path(
    get,
    path = "/rewards/balance/{account_id}",
    params(
        ("account_id" = String, Path, description = "Recipient account identifier"),
    ),
    responses(
        (status = 200, description = "Confirmed balance", body = BalanceResponse),
        (status = 404, description = "Account not registered"),
    ),
    tag = "Ledger"
)]
pub async fn balance_handler(
    State(state): State<RewardsState>,
    Path(account_id): Path<String>,
) -> Result<Json<BalanceResponse>, RewardsApiError> {
    let entity = resolve_entity(&state, &account_id).await?;
    let balance = RewardLedgerEntry::confirmed_balance(state.pool(), entity.id).await?;

    Ok(Json(BalanceResponse {
        account_id: entity.account_id,
        entity_id: entity.id.into(),
        balance,
    }))
}

/// Attestation status and ledger entries for one event.
#[utoipa::path(
    get,
    path = "/rewards/attestations/{event_id}",
    params(
        ("event_id" = Uuid, Path, description = "Documentation event id"),
    ),
    responses(
        (status = 200, description = "Attestation with entries", body = AttestationResponse),
        (status = 404, description = "Event has no attestation"),
    ),
    tag = "Ledger"
)]
pub async fn attestation_handler(
    State(state): State<RewardsState>,
    Path(event_id): Path<Uuid>,
) -> Result<Json<AttestationResponse>, RewardsApiError> {
    let attestation = Attestation::find_by_event_id(state.pool(), event_id)
        .await?
        .ok_or(RewardsApiError::EventNotFound)?;

    let entries =
        RewardLedgerEntry::list_for_attestation(state.pool(), attestation.id).await?;

    Ok(Json(AttestationResponse::from_parts(attestation, entries)))
}

async fn resolve_entity(
    state: &RewardsState,
    raw_account: &str,
) -> Result<Entity, RewardsApiError> {
    let account = parse_account(raw_account)?;
    Entity::find_by_account_id(state.pool(), &account)
        .await?
        .ok_or(RewardsApiError::EntityNotFound)
}
