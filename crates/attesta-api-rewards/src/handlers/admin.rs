//! Registration surface: integrations and entities.
//!
//! The pipeline consumes these as collaborators: it needs registered
//! senders to authenticate against and registered entities to credit.

use attesta_core::IntegrationId;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::crypto::{encrypt_secret, generate_secret};
use crate::error::RewardsApiError;
use crate::models::{
    EntityResponse, IntegrationCreatedResponse, IntegrationResponse, RegisterEntityRequest,
    RegisterIntegrationRequest,
};
use crate::router::RewardsState;
use crate::validation::{parse_account, validate_metadata};
use attesta_db::{
    is_unique_violation, CreateEntity, CreateWebhookIntegration, Entity, WebhookIntegration,
};

/// Registers a webhook sender and returns its shared secret once.
#[utoipa::path(
    post,
    path = "/integrations",
    request_body = RegisterIntegrationRequest,
    responses(
        (status = 201, description = "Integration registered", body = IntegrationCreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Name already registered"),
    ),
    tag = "Integrations"
)]
pub async fn create_integration_handler(
    State(state): State<RewardsState>,
    Json(request): Json<RegisterIntegrationRequest>,
) -> Result<(StatusCode, Json<IntegrationCreatedResponse>), RewardsApiError> {
    let name = request.name.trim();
    if name.is_empty() || name.len() > 120 {
        return Err(RewardsApiError::Validation(
            "integration name must be 1-120 characters".to_string(),
        ));
    }

    let secret = generate_secret();
    let secret_encrypted = encrypt_secret(&secret, state.encryption_key())?;

    let integration = WebhookIntegration::create(
        state.pool(),
        CreateWebhookIntegration {
            name: name.to_string(),
            secret_encrypted,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            RewardsApiError::Conflict(format!("integration name '{name}'"))
        } else {
            e.into()
        }
    })?;

    tracing::info!(integration_id = %integration.id, name = %integration.name, "Integration registered");

    Ok((
        StatusCode::CREATED,
        Json(IntegrationCreatedResponse {
            id: IntegrationId::from_uuid(integration.id),
            name: integration.name,
            secret,
        }),
    ))
}

/// Lists registered integrations (secrets omitted).
#[utoipa::path(
    get,
    path = "/integrations",
    responses(
        (status = 200, description = "Registered integrations", body = [IntegrationResponse]),
    ),
    tag = "Integrations"
)]
pub async fn list_integrations_handler(
    State(state): State<RewardsState>,
) -> Result<Json<Vec<IntegrationResponse>>, RewardsApiError> {
    let integrations = WebhookIntegration::list(state.pool()).await?;
    Ok(Json(integrations.into_iter().map(Into::into).collect()))
}

/// Registers an entity.
#[utoipa::path(
    post,
    path = "/entities",
    request_body = RegisterEntityRequest,
    responses(
        (status = 201, description = "Entity registered", body = EntityResponse),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Parent organization not registered"),
        (status = 409, description = "Account already registered"),
    ),
    tag = "Entities"
)]
pub async fn register_entity_handler(
    State(state): State<RewardsState>,
    Json(request): Json<RegisterEntityRequest>,
) -> Result<(StatusCode, Json<EntityResponse>), RewardsApiError> {
    let account_id = parse_account(&request.account_id)?;
    let metadata = validate_metadata(request.metadata)?;

    let parent_org_id = match request.parent_org_account_id.as_deref() {
        Some(raw) => {
            let parent_account = parse_account(raw)?;
            let parent = Entity::find_by_account_id(state.pool(), &parent_account)
                .await?
                .ok_or(RewardsApiError::EntityNotFound)?;
            Some(parent.id)
        }
        None => None,
    };

    let entity = Entity::create(
        state.pool(),
        CreateEntity {
            account_id: account_id.clone(),
            display_name: request.display_name,
            kind: request.kind,
            parent_org_id,
            metadata,
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            RewardsApiError::Conflict(format!("account '{account_id}'"))
        } else {
            e.into()
        }
    })?;

    tracing::info!(
        entity_id = %entity.id,
        account = %entity.account_id,
        kind = %entity.kind,
        "Entity registered"
    );

    Ok((StatusCode::CREATED, Json(entity.into())))
}

/// Looks up an entity by account identifier.
#[utoipa::path(
    get,
    path = "/entities/{account_id}",
    params(
        ("account_id" = String, Path, description = "Account identifier"),
    ),
    responses(
        (status = 200, description = "Entity", body = EntityResponse),
        (status = 404, description = "Account not registered"),
    ),
    tag = "Entities"
)]
pub async fn get_entity_handler(
    State(state): State<RewardsState>,
    Path(account_id): Path<String>,
) -> Result<Json<EntityResponse>, RewardsApiError> {
    let account = parse_account(&account_id)?;
    let entity = Entity::find_by_account_id(state.pool(), &account)
        .await?
        .ok_or(RewardsApiError::EntityNotFound)?;

    Ok(Json(entity.into()))
}
