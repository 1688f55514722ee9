//! `OpenAPI` documentation and Swagger UI configuration.

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use attesta_api_rewards::handlers::{admin, ingest, ledger};
use attesta_api_rewards::models::{
    AttestationResponse, BalanceResponse, EntityResponse, IngestEventRequest,
    IngestEventResponse, IntegrationCreatedResponse, IntegrationResponse, LedgerEntryResponse,
    RegisterEntityRequest, RegisterIntegrationRequest,
};
use attesta_api_rewards::ErrorResponse;

use crate::health::HealthResponse;

/// `OpenAPI` documentation for the rewards API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "attesta rewards API",
        version = "0.4.0",
        description = "Verified clinical documentation events, attestations and reward ledger"
    ),
    paths(
        crate::health::health_handler,
        ingest::ingest_event_handler,
        ledger::list_ledger_handler,
        ledger::balance_handler,
        ledger::attestation_handler,
        admin::create_integration_handler,
        admin::list_integrations_handler,
        admin::register_entity_handler,
        admin::get_entity_handler,
    ),
    components(schemas(
        IngestEventRequest,
        IngestEventResponse,
        LedgerEntryResponse,
        BalanceResponse,
        AttestationResponse,
        RegisterEntityRequest,
        EntityResponse,
        RegisterIntegrationRequest,
        IntegrationCreatedResponse,
        IntegrationResponse,
        ErrorResponse,
        HealthResponse,
    )),
    tags(
        (name = "Health", description = "Service health and status"),
        (name = "Events", description = "Signed webhook ingestion"),
        (name = "Ledger", description = "Reward ledger queries"),
        (name = "Integrations", description = "Webhook sender registration"),
        (name = "Entities", description = "Entity registration and lookup"),
    )
)]
pub struct ApiDoc;

/// Swagger UI routes serving the generated spec.
pub fn swagger_routes() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
