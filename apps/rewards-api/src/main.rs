//! attesta rewards pipeline service
//!
//! Receives signed clinical documentation webhooks, records each event
//! exactly once, and distributes policy-driven reward credits through the
//! append-only ledger.

mod config;
mod health;
mod logging;
mod openapi;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing::info;

use attesta_api_rewards::{rewards_router, MockSettlement, RewardsState, SettlementBackend};
use config::Config;
use health::{health_handler, livez_handler, readyz_handler, HealthState};
use openapi::swagger_routes;

/// How often the redistribution sweep looks for stuck pending attestations.
const REDISTRIBUTE_INTERVAL_SECS: u64 = 60;

/// Request body ceiling for webhook deliveries (1 MB).
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Per-request processing bound. A timeout after the event is persisted is
/// acceptable; the redistribution sweep finishes the reward computation.
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[tokio::main]
async fn main() {
    // Load configuration (fail-fast on missing required values)
    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_logging(&config.rust_log);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        host = %config.host,
        port = config.port,
        env = %config.app_env,
        "Starting attesta rewards API"
    );

    // Create database connection pool
    let pool = match PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(&config.database_url)
        .await
    {
        Ok(pool) => {
            info!("Database connection established");
            pool
        }
        Err(e) => {
            eprintln!("Failed to connect to database: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = attesta_db::run_migrations(&pool).await {
        eprintln!("FATAL: Database migration failed: {e}");
        std::process::exit(1);
    }

    // Settlement backend chosen once at startup. Only the mock backend is
    // wired; a live settlement integration plugs in here.
    let settlement: Arc<dyn SettlementBackend> = Arc::new(MockSettlement);
    info!(backend = settlement.name(), "Settlement backend selected");

    let rewards_state = RewardsState::new(
        pool.clone(),
        config.secrets_key.clone(),
        settlement,
    );

    let health_state = HealthState::new(pool.clone());
    let shutting_down = health_state.shutting_down.clone();

    // Background sweep: retry distribution for attestations left pending
    // with zero ledger entries (timeout or crash after the event was
    // durably recorded, or configuration fixed after a misroute).
    {
        let distributor = rewards_state.distributor().clone();
        tokio::spawn(async move {
            let interval = Duration::from_secs(REDISTRIBUTE_INTERVAL_SECS);
            loop {
                tokio::time::sleep(interval).await;
                let redistributed = distributor.redistribute_stuck().await;
                if redistributed > 0 {
                    info!(count = redistributed, "Redistributed stuck attestations");
                }
            }
        });
    }

    // Build the router
    let app = Router::new()
        // Health probes (no auth required)
        .route("/health", get(health_handler))
        .route("/livez", get(livez_handler))
        .route("/readyz", get(readyz_handler))
        .with_state(health_state)
        // Swagger UI and OpenAPI spec
        .merge(swagger_routes())
        // The pipeline itself
        .merge(rewards_router(rewards_state))
        .layer(tower_http::limit::RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(tower_http::timeout::TimeoutLayer::new(Duration::from_secs(
            REQUEST_TIMEOUT_SECS,
        )))
        .layer(tower_http::trace::TraceLayer::new_for_http());

    // Bind and serve
    let addr: SocketAddr = match config.bind_addr().parse() {
        Ok(a) => a,
        Err(e) => {
            tracing::error!("Invalid bind address '{}': {e}", config.bind_addr());
            std::process::exit(1);
        }
    };

    info!(%addr, "Server listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!("Failed to bind to address {addr}: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutting_down))
        .await
    {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }

    info!("Server shutdown complete");
}

/// Graceful shutdown signal handler.
///
/// Sets the `shutting_down` flag before returning so the readiness probe
/// returns 503 to drain traffic before Axum stops accepting connections.
async fn shutdown_signal(shutting_down: Arc<AtomicBool>) {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => {}
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {e}");
                // Fall through - we still want to wait for terminate signal
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    shutting_down.store(true, Ordering::Release);
    info!("Readiness probe set to unhealthy — draining traffic");
}
