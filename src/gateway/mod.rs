pub mod handlers;
pub mod openapi;
pub mod state;
pub mod types;

use axum::{
    Router,
    routing::{get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::config::GatewayConfig;
use state::AppState;

/// Build the complete router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/api/v1/health", get(handlers::health_check))
        // Accounts
        .route(
            "/api/v1/accounts",
            get(handlers::list_accounts).post(handlers::create_account),
        )
        .route(
            "/api/v1/accounts/{id}",
            get(handlers::get_account)
                .put(handlers::update_account)
                .delete(handlers::delete_account),
        )
        // Point events and ledger
        .route("/api/v1/accounts/{id}/points", post(handlers::post_points))
        .route("/api/v1/accounts/{id}/ledger", get(handlers::get_ledger))
        .route(
            "/api/v1/accounts/{id}/ledger/audit",
            get(handlers::audit_ledger),
        )
        // Transfers
        .route(
            "/api/v1/transfers",
            get(handlers::list_transfers).post(handlers::create_transfer),
        )
        .route("/api/v1/transfers/{token}", get(handlers::get_transfer))
        .with_state(state)
        // OpenAPI document (stateless, added after with_state)
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Start HTTP Gateway server
///
/// Stops accepting connections once `shutdown` resolves and returns after
/// in-flight requests have drained.
pub async fn run_server(
    config: &GatewayConfig,
    state: Arc<AppState>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr).await.map_err(|e| {
        anyhow::anyhow!(
            "Failed to bind to {}: {} (port {} may already be in use)",
            addr,
            e,
            config.port
        )
    })?;

    tracing::info!("Gateway listening on http://{}", addr);
    tracing::info!("API docs: http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Gateway stopped");
    Ok(())
}
