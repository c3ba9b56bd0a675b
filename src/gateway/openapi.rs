//! OpenAPI documentation
//!
//! - OpenAPI JSON: `http://localhost:3000/api-docs/openapi.json`

use axum::Json;
use utoipa::OpenApi;

use crate::account::{Account, CreateAccountRequest, PointsKind, PointsRequest, UpdateAccountRequest};
use crate::gateway::handlers::HealthResponse;
use crate::ledger::{EventType, LedgerAudit, LedgerEntry};
use crate::transfer::{AccountSide, Transfer, TransferRequest, TransferStatus};

/// Main API Documentation struct
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Points Ledger API",
        version = "0.1.0",
        description = "Point transfers between accounts with an append-only double-entry ledger.",
        license(
            name = "MIT"
        )
    ),
    servers(
        (url = "http://localhost:3000", description = "Development"),
    ),
    paths(
        crate::gateway::handlers::health::health_check,
        crate::gateway::handlers::account::list_accounts,
        crate::gateway::handlers::account::create_account,
        crate::gateway::handlers::account::get_account,
        crate::gateway::handlers::account::update_account,
        crate::gateway::handlers::account::delete_account,
        crate::gateway::handlers::account::post_points,
        crate::gateway::handlers::account::get_ledger,
        crate::gateway::handlers::account::audit_ledger,
        crate::gateway::handlers::transfer::create_transfer,
        crate::gateway::handlers::transfer::get_transfer,
        crate::gateway::handlers::transfer::list_transfers,
    ),
    components(
        schemas(
            HealthResponse,
            Account,
            CreateAccountRequest,
            UpdateAccountRequest,
            PointsKind,
            PointsRequest,
            EventType,
            LedgerEntry,
            LedgerAudit,
            AccountSide,
            TransferStatus,
            TransferRequest,
            Transfer,
        )
    ),
    tags(
        (name = "System", description = "Health check"),
        (name = "Account", description = "Account profiles"),
        (name = "Ledger", description = "Point events and ledger history"),
        (name = "Transfer", description = "Point transfers between accounts"),
    )
)]
pub struct ApiDoc;

/// GET /api-docs/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
