//! Account handlers (profiles, point events, ledger)

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::super::state::AppState;
use super::super::types::{ApiResult, created, ok};
use crate::account::{Account, CreateAccountRequest, PointsRequest, UpdateAccountRequest};
use crate::ledger::{LedgerAudit, LedgerEntry};
use crate::pagination::{Page, PageRequest};

/// Ledger listing query
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LedgerQuery {
    /// Page number, 1-based (default 1)
    pub page: Option<String>,
    /// Page size, 1..=200 (default 20, alias: pageSize)
    #[serde(alias = "pageSize")]
    pub page_size: Option<String>,
}

/// List accounts
///
/// GET /api/v1/accounts
#[utoipa::path(
    get,
    path = "/api/v1/accounts",
    responses(
        (status = 200, description = "All accounts, oldest first", body = [Account], content_type = "application/json")
    ),
    tag = "Account"
)]
pub async fn list_accounts(State(state): State<Arc<AppState>>) -> ApiResult<Vec<Account>> {
    ok(state.accounts.list().await?)
}

/// Create an account (balance starts at zero)
///
/// POST /api/v1/accounts
#[utoipa::path(
    post,
    path = "/api/v1/accounts",
    request_body = CreateAccountRequest,
    responses(
        (status = 201, description = "Account created", body = Account, content_type = "application/json"),
        (status = 400, description = "Missing or too long name, or malformed body")
    ),
    tag = "Account"
)]
pub async fn create_account(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> ApiResult<Account> {
    let Json(req) = payload?;
    created(state.accounts.create(req).await?)
}

/// Get an account
///
/// GET /api/v1/accounts/{id}
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account", body = Account, content_type = "application/json"),
        (status = 404, description = "Account not found")
    ),
    tag = "Account"
)]
pub async fn get_account(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Account> {
    let Path(id) = id?;
    ok(state.accounts.get(id).await?)
}

/// Update profile fields
///
/// PUT /api/v1/accounts/{id}
#[utoipa::path(
    put,
    path = "/api/v1/accounts/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    request_body = UpdateAccountRequest,
    responses(
        (status = 200, description = "Updated account", body = Account, content_type = "application/json"),
        (status = 400, description = "Name too long or malformed body"),
        (status = 404, description = "Account not found")
    ),
    tag = "Account"
)]
pub async fn update_account(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateAccountRequest>, JsonRejection>,
) -> ApiResult<Account> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    ok(state.accounts.update(id, patch).await?)
}

/// Delete an account without history
///
/// DELETE /api/v1/accounts/{id}
#[utoipa::path(
    delete,
    path = "/api/v1/accounts/{id}",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Account deleted"),
        (status = 404, description = "Account not found"),
        (status = 409, description = "Account has transfer or ledger history")
    ),
    tag = "Account"
)]
pub async fn delete_account(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(id) = id?;
    state.accounts.delete(id).await?;
    ok(())
}

/// Earn, redeem or adjust points
///
/// POST /api/v1/accounts/{id}/points
#[utoipa::path(
    post,
    path = "/api/v1/accounts/{id}/points",
    params(("id" = i64, Path, description = "Account ID")),
    request_body = PointsRequest,
    responses(
        (status = 201, description = "Ledger entry recorded", body = LedgerEntry, content_type = "application/json"),
        (status = 400, description = "Invalid amount or malformed body"),
        (status = 404, description = "Account not found"),
        (status = 422, description = "Insufficient balance")
    ),
    tag = "Ledger"
)]
pub async fn post_points(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    payload: Result<Json<PointsRequest>, JsonRejection>,
) -> ApiResult<LedgerEntry> {
    let Path(id) = id?;
    let Json(req) = payload?;
    created(state.accounts.post_points(id, req).await?)
}

/// Account ledger, newest first
///
/// GET /api/v1/accounts/{id}/ledger
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}/ledger",
    params(("id" = i64, Path, description = "Account ID"), LedgerQuery),
    responses(
        (status = 200, description = "Page of ledger entries with total count", content_type = "application/json"),
        (status = 404, description = "Account not found")
    ),
    tag = "Ledger"
)]
pub async fn get_ledger(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
    query: Result<Query<LedgerQuery>, QueryRejection>,
) -> ApiResult<Page<LedgerEntry>> {
    let Path(id) = id?;
    let Query(query) = query?;
    let page = PageRequest::from_query(query.page.as_deref(), query.page_size.as_deref());
    ok(state.accounts.ledger(id, page).await?)
}

/// Replay the ledger against the stored balance
///
/// GET /api/v1/accounts/{id}/ledger/audit
#[utoipa::path(
    get,
    path = "/api/v1/accounts/{id}/ledger/audit",
    params(("id" = i64, Path, description = "Account ID")),
    responses(
        (status = 200, description = "Audit report", body = LedgerAudit, content_type = "application/json"),
        (status = 404, description = "Account not found")
    ),
    tag = "Ledger"
)]
pub async fn audit_ledger(
    State(state): State<Arc<AppState>>,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<LedgerAudit> {
    let Path(id) = id?;
    ok(state.accounts.audit(id).await?)
}
