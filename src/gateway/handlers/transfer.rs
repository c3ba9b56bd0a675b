//! Transfer handlers

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use utoipa::IntoParams;

use super::super::state::AppState;
use super::super::types::{ApiError, ApiResponse, ApiResult, ok};
use crate::pagination::{Page, PageRequest};
use crate::transfer::{Transfer, TransferRequest};

/// Response header carrying the new transfer's token
pub const IDEMPOTENCY_KEY: HeaderName = HeaderName::from_static("idempotency-key");

/// Transfer listing query. Values are kept as strings so that bad page input
/// is clamped instead of rejected.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListTransfersQuery {
    /// Account on either side of the transfer (alias: userId)
    #[serde(alias = "userId", alias = "accountId")]
    pub account_id: Option<String>,
    /// Page number, 1-based (default 1)
    pub page: Option<String>,
    /// Page size, 1..=200 (default 20, alias: pageSize)
    #[serde(alias = "pageSize")]
    pub page_size: Option<String>,
}

/// Submit a transfer
///
/// POST /api/v1/transfers
#[utoipa::path(
    post,
    path = "/api/v1/transfers",
    request_body = TransferRequest,
    responses(
        (status = 201, description = "Transfer completed; token also in the Idempotency-Key header", body = Transfer, content_type = "application/json"),
        (status = 400, description = "Invalid amount, self transfer, repeated recipient or malformed body"),
        (status = 404, description = "Source or destination account not found"),
        (status = 422, description = "Insufficient balance"),
        (status = 500, description = "Storage failure")
    ),
    tag = "Transfer"
)]
pub async fn create_transfer(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(req) = payload?;

    // Run the unit of work on its own task so a dropped connection can't
    // cancel it halfway.
    let engine = state.engine.clone();
    let transfer = tokio::spawn(async move { engine.submit(req).await })
        .await
        .map_err(|e| {
            tracing::error!("Transfer task failed: {}", e);
            ApiError::internal("Transfer task failed")
        })??;

    let token = HeaderValue::from_str(&transfer.idempotency_token.to_string())
        .map_err(|_| ApiError::internal("Invalid token header"))?;
    let mut response = (StatusCode::CREATED, Json(ApiResponse::success(transfer))).into_response();
    response.headers_mut().insert(IDEMPOTENCY_KEY, token);
    Ok(response)
}

/// Get a transfer by its idempotency token
///
/// GET /api/v1/transfers/{token}
#[utoipa::path(
    get,
    path = "/api/v1/transfers/{token}",
    params(
        ("token" = String, Path, description = "Idempotency token returned at submission")
    ),
    responses(
        (status = 200, description = "Transfer", body = Transfer, content_type = "application/json"),
        (status = 404, description = "Transfer not found")
    ),
    tag = "Transfer"
)]
pub async fn get_transfer(
    State(state): State<Arc<AppState>>,
    token: Result<Path<String>, PathRejection>,
) -> ApiResult<Transfer> {
    let Path(token) = token?;
    ok(state.engine.retrieve_by_token(&token).await?)
}

/// List an account's transfers, newest first
///
/// GET /api/v1/transfers?account_id=1&page=1&page_size=20
#[utoipa::path(
    get,
    path = "/api/v1/transfers",
    params(ListTransfersQuery),
    responses(
        (status = 200, description = "Page of transfers with total count", content_type = "application/json"),
        (status = 400, description = "Missing or invalid account_id")
    ),
    tag = "Transfer"
)]
pub async fn list_transfers(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListTransfersQuery>, QueryRejection>,
) -> ApiResult<Page<Transfer>> {
    let Query(query) = query?;

    let account_id: i64 = query
        .account_id
        .as_deref()
        .and_then(|s| s.trim().parse().ok())
        .ok_or_else(|| ApiError::bad_request("Missing or invalid account_id parameter"))?;
    let page = PageRequest::from_query(query.page.as_deref(), query.page_size.as_deref());

    ok(state.engine.list_for_account(account_id, page).await?)
}
