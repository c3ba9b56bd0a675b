//! Handler error type
//!
//! Every handler returns [`ApiResult`]. Domain errors convert into
//! [`ApiError`] carrying the HTTP status, the numeric code and the
//! human-readable reason.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::response::{ApiResponse, error_codes};
use crate::account::AccountError;
use crate::transfer::TransferError;

pub type ApiResult<T> = Result<(StatusCode, Json<ApiResponse<T>>), ApiError>;

/// 200 with the success envelope
pub fn ok<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::OK, Json(ApiResponse::success(data))))
}

/// 201 with the success envelope
pub fn created<T>(data: T) -> ApiResult<T> {
    Ok((StatusCode::CREATED, Json(ApiResponse::success(data))))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: i32,
    pub msg: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: i32, msg: impl Into<String>) -> Self {
        Self {
            status,
            code,
            msg: msg.into(),
        }
    }

    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, error_codes::INVALID_PARAMETER, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            error_codes::INTERNAL_ERROR,
            msg,
        )
    }

    pub fn service_unavailable(msg: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            error_codes::SERVICE_UNAVAILABLE,
            msg,
        )
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::error(self.code, self.msg))).into_response()
    }
}

fn status_from(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl From<TransferError> for ApiError {
    fn from(e: TransferError) -> Self {
        let code = match &e {
            TransferError::InvalidAmount => error_codes::INVALID_AMOUNT,
            TransferError::SelfTransferNotAllowed => error_codes::SELF_TRANSFER_NOT_ALLOWED,
            TransferError::AccountNotFound { .. } => error_codes::ACCOUNT_NOT_FOUND,
            TransferError::RepeatedRecipientNotAllowed => {
                error_codes::REPEATED_RECIPIENT_NOT_ALLOWED
            }
            TransferError::InsufficientBalance { .. } => error_codes::INSUFFICIENT_BALANCE,
            TransferError::BalanceOverflow => error_codes::BALANCE_OVERFLOW,
            TransferError::TransferNotFound(_) => error_codes::TRANSFER_NOT_FOUND,
            TransferError::InvalidStateTransition { .. } => error_codes::INTERNAL_ERROR,
            TransferError::DuplicateToken | TransferError::DatabaseError(_) => {
                error_codes::DATABASE_ERROR
            }
        };
        let status = status_from(e.http_status());
        // storage details stay in the log
        if status.is_server_error() {
            tracing::error!(code = e.code(), "Transfer storage failure: {}", e);
            return Self::new(status, code, "Internal storage error");
        }
        Self::new(status, code, e.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(e: AccountError) -> Self {
        let code = match &e {
            AccountError::Validation(_) => error_codes::INVALID_PARAMETER,
            AccountError::NotFound(_) => error_codes::ACCOUNT_NOT_FOUND,
            AccountError::HasHistory(_) => error_codes::ACCOUNT_HAS_HISTORY,
            AccountError::InvalidPoints(_) => error_codes::INVALID_AMOUNT,
            AccountError::InsufficientBalance { .. } => error_codes::INSUFFICIENT_BALANCE,
            AccountError::BalanceOverflow => error_codes::BALANCE_OVERFLOW,
            AccountError::Database(_) => error_codes::DATABASE_ERROR,
        };
        let status = status_from(e.http_status());
        if status.is_server_error() {
            tracing::error!(code = e.code(), "Account storage failure: {}", e);
            return Self::new(status, code, "Internal storage error");
        }
        Self::new(status, code, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
