//! API error types with HTTP response mapping.
//!
//! Every error body carries a human-readable `error` message plus a
//! stable machine-readable `code`, so clients can branch on the reason
//! without parsing prose.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::OrderError;
use journal::JournalError;
use ledger::LedgerError;
use saga::SagaError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Missing, malformed or invalid credentials.
    Unauthorized(&'static str),
    /// Bad request from the client.
    BadRequest(String),
    /// Resource not found.
    NotFound(String),
    /// Saga or store error, mapped by variant.
    Saga(SagaError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            ApiError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "unauthorized", msg.to_string())
            }
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg),
            ApiError::Saga(err) => saga_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
            }
        };

        let body = serde_json::json!({ "error": message, "code": code });
        (status, axum::Json(body)).into_response()
    }
}

fn saga_error_to_response(err: SagaError) -> (StatusCode, &'static str, String) {
    let message = err.to_string();
    let (status, code) = match &err {
        SagaError::ProductNotFound { .. } => (StatusCode::NOT_FOUND, "product_not_found"),
        SagaError::ProductInactive { .. } => (StatusCode::BAD_REQUEST, "product_inactive"),
        SagaError::StockNotProvisioned { .. } => {
            (StatusCode::BAD_REQUEST, "stock_not_provisioned")
        }
        SagaError::InsufficientStock { .. } => (StatusCode::BAD_REQUEST, "insufficient_stock"),
        SagaError::OrderNotFound(_) => (StatusCode::NOT_FOUND, "order_not_found"),
        SagaError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
        SagaError::OrderNotPurgeable { .. } => (StatusCode::BAD_REQUEST, "order_not_purgeable"),
        SagaError::StockInUse { .. } => (StatusCode::BAD_REQUEST, "stock_in_use"),
        SagaError::CancelViaStatusUpdate => (StatusCode::BAD_REQUEST, "use_cancel_endpoint"),
        // State conflicts surface as 400 to match the service's
        // long-standing client contract.
        SagaError::Order(OrderError::InvalidStateTransition { .. }) => {
            (StatusCode::BAD_REQUEST, "invalid_state_transition")
        }
        SagaError::Order(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
        SagaError::Ledger(LedgerError::NotFound { .. }) => {
            (StatusCode::NOT_FOUND, "stock_not_found")
        }
        SagaError::Ledger(LedgerError::AlreadyExists { .. }) => {
            (StatusCode::BAD_REQUEST, "stock_already_exists")
        }
        SagaError::Ledger(LedgerError::InsufficientStock { .. }) => {
            (StatusCode::BAD_REQUEST, "insufficient_stock")
        }
        SagaError::Ledger(LedgerError::InvalidQuantity { .. }) => {
            (StatusCode::BAD_REQUEST, "invalid_quantity")
        }
        SagaError::Journal(JournalError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, "order_not_found")
        }
        SagaError::Journal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        SagaError::DependencyTimeout { .. } => {
            (StatusCode::GATEWAY_TIMEOUT, "dependency_timeout")
        }
        SagaError::Dependency(_) => (StatusCode::SERVICE_UNAVAILABLE, "dependency_unavailable"),
    };
    if status.is_server_error() {
        tracing::error!(error = %message, "request failed");
    }
    (status, code, message)
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Saga(SagaError::Ledger(err))
    }
}
