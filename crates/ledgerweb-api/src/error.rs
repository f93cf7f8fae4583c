//! Error types for ledgerweb-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use ledgerweb_core::{ErrorCode, LedgerError};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Ledger(err) => match err.code() {
                ErrorCode::NotFound => StatusCode::NOT_FOUND,
                ErrorCode::InvalidState => StatusCode::CONFLICT,
                ErrorCode::LockedRecord => StatusCode::CONFLICT,
                ErrorCode::Permission => StatusCode::FORBIDDEN,
                ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
                ErrorCode::TransientStore => StatusCode::SERVICE_UNAVAILABLE,
                ErrorCode::Cancelled => StatusCode::REQUEST_TIMEOUT,
                ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn code(&self) -> String {
        match self {
            ApiError::BadRequest { .. } => "BAD_REQUEST".to_string(),
            ApiError::Ledger(err) => err.code().to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!(target: "ledgerweb::api", "{}", self);
        }
        let body = json!({
            "error": self.code(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

// ==================== Tests ====================
