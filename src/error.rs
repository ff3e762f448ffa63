use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    #[error("No wallet provider available")]
    ProviderAbsent,

    #[error("Wallet connection rejected: {0}")]
    UserRejected(String),

    #[error("Blockchain RPC error: {reason}")]
    Rpc { reason: String },

    #[error("Unexpected contract response: {0}")]
    Decode(String),

    #[error("Invalid numeric value: {0}")]
    Conversion(String),

    #[error("Asset discovery failed: {0}")]
    Discovery(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn rpc(reason: impl Into<String>) -> Self {
        AppError::Rpc {
            reason: reason.into(),
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

// Internal helper that maps each error to its HTTP status and stable code.
fn status_and_code(error: &AppError) -> (StatusCode, &'static str) {
    match error {
        AppError::ProviderAbsent => (StatusCode::SERVICE_UNAVAILABLE, "PROVIDER_ABSENT"),
        AppError::UserRejected(_) => (StatusCode::FORBIDDEN, "USER_REJECTED"),
        AppError::Rpc { .. } => (StatusCode::BAD_GATEWAY, "RPC_ERROR"),
        AppError::Decode(_) => (StatusCode::BAD_GATEWAY, "DECODE_ERROR"),
        AppError::Conversion(_) => (StatusCode::INTERNAL_SERVER_ERROR, "CONVERSION_ERROR"),
        AppError::Discovery(_) => (StatusCode::BAD_GATEWAY, "DISCOVERY_ERROR"),
        AppError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = status_and_code(&self);

        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: code.to_string(),
                message: self.to_string(),
                details: None,
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
