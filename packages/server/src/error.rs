use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::gateway::GatewayError;
use serde::Serialize;

use crate::store::StoreError;
use crate::workflow::UploadedFile;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `INVALID_CREDENTIALS`, `PERMISSION_DENIED`, `NOT_FOUND`,
    /// `UPSTREAM_UNAVAILABLE`, `PARTIALLY_COMMITTED`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Missing required field: startDate")]
    pub message: String,
    /// Files already in durable storage when a later step failed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub uploaded: Vec<UploadedFile>,
}

impl ErrorBody {
    fn new(code: &'static str, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            uploaded: Vec::new(),
        }
    }
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    TokenMissing,
    TokenInvalid,
    InvalidCredentials,
    PermissionDenied,
    NotFound(String),
    /// A gateway failed before anything was saved.
    UpstreamUnavailable(String),
    /// Files reached durable storage but the record write failed.
    PartiallyCommitted {
        uploaded: Vec<UploadedFile>,
        detail: String,
    },
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody::new("VALIDATION_ERROR", msg),
            ),
            AppError::TokenMissing => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("TOKEN_MISSING", "Authentication required"),
            ),
            // A token was presented but could not be accepted.
            AppError::TokenInvalid => (
                StatusCode::FORBIDDEN,
                ErrorBody::new("TOKEN_INVALID", "Invalid or expired token"),
            ),
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorBody::new("INVALID_CREDENTIALS", "Invalid email or password"),
            ),
            AppError::PermissionDenied => (
                StatusCode::FORBIDDEN,
                ErrorBody::new("PERMISSION_DENIED", "Insufficient permissions"),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, ErrorBody::new("NOT_FOUND", msg)),
            AppError::UpstreamUnavailable(detail) => {
                tracing::error!("Upstream unavailable: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new(
                        "UPSTREAM_UNAVAILABLE",
                        "A storage service is unavailable; nothing was saved",
                    ),
                )
            }
            AppError::PartiallyCommitted { uploaded, detail } => {
                tracing::error!(
                    uploaded = uploaded.len(),
                    "Record write failed after upload: {}",
                    detail
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "PARTIALLY_COMMITTED",
                        message: "Files were uploaded but the record could not be saved".into(),
                        uploaded,
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody::new("INTERNAL_ERROR", "An unexpected error occurred"),
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => AppError::NotFound(format!("{what} not found")),
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<GatewayError> for AppError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::NotFound(detail) => {
                tracing::warn!("Gateway lookup missed: {detail}");
                AppError::NotFound(detail)
            }
            other => AppError::UpstreamUnavailable(other.to_string()),
        }
    }
}
