//! Google Drive and Google Sheets adapters over plain HTTP.
//!
//! Both authenticate as one service account. Every call is a single
//! request with no retry; failures are normalized into `GatewayError`.

pub mod auth;
pub mod drive;
pub mod sheets;

use std::path::PathBuf;

use common::gateway::GatewayError;
use reqwest::StatusCode;

pub use auth::ServiceAccountAuth;
pub use drive::DriveFileStore;
pub use sheets::SheetsMirror;

/// Scopes requested for the service-account token.
pub const SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/drive",
    "https://www.googleapis.com/auth/spreadsheets",
];

#[derive(Debug, thiserror::Error)]
pub enum GoogleApiError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Credentials not found at {0}")]
    CredentialsNotFound(PathBuf),
    #[error("Invalid credentials format: {0}")]
    InvalidCredentials(String),
    #[error("Token request failed: {0}")]
    TokenFailed(String),
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl From<GoogleApiError> for GatewayError {
    fn from(err: GoogleApiError) -> Self {
        match err {
            GoogleApiError::Api { status, message } => match StatusCode::from_u16(status) {
                Ok(StatusCode::NOT_FOUND) => GatewayError::NotFound(message),
                Ok(s) if s.is_client_error()
                    && !matches!(
                        s,
                        StatusCode::UNAUTHORIZED
                            | StatusCode::FORBIDDEN
                            | StatusCode::REQUEST_TIMEOUT
                            | StatusCode::TOO_MANY_REQUESTS
                    ) =>
                {
                    GatewayError::Rejected(format!("{status}: {message}"))
                }
                _ => GatewayError::Unavailable(format!("{status}: {message}")),
            },
            other => GatewayError::Unavailable(other.to_string()),
        }
    }
}

/// Pass through successful responses; turn the rest into `GoogleApiError::Api`
/// carrying Google's `error.message` when present.
pub(crate) async fn check(response: reqwest::Response) -> Result<reqwest::Response, GoogleApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or(body);
    Err(GoogleApiError::Api {
        status: status.as_u16(),
        message,
    })
}
