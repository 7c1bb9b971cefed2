//! Contracts for the external services the submission workflow talks to.
//!
//! Each call is a single request/response with no internal retry. Adapters
//! normalize provider-specific failures into [`GatewayError`].

use std::path::Path;

use async_trait::async_trait;
use tracing::debug;

use crate::document::DocumentType;
use crate::sheet::SpreadsheetRow;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GatewayError {
    /// Network, auth or timeout failure talking to the provider.
    #[error("service unavailable: {0}")]
    Unavailable(String),
    /// A looked-up folder, file or row does not exist.
    #[error("not found: {0}")]
    NotFound(String),
    /// The provider refused the request (e.g. unsupported file type).
    #[error("rejected: {0}")]
    Rejected(String),
}

/// What the classification service reported for a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Reported category, if it names a known document type.
    pub document_type: Option<DocumentType>,
    /// Raw category string as reported.
    pub reported: String,
    pub extracted_text: Option<String>,
    pub extracted_dates: Vec<String>,
}

impl Classification {
    pub fn from_reported(reported: impl Into<String>) -> Self {
        let reported = reported.into();
        Self {
            document_type: DocumentType::parse(&reported),
            reported,
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait DocumentClassifier: Send + Sync {
    async fn classify(&self, path: &Path, filename: &str) -> Result<Classification, GatewayError>;
}

/// Durable storage that hands back a stable retrieval link per file.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Look up the folder with this name, creating it if absent. Returns its key.
    ///
    /// Must be safe to call repeatedly and concurrently for the same name.
    async fn ensure_folder(&self, name: &str) -> Result<String, GatewayError>;

    /// Upload the local file under `name` into `folder` and return its link.
    async fn upload(&self, folder: &str, name: &str, path: &Path) -> Result<String, GatewayError>;

    /// Whether a link previously returned by [`FileStore::upload`] still resolves.
    async fn resolve(&self, link: &str) -> Result<bool, GatewayError>;
}

/// Outcome of a mirror write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MirrorWrite {
    Appended,
    Updated,
    Skipped,
}

/// Spreadsheet kept in sync with one row per student.
#[async_trait]
pub trait TabularMirror: Send + Sync {
    /// Append the row, or update the existing row with the same register number.
    async fn upsert_row(&self, row: &SpreadsheetRow) -> Result<MirrorWrite, GatewayError>;
}

/// Used when no classification service is configured.
pub struct DisabledClassifier;

#[async_trait]
impl DocumentClassifier for DisabledClassifier {
    async fn classify(&self, _path: &Path, filename: &str) -> Result<Classification, GatewayError> {
        debug!(filename, "Classification disabled");
        Err(GatewayError::Unavailable(
            "classification service not configured".into(),
        ))
    }
}

/// Used when the spreadsheet mirror is turned off.
pub struct DisabledMirror;

#[async_trait]
impl TabularMirror for DisabledMirror {
    async fn upsert_row(&self, row: &SpreadsheetRow) -> Result<MirrorWrite, GatewayError> {
        debug!(register_number = %row.register_number, "Mirror disabled");
        Ok(MirrorWrite::Skipped)
    }
}
