use common::{DocumentType, InternshipRecord};
use serde::Serialize;

/// What happened to one uploaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Stored durably and recorded on the internship.
    Uploaded,
    /// No recognized document type was declared; nothing was stored.
    Skipped,
    /// The durable file store refused or could not be reached.
    Failed,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FileOutcome {
    /// Original client-side file name.
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_type: Option<DocumentType>,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn uploaded(filename: &str, doc: DocumentType, link: String, verified: bool) -> Self {
        Self {
            filename: filename.to_string(),
            document_type: Some(doc),
            status: FileStatus::Uploaded,
            link: Some(link),
            verified: Some(verified),
            error: None,
        }
    }

    pub fn skipped(filename: &str, reason: impl Into<String>) -> Self {
        Self {
            filename: filename.to_string(),
            document_type: None,
            status: FileStatus::Skipped,
            link: None,
            verified: None,
            error: Some(reason.into()),
        }
    }

    pub fn failed(filename: &str, doc: DocumentType, reason: impl Into<String>) -> Self {
        Self {
            filename: filename.to_string(),
            document_type: Some(doc),
            status: FileStatus::Failed,
            link: None,
            verified: None,
            error: Some(reason.into()),
        }
    }
}

/// A file that reached durable storage, listed for manual reconciliation
/// when the record write fails afterwards.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub filename: String,
    pub document_type: DocumentType,
    pub link: String,
}

pub fn uploaded_files(outcomes: &[FileOutcome]) -> Vec<UploadedFile> {
    outcomes
        .iter()
        .filter(|o| o.status == FileStatus::Uploaded)
        .filter_map(|o| {
            Some(UploadedFile {
                filename: o.filename.clone(),
                document_type: o.document_type?,
                link: o.link.clone()?,
            })
        })
        .collect()
}

/// Result of the best-effort spreadsheet write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MirrorStatus {
    Appended,
    Updated,
    /// Mirror is disabled.
    Skipped,
    Failed,
}

/// A committed record plus how each file and the mirror fared.
#[derive(Debug, Clone)]
pub struct Submission {
    pub record: InternshipRecord,
    pub files: Vec<FileOutcome>,
    pub mirror: MirrorStatus,
}
