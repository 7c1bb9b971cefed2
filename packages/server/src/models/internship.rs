use common::{InternshipRecord, StudentProfile};
use serde::Serialize;

use crate::workflow::{FileOutcome, MirrorStatus, Submission};

/// Response of a new submission.
#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    #[schema(example = "Internship details uploaded successfully")]
    pub message: String,
    /// The created record.
    pub data: InternshipRecord,
    /// Per-file outcome, in submission order.
    pub files: Vec<FileOutcome>,
    pub mirror: MirrorStatus,
}

impl From<Submission> for SubmissionResponse {
    fn from(submission: Submission) -> Self {
        Self {
            message: "Internship details uploaded successfully".into(),
            data: submission.record,
            files: submission.files,
            mirror: submission.mirror,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct InternshipListResponse {
    pub success: bool,
    pub internships: Vec<InternshipRecord>,
}

/// A single record. Updates also carry their per-file outcomes.
#[derive(Serialize, utoipa::ToSchema)]
pub struct InternshipResponse {
    pub success: bool,
    pub internship: InternshipRecord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<FileOutcome>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mirror: Option<MirrorStatus>,
}

impl From<InternshipRecord> for InternshipResponse {
    fn from(internship: InternshipRecord) -> Self {
        Self {
            success: true,
            internship,
            files: None,
            mirror: None,
        }
    }
}

impl From<Submission> for InternshipResponse {
    fn from(submission: Submission) -> Self {
        Self {
            success: true,
            internship: submission.record,
            files: Some(submission.files),
            mirror: Some(submission.mirror),
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentDetailsResponse {
    pub success: bool,
    /// Every student profile, sorted by register number.
    pub student_details: Vec<StudentProfile>,
}
