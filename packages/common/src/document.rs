use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Category of an internship proof document.
///
/// The declaration order is the fixed enumeration order used for spreadsheet
/// columns and for iterating a record's documents.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
)]
#[serde(rename_all = "camelCase")]
pub enum DocumentType {
    PermissionLetter,
    OfferLetter,
    CompletionCertificate,
    InternshipReport,
    StudentFeedback,
    EmployerFeedback,
}

impl DocumentType {
    pub const ALL: [DocumentType; 6] = [
        DocumentType::PermissionLetter,
        DocumentType::OfferLetter,
        DocumentType::CompletionCertificate,
        DocumentType::InternshipReport,
        DocumentType::StudentFeedback,
        DocumentType::EmployerFeedback,
    ];

    /// Wire key used in form tags and JSON.
    pub fn key(self) -> &'static str {
        match self {
            Self::PermissionLetter => "permissionLetter",
            Self::OfferLetter => "offerLetter",
            Self::CompletionCertificate => "completionCertificate",
            Self::InternshipReport => "internshipReport",
            Self::StudentFeedback => "studentFeedback",
            Self::EmployerFeedback => "employerFeedback",
        }
    }

    /// Human-readable label, as reported by the classification service.
    pub fn label(self) -> &'static str {
        match self {
            Self::PermissionLetter => "Signed Permission Letter",
            Self::OfferLetter => "Offer Letter",
            Self::CompletionCertificate => "Completion Certificate",
            Self::InternshipReport => "Internship Report",
            Self::StudentFeedback => "Student Feedback (About Internship)",
            Self::EmployerFeedback => "Employer Feedback (About student)",
        }
    }

    /// Parse either the wire key or the label, ignoring ASCII case.
    ///
    /// A leading `Document Type:` prefix is tolerated.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        let trimmed = trimmed
            .strip_prefix("Document Type:")
            .map(str::trim)
            .unwrap_or(trimmed);
        if trimmed.is_empty() {
            return None;
        }
        Self::ALL.into_iter().find(|t| {
            t.key().eq_ignore_ascii_case(trimmed) || t.label().eq_ignore_ascii_case(trimmed)
        })
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown document type: {0}")]
pub struct UnknownDocumentType(pub String);

impl FromStr for DocumentType {
    type Err = UnknownDocumentType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| UnknownDocumentType(s.to_string()))
    }
}
