use common::DocumentType;
use common::gateway::Classification;

/// How a freshly uploaded document earns `verified = true`.
#[derive(Debug, Clone, Copy)]
pub enum VerifyPolicy<'a> {
    /// Reported type must equal the declared type.
    TypeMatch,
    /// As `TypeMatch`, except offer letters are checked against the
    /// internship's dates instead.
    OfferLetterDates { start: &'a str, end: &'a str },
}

pub fn is_verified(
    declared: DocumentType,
    classification: Option<&Classification>,
    policy: VerifyPolicy<'_>,
) -> bool {
    let Some(classification) = classification else {
        return false;
    };
    match policy {
        VerifyPolicy::OfferLetterDates { start, end } if declared == DocumentType::OfferLetter => {
            dates_cover(&classification.extracted_dates, start, end)
        }
        _ => classification.document_type == Some(declared),
    }
}

/// Both dates occur within the extracted date strings and `start < end`.
pub fn dates_cover(extracted: &[String], start: &str, end: &str) -> bool {
    let (start, end) = (start.trim(), end.trim());
    if start.is_empty() || end.is_empty() || start >= end {
        return false;
    }
    let found = |date: &str| extracted.iter().any(|d| d.contains(date));
    found(start) && found(end)
}
