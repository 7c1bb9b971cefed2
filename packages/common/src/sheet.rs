//! Denormalized spreadsheet projection of a student and one internship.
//!
//! Layout: serial number, register number, name, mobile, section, the nine
//! internship fields, then a link/verified column pair per document type in
//! enumeration order.

use crate::document::DocumentType;
use crate::internship::InternshipRecord;
use crate::profile::StudentProfile;

const STUDENT_HEADERS: [&str; 5] = ["S.No", "Register Number", "Name", "Mobile Number", "Section"];

const FIELD_HEADERS: [&str; 9] = [
    "Role",
    "Period",
    "Start Date",
    "End Date",
    "Company Name",
    "Placement Type",
    "Stipend",
    "Research/Industry",
    "Location",
];

/// Zero-based column of the register number.
pub const REGISTER_COLUMN: usize = 1;
/// Zero-based column of the first internship field.
pub const FIELD_BASE_COLUMN: usize = STUDENT_HEADERS.len();
/// Zero-based column of the first document link.
pub const DOCUMENT_BASE_COLUMN: usize = FIELD_BASE_COLUMN + FIELD_HEADERS.len();
pub const COLUMN_COUNT: usize = DOCUMENT_BASE_COLUMN + 2 * DocumentType::ALL.len();

const PLACEHOLDER: &str = "N/A";

pub fn header() -> Vec<String> {
    let mut cells: Vec<String> = STUDENT_HEADERS
        .iter()
        .chain(FIELD_HEADERS.iter())
        .map(|h| h.to_string())
        .collect();
    for doc in DocumentType::ALL {
        cells.push(format!("{} Link", doc.label()));
        cells.push(format!("{} Verified", doc.label()));
    }
    cells
}

/// Spreadsheet column letters for a zero-based index (`0 -> A`, `26 -> AA`).
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Sheet name as it must appear in A1 notation.
pub fn quote_sheet(name: &str) -> String {
    if name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "''"))
    }
}

/// Range covering every column of the sheet, used to read all rows.
pub fn full_range(sheet: &str) -> String {
    format!(
        "{}!A:{}",
        quote_sheet(sheet),
        column_letter(COLUMN_COUNT - 1)
    )
}

/// Index of the row whose register number column matches.
pub fn find_row(rows: &[Vec<String>], register_number: &str) -> Option<usize> {
    let wanted = register_number.trim();
    rows.iter().position(|row| {
        row.get(REGISTER_COLUMN)
            .is_some_and(|cell| cell.trim() == wanted)
    })
}

/// Values written to one A1 range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeUpdate {
    pub range: String,
    pub values: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpreadsheetRow {
    pub register_number: String,
    pub name: String,
    pub mobile_number: String,
    pub section: String,
    pub fields: [String; 9],
    /// Link and verified flag per document type, in enumeration order.
    pub documents: [Option<(String, bool)>; 6],
}

fn or_placeholder(value: &str) -> String {
    if value.trim().is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value.to_string()
    }
}

fn yes_no(verified: bool) -> String {
    let cell = if verified { "Yes" } else { "No" };
    cell.to_string()
}

impl SpreadsheetRow {
    pub fn project(profile: &StudentProfile, record: &InternshipRecord) -> Self {
        Self {
            register_number: profile.register_number.clone(),
            name: profile.name.clone(),
            mobile_number: profile.mobile_number.clone(),
            section: profile.section.clone(),
            fields: record.fields.values().map(str::to_string),
            documents: DocumentType::ALL.map(|doc| {
                record
                    .documents
                    .get(&doc)
                    .map(|status| (status.link.clone(), status.verified))
            }),
        }
    }

    /// Cells of a freshly appended row.
    pub fn append_values(&self, serial: usize) -> Vec<String> {
        let mut cells = vec![
            serial.to_string(),
            or_placeholder(&self.register_number),
            or_placeholder(&self.name),
            or_placeholder(&self.mobile_number),
            or_placeholder(&self.section),
        ];
        cells.extend(self.fields.iter().map(|f| or_placeholder(f)));
        for doc in &self.documents {
            match doc {
                Some((link, verified)) => {
                    cells.push(link.clone());
                    cells.push(yes_no(*verified));
                }
                None => {
                    cells.push(PLACEHOLDER.to_string());
                    cells.push(yes_no(false));
                }
            }
        }
        cells
    }

    /// In-place updates for an existing row at zero-based `row_index`.
    ///
    /// Blank fields keep the existing cell. Document columns are only written
    /// for document types the record holds.
    pub fn update_ranges(
        &self,
        sheet: &str,
        row_index: usize,
        existing: &[String],
    ) -> Vec<RangeUpdate> {
        let sheet = quote_sheet(sheet);
        let row_number = row_index + 1;

        let field_values = self
            .fields
            .iter()
            .enumerate()
            .map(|(i, value)| {
                if !value.trim().is_empty() {
                    return value.clone();
                }
                existing
                    .get(FIELD_BASE_COLUMN + i)
                    .filter(|cell| !cell.trim().is_empty())
                    .cloned()
                    .unwrap_or_else(|| PLACEHOLDER.to_string())
            })
            .collect();

        let mut updates = vec![RangeUpdate {
            range: format!(
                "{sheet}!{}{row_number}:{}{row_number}",
                column_letter(FIELD_BASE_COLUMN),
                column_letter(DOCUMENT_BASE_COLUMN - 1)
            ),
            values: field_values,
        }];

        for (i, doc) in self.documents.iter().enumerate() {
            let Some((link, verified)) = doc else {
                continue;
            };
            let link_col = DOCUMENT_BASE_COLUMN + 2 * i;
            updates.push(RangeUpdate {
                range: format!(
                    "{sheet}!{}{row_number}:{}{row_number}",
                    column_letter(link_col),
                    column_letter(link_col + 1)
                ),
                values: vec![link.clone(), yes_no(*verified)],
            });
        }

        updates
    }
}
