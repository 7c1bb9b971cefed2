use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::document::DocumentType;

/// Stored state of one uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    /// Retrieval link in the durable file store.
    pub link: String,
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
}

/// Scalar fields of an internship, all required at creation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InternshipFields {
    pub role: String,
    pub period: String,
    pub start_date: String,
    pub end_date: String,
    pub company_name: String,
    pub placement_type: String,
    pub stipend: String,
    pub research_industry: String,
    pub location: String,
}

impl InternshipFields {
    /// Form field names, in validation and column order.
    pub const NAMES: [&'static str; 9] = [
        "role",
        "period",
        "startDate",
        "endDate",
        "companyName",
        "placementType",
        "stipend",
        "researchIndustry",
        "location",
    ];

    pub fn values(&self) -> [&str; 9] {
        [
            &self.role,
            &self.period,
            &self.start_date,
            &self.end_date,
            &self.company_name,
            &self.placement_type,
            &self.stipend,
            &self.research_industry,
            &self.location,
        ]
    }

    /// Overwrite every field the patch supplies; leave the rest untouched.
    pub fn apply(&mut self, patch: &InternshipPatch) {
        let InternshipPatch {
            role,
            period,
            start_date,
            end_date,
            company_name,
            placement_type,
            stipend,
            research_industry,
            location,
        } = patch;
        let pairs = [
            (&mut self.role, role),
            (&mut self.period, period),
            (&mut self.start_date, start_date),
            (&mut self.end_date, end_date),
            (&mut self.company_name, company_name),
            (&mut self.placement_type, placement_type),
            (&mut self.stipend, stipend),
            (&mut self.research_industry, research_industry),
            (&mut self.location, location),
        ];
        for (field, value) in pairs {
            if let Some(value) = value {
                field.clone_from(value);
            }
        }
    }
}

/// Partially supplied scalar fields, as read from a form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InternshipPatch {
    pub role: Option<String>,
    pub period: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub company_name: Option<String>,
    pub placement_type: Option<String>,
    pub stipend: Option<String>,
    pub research_industry: Option<String>,
    pub location: Option<String>,
}

impl InternshipPatch {
    /// Record a form value by its field name.
    ///
    /// Returns `false` if the name is not an internship field. Blank values
    /// count as absent.
    pub fn set(&mut self, name: &str, value: &str) -> bool {
        let slot = match name {
            "role" => &mut self.role,
            "period" => &mut self.period,
            "startDate" => &mut self.start_date,
            "endDate" => &mut self.end_date,
            "companyName" => &mut self.company_name,
            "placementType" => &mut self.placement_type,
            "stipend" => &mut self.stipend,
            "researchIndustry" => &mut self.research_industry,
            "location" => &mut self.location,
            _ => return false,
        };
        let value = value.trim();
        *slot = (!value.is_empty()).then(|| value.to_string());
        true
    }

    fn slots(&self) -> [&Option<String>; 9] {
        [
            &self.role,
            &self.period,
            &self.start_date,
            &self.end_date,
            &self.company_name,
            &self.placement_type,
            &self.stipend,
            &self.research_industry,
            &self.location,
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.slots().iter().all(|slot| slot.is_none())
    }

    /// Name of the first field, in [`InternshipFields::NAMES`] order, that is absent.
    pub fn first_missing(&self) -> Option<&'static str> {
        self.slots()
            .iter()
            .zip(InternshipFields::NAMES)
            .find(|(slot, _)| slot.is_none())
            .map(|(_, name)| name)
    }

    /// Convert into complete fields, or name the first missing one.
    pub fn into_fields(self) -> Result<InternshipFields, &'static str> {
        if let Some(name) = self.first_missing() {
            return Err(name);
        }
        let mut fields = InternshipFields::default();
        fields.apply(&self);
        Ok(fields)
    }
}

/// One internship entry of a student profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InternshipRecord {
    /// Assigned once at creation; the sole identity of the record.
    pub id: String,
    #[serde(flatten)]
    pub fields: InternshipFields,
    #[serde(default)]
    pub documents: BTreeMap<DocumentType, DocumentStatus>,
}

impl InternshipRecord {
    pub fn new(fields: InternshipFields) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            fields,
            documents: BTreeMap::new(),
        }
    }
}
