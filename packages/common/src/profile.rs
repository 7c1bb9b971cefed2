use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::internship::InternshipRecord;

/// Account role carried in credentials and identity tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Faculty => "faculty",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Self::Student),
            "faculty" => Ok(Self::Faculty),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// A student's profile together with their internships, in stored order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentProfile {
    pub name: String,
    pub email: String,
    pub register_number: String,
    pub mobile_number: String,
    pub section: String,
    #[serde(default)]
    pub internships: Vec<InternshipRecord>,
}

impl StudentProfile {
    pub fn internship(&self, id: &str) -> Option<&InternshipRecord> {
        self.internships.iter().find(|r| r.id == id)
    }

    /// Replace the record with the same id. Returns `false` if there is none.
    pub fn replace_internship(&mut self, record: InternshipRecord) -> bool {
        match self.internships.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Last three characters of the register number, used to prefix stored file names.
    pub fn file_prefix(&self) -> String {
        let count = self.register_number.chars().count();
        self.register_number
            .chars()
            .skip(count.saturating_sub(3))
            .collect()
    }
}
