pub mod document;
pub mod gateway;
pub mod internship;
pub mod profile;
pub mod sheet;
pub mod storage;

pub use document::DocumentType;
pub use internship::{DocumentStatus, InternshipFields, InternshipPatch, InternshipRecord};
pub use profile::{Role, StudentProfile};
