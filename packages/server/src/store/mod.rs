//! Credential and student record persistence.
//!
//! The workflow holds no lock across gateway calls. Each write re-reads the
//! profile inside the store so the window between read and persist stays
//! as short as the backend allows.

pub mod memory;
pub mod sea;

use async_trait::async_trait;
use common::{InternshipRecord, Role, StudentProfile};

pub use memory::MemoryStore;
pub use sea::SeaOrmStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    #[error("corrupt record: {0}")]
    Corrupt(String),
}

/// A login account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub id: String,
    pub email: String,
    /// Argon2 PHC string.
    pub password_hash: String,
    pub role: Role,
    /// Shown for non-student roles, which have no profile.
    pub display_name: Option<String>,
}

impl Credential {
    pub fn new(
        email: impl Into<String>,
        password_hash: impl Into<String>,
        role: Role,
        display_name: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::now_v7().to_string(),
            email: email.into(),
            password_hash: password_hash.into(),
            role,
            display_name,
        }
    }
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn find_credential(&self, email: &str) -> Result<Option<Credential>, StoreError>;

    async fn find_profile(&self, email: &str) -> Result<Option<StudentProfile>, StoreError>;

    /// Every profile, sorted by register number ascending.
    async fn list_profiles(&self) -> Result<Vec<StudentProfile>, StoreError>;

    /// Append a record to the profile and return the profile as persisted.
    async fn append_internship(
        &self,
        email: &str,
        record: InternshipRecord,
    ) -> Result<StudentProfile, StoreError>;

    /// Replace the record with the same id and return the profile as persisted.
    ///
    /// Fails with `NotFound` if the profile or the record id is gone.
    async fn replace_internship(
        &self,
        email: &str,
        record: InternshipRecord,
    ) -> Result<StudentProfile, StoreError>;

    /// Create or overwrite the account with the same email.
    async fn put_credential(&self, credential: Credential) -> Result<(), StoreError>;

    /// Create the profile, or refresh the contact fields of an existing one.
    /// Internships already stored for the email are kept.
    async fn put_profile(&self, profile: StudentProfile) -> Result<(), StoreError>;
}

fn profile_not_found() -> StoreError {
    StoreError::NotFound("Student profile".into())
}

fn internship_not_found() -> StoreError {
    StoreError::NotFound("Internship".into())
}
