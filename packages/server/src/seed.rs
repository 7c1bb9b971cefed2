//! Account and profile provisioning from a JSON file.
//!
//! ```json
//! {
//!   "accounts": [{"email": "rao@college.edu", "password": "...", "role": "faculty", "name": "Dr. Rao"}],
//!   "students": [{"name": "Asha", "email": "asha@college.edu", "registerNumber": "212221040117",
//!                 "mobileNumber": "9000000000", "section": "B"}]
//! }
//! ```

use std::path::Path;

use common::{Role, StudentProfile};
use serde::Deserialize;
use tracing::info;

use crate::store::{Credential, RecordStore};
use crate::utils::hash;

#[derive(Debug, Deserialize)]
pub struct SeedAccount {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedFile {
    #[serde(default)]
    pub accounts: Vec<SeedAccount>,
    /// Internships listed here only apply to students not yet stored.
    #[serde(default)]
    pub students: Vec<StudentProfile>,
}

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid seed file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to hash password for {email}: {detail}")]
    Hash { email: String, detail: String },
    #[error(transparent)]
    Store(#[from] crate::store::StoreError),
}

/// Write every account and profile of the seed into the store.
pub async fn apply(store: &dyn RecordStore, seed: SeedFile) -> Result<(), SeedError> {
    let accounts = seed.accounts.len();
    for account in seed.accounts {
        let password_hash =
            hash::hash_password(&account.password).map_err(|e| SeedError::Hash {
                email: account.email.clone(),
                detail: e.to_string(),
            })?;
        store
            .put_credential(Credential::new(
                account.email.trim(),
                password_hash,
                account.role,
                account.name,
            ))
            .await?;
    }

    let students = seed.students.len();
    for profile in seed.students {
        store.put_profile(profile).await?;
    }

    info!(accounts, students, "Seed applied");
    Ok(())
}

pub async fn apply_file(store: &dyn RecordStore, path: &Path) -> Result<(), SeedError> {
    let raw = tokio::fs::read(path).await?;
    let seed: SeedFile = serde_json::from_slice(&raw)?;
    apply(store, seed).await
}
