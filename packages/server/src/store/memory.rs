use std::collections::HashMap;

use async_trait::async_trait;
use common::{InternshipRecord, StudentProfile};
use tokio::sync::Mutex;

use super::{Credential, RecordStore, StoreError, internship_not_found, profile_not_found};

/// In-process store for single-node deployments and tests.
#[derive(Default)]
pub struct MemoryStore {
    credentials: Mutex<HashMap<String, Credential>>,
    profiles: Mutex<HashMap<String, StudentProfile>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_credential(&self, email: &str) -> Result<Option<Credential>, StoreError> {
        Ok(self.credentials.lock().await.get(email).cloned())
    }

    async fn find_profile(&self, email: &str) -> Result<Option<StudentProfile>, StoreError> {
        Ok(self.profiles.lock().await.get(email).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<StudentProfile>, StoreError> {
        let mut profiles: Vec<StudentProfile> =
            self.profiles.lock().await.values().cloned().collect();
        profiles.sort_by(|a, b| a.register_number.cmp(&b.register_number));
        Ok(profiles)
    }

    async fn append_internship(
        &self,
        email: &str,
        record: InternshipRecord,
    ) -> Result<StudentProfile, StoreError> {
        let mut profiles = self.profiles.lock().await;
        let profile = profiles.get_mut(email).ok_or_else(profile_not_found)?;
        profile.internships.push(record);
        Ok(profile.clone())
    }

    async fn replace_internship(
        &self,
        email: &str,
        record: InternshipRecord,
    ) -> Result<StudentProfile, StoreError> {
        let mut profiles = self.profiles.lock().await;
        let profile = profiles.get_mut(email).ok_or_else(profile_not_found)?;
        if !profile.replace_internship(record) {
            return Err(internship_not_found());
        }
        Ok(profile.clone())
    }

    async fn put_credential(&self, credential: Credential) -> Result<(), StoreError> {
        self.credentials
            .lock()
            .await
            .insert(credential.email.clone(), credential);
        Ok(())
    }

    async fn put_profile(&self, mut profile: StudentProfile) -> Result<(), StoreError> {
        let mut profiles = self.profiles.lock().await;
        if let Some(existing) = profiles.remove(&profile.email) {
            profile.internships = existing.internships;
        }
        profiles.insert(profile.email.clone(), profile);
        Ok(())
    }
}
