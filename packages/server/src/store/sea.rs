use async_trait::async_trait;
use chrono::Utc;
use common::{InternshipRecord, Role, StudentProfile};
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait, sea_query::LockType,
};
use tracing::debug;
use uuid::Uuid;

use super::{Credential, RecordStore, StoreError, internship_not_found, profile_not_found};
use crate::entity::{credential, student};

/// PostgreSQL-backed store. Internships live in a JSONB column of the
/// student row, so each mutation rewrites one row under a row lock.
pub struct SeaOrmStore {
    db: DatabaseConnection,
}

impl SeaOrmStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn credential_from_model(model: credential::Model) -> Result<Credential, StoreError> {
    let role: Role = model
        .role
        .parse()
        .map_err(|e| StoreError::Corrupt(format!("credential {}: {e}", model.email)))?;
    Ok(Credential {
        id: model.id.to_string(),
        email: model.email,
        password_hash: model.password,
        role,
        display_name: model.display_name,
    })
}

fn profile_from_model(model: student::Model) -> Result<StudentProfile, StoreError> {
    let internships: Vec<InternshipRecord> = serde_json::from_value(model.internships)
        .map_err(|e| StoreError::Corrupt(format!("internships of {}: {e}", model.email)))?;
    Ok(StudentProfile {
        name: model.name,
        email: model.email,
        register_number: model.register_number,
        mobile_number: model.mobile_number,
        section: model.section,
        internships,
    })
}

fn internships_json(internships: &[InternshipRecord]) -> Result<serde_json::Value, StoreError> {
    serde_json::to_value(internships)
        .map_err(|e| StoreError::Corrupt(format!("failed to encode internships: {e}")))
}

impl SeaOrmStore {
    /// Lock the student row, let `mutate` edit the decoded profile, write it back.
    async fn mutate_profile<F>(&self, email: &str, mutate: F) -> Result<StudentProfile, StoreError>
    where
        F: FnOnce(&mut StudentProfile) -> Result<(), StoreError> + Send,
    {
        let txn = self.db.begin().await?;

        let row = find_student_for_update(&txn, email)
            .await?
            .ok_or_else(profile_not_found)?;
        let mut profile = profile_from_model(row.clone())?;
        mutate(&mut profile)?;

        let mut active: student::ActiveModel = row.into();
        active.internships = Set(internships_json(&profile.internships)?);
        active.updated_at = Set(Utc::now());
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(profile)
    }
}

async fn find_student_for_update(
    txn: &DatabaseTransaction,
    email: &str,
) -> Result<Option<student::Model>, StoreError> {
    Ok(student::Entity::find()
        .filter(student::Column::Email.eq(email))
        .lock(LockType::Update)
        .one(txn)
        .await?)
}

#[async_trait]
impl RecordStore for SeaOrmStore {
    async fn find_credential(&self, email: &str) -> Result<Option<Credential>, StoreError> {
        credential::Entity::find()
            .filter(credential::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(credential_from_model)
            .transpose()
    }

    async fn find_profile(&self, email: &str) -> Result<Option<StudentProfile>, StoreError> {
        student::Entity::find()
            .filter(student::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(profile_from_model)
            .transpose()
    }

    async fn list_profiles(&self) -> Result<Vec<StudentProfile>, StoreError> {
        student::Entity::find()
            .order_by_asc(student::Column::RegisterNumber)
            .all(&self.db)
            .await?
            .into_iter()
            .map(profile_from_model)
            .collect()
    }

    async fn append_internship(
        &self,
        email: &str,
        record: InternshipRecord,
    ) -> Result<StudentProfile, StoreError> {
        self.mutate_profile(email, move |profile| {
            profile.internships.push(record);
            Ok(())
        })
        .await
    }

    async fn replace_internship(
        &self,
        email: &str,
        record: InternshipRecord,
    ) -> Result<StudentProfile, StoreError> {
        self.mutate_profile(email, move |profile| {
            if profile.replace_internship(record) {
                Ok(())
            } else {
                Err(internship_not_found())
            }
        })
        .await
    }

    async fn put_credential(&self, credential: Credential) -> Result<(), StoreError> {
        let id = Uuid::parse_str(&credential.id)
            .map_err(|e| StoreError::Corrupt(format!("credential id {}: {e}", credential.id)))?;
        let model = credential::ActiveModel {
            id: Set(id),
            email: Set(credential.email),
            password: Set(credential.password_hash),
            role: Set(credential.role.as_str().to_string()),
            display_name: Set(credential.display_name),
            created_at: Set(Utc::now()),
        };

        credential::Entity::insert(model)
            .on_conflict(
                OnConflict::column(credential::Column::Email)
                    .update_columns([
                        credential::Column::Password,
                        credential::Column::Role,
                        credential::Column::DisplayName,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }

    async fn put_profile(&self, profile: StudentProfile) -> Result<(), StoreError> {
        debug!(email = %profile.email, "Upserting student profile");
        let model = student::ActiveModel {
            email: Set(profile.email),
            name: Set(profile.name),
            register_number: Set(profile.register_number),
            mobile_number: Set(profile.mobile_number),
            section: Set(profile.section),
            internships: Set(internships_json(&profile.internships)?),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };

        student::Entity::insert(model)
            .on_conflict(
                OnConflict::column(student::Column::Email)
                    .update_columns([
                        student::Column::Name,
                        student::Column::RegisterNumber,
                        student::Column::MobileNumber,
                        student::Column::Section,
                        student::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;
        Ok(())
    }
}
