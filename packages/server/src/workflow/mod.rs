//! Internship submission workflow.
//!
//! `Received -> Validated -> per-file processing -> Reconciled -> Committed`.
//! All client errors surface while staging or validating, before any gateway
//! call. Files are processed one at a time in submission order:
//! classify, upload, then record the document status. The record store is
//! authoritative. The spreadsheet mirror is written last and its failure is
//! reported, never raised.

pub mod outcome;
pub mod staging;
pub mod verify;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use common::gateway::{
    Classification, DocumentClassifier, FileStore, GatewayError, MirrorWrite, TabularMirror,
};
use common::sheet::SpreadsheetRow;
use common::{DocumentStatus, DocumentType, InternshipRecord, StudentProfile};
use tracing::{info, instrument, warn};

pub use outcome::{FileOutcome, FileStatus, MirrorStatus, Submission, UploadedFile};
pub use staging::{StagedFile, StagedForm, stage_form};

use crate::error::AppError;
use crate::gateways::Gateways;
use crate::store::{RecordStore, StoreError};
use crate::utils::filename::{name_nonce, stored_file_name};
use outcome::uploaded_files;
use verify::{VerifyPolicy, is_verified};

pub struct InternshipWorkflow {
    store: Arc<dyn RecordStore>,
    classifier: Arc<dyn DocumentClassifier>,
    files: Arc<dyn FileStore>,
    mirror: Arc<dyn TabularMirror>,
    gateway_timeout: Duration,
}

impl InternshipWorkflow {
    pub fn new(store: Arc<dyn RecordStore>, gateways: &Gateways, gateway_timeout: Duration) -> Self {
        Self {
            store,
            classifier: gateways.classifier.clone(),
            files: gateways.files.clone(),
            mirror: gateways.mirror.clone(),
            gateway_timeout,
        }
    }

    /// Create a new internship record from a complete form with at least one file.
    #[instrument(skip(self, form), fields(files = form.files.len()))]
    pub async fn submit_new(&self, email: &str, form: StagedForm) -> Result<Submission, AppError> {
        let fields = form
            .fields
            .clone()
            .into_fields()
            .map_err(|name| AppError::Validation(format!("Missing required field: {name}")))?;
        if form.files.is_empty() {
            return Err(AppError::Validation(
                "At least one document must be uploaded".into(),
            ));
        }

        let profile = self.profile(email).await?;
        let mut record = InternshipRecord::new(fields);

        let files = self
            .process_files(&profile, &mut record, &form, VerifyPolicy::TypeMatch)
            .await;
        ensure_any_stored(&files)?;

        let saved = self
            .store
            .append_internship(email, record.clone())
            .await
            .map_err(|e| persist_error(e, &files))?;
        info!(internship_id = %record.id, documents = record.documents.len(), "Internship created");

        let mirror = self.mirror_record(&saved, &record).await;
        Ok(Submission {
            record,
            files,
            mirror,
        })
    }

    /// Merge supplied fields and documents into an existing record.
    #[instrument(skip(self, form), fields(files = form.files.len()))]
    pub async fn update_existing(
        &self,
        email: &str,
        internship_id: &str,
        form: StagedForm,
    ) -> Result<Submission, AppError> {
        let profile = self.profile(email).await?;
        let mut record = profile
            .internship(internship_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Internship not found".into()))?;

        record.fields.apply(&form.fields);

        let (start, end) = (
            record.fields.start_date.clone(),
            record.fields.end_date.clone(),
        );
        let policy = VerifyPolicy::OfferLetterDates {
            start: &start,
            end: &end,
        };
        let files = self
            .process_files(&profile, &mut record, &form, policy)
            .await;
        ensure_any_stored(&files)?;

        let saved = self
            .store
            .replace_internship(email, record.clone())
            .await
            .map_err(|e| persist_error(e, &files))?;
        info!(internship_id = %record.id, "Internship updated");

        let mirror = self.mirror_record(&saved, &record).await;
        Ok(Submission {
            record,
            files,
            mirror,
        })
    }

    /// The caller's internships in stored order.
    pub async fn list_own(&self, email: &str) -> Result<Vec<InternshipRecord>, AppError> {
        Ok(self.profile(email).await?.internships)
    }

    pub async fn get_one(&self, email: &str, internship_id: &str) -> Result<InternshipRecord, AppError> {
        self.profile(email)
            .await?
            .internship(internship_id)
            .cloned()
            .ok_or_else(|| AppError::NotFound("Internship not found".into()))
    }

    /// Every student profile, sorted by register number.
    pub async fn list_all(&self) -> Result<Vec<StudentProfile>, AppError> {
        Ok(self.store.list_profiles().await?)
    }

    async fn profile(&self, email: &str) -> Result<StudentProfile, AppError> {
        self.store
            .find_profile(email)
            .await?
            .ok_or_else(|| AppError::NotFound("Student profile not found".into()))
    }

    async fn process_files(
        &self,
        profile: &StudentProfile,
        record: &mut InternshipRecord,
        form: &StagedForm,
        policy: VerifyPolicy<'_>,
    ) -> Vec<FileOutcome> {
        // Resolved on first use; a failed lookup is retried by the next file.
        let mut folder: Option<String> = None;
        let mut outcomes = Vec::with_capacity(form.files.len());
        for file in &form.files {
            let outcome = self
                .process_file(profile, record, form, file, policy, &mut folder)
                .await;
            outcomes.push(outcome);
        }
        outcomes
    }

    async fn process_file(
        &self,
        profile: &StudentProfile,
        record: &mut InternshipRecord,
        form: &StagedForm,
        file: &StagedFile,
        policy: VerifyPolicy<'_>,
        folder: &mut Option<String>,
    ) -> FileOutcome {
        let filename = file.original_name.as_str();
        let Some(doc) = form
            .declared_type(filename)
            .and_then(DocumentType::parse)
        else {
            warn!(filename, "Skipping file without a recognized document type");
            return FileOutcome::skipped(filename, "No recognized document type declared");
        };

        let stored_name = stored_file_name(
            &profile.file_prefix(),
            doc,
            Utc::now().timestamp_millis(),
            &name_nonce(),
            filename,
        );

        let classification = self.classify(file).await;
        let verified = is_verified(doc, classification.as_ref(), policy);

        let folder_key = if let Some(key) = folder.as_ref() {
            key.clone()
        } else {
            match self
                .bounded(self.files.ensure_folder(&profile.register_number))
                .await
            {
                Ok(key) => folder.insert(key).clone(),
                Err(e) => {
                    warn!(filename, error = %e, "Student folder lookup failed");
                    return FileOutcome::failed(filename, doc, e.to_string());
                }
            }
        };

        let link = match self
            .bounded(self.files.upload(&folder_key, &stored_name, file.path()))
            .await
        {
            Ok(link) => link,
            Err(e) => {
                warn!(filename, error = %e, "Upload to file store failed");
                return FileOutcome::failed(filename, doc, e.to_string());
            }
        };

        // Only recorded once the upload has succeeded. A later file of the
        // same type replaces this entry.
        record.documents.insert(
            doc,
            DocumentStatus {
                link: link.clone(),
                verified,
                extracted_text: classification.and_then(|c| c.extracted_text),
            },
        );
        FileOutcome::uploaded(filename, doc, link, verified)
    }

    /// Best effort: any failure leaves the document unverified.
    async fn classify(&self, file: &StagedFile) -> Option<Classification> {
        match self
            .bounded(self.classifier.classify(file.path(), &file.original_name))
            .await
        {
            Ok(classification) => Some(classification),
            Err(e) => {
                warn!(filename = %file.original_name, error = %e, "Classification failed");
                None
            }
        }
    }

    async fn mirror_record(&self, profile: &StudentProfile, record: &InternshipRecord) -> MirrorStatus {
        let row = SpreadsheetRow::project(profile, record);
        match self.bounded(self.mirror.upsert_row(&row)).await {
            Ok(MirrorWrite::Appended) => MirrorStatus::Appended,
            Ok(MirrorWrite::Updated) => MirrorStatus::Updated,
            Ok(MirrorWrite::Skipped) => MirrorStatus::Skipped,
            Err(e) => {
                warn!(
                    register_number = %profile.register_number,
                    error = %e,
                    "Spreadsheet mirror update failed"
                );
                MirrorStatus::Failed
            }
        }
    }

    /// Run a gateway call under the configured timeout.
    async fn bounded<T>(
        &self,
        call: impl Future<Output = Result<T, GatewayError>>,
    ) -> Result<T, GatewayError> {
        match tokio::time::timeout(self.gateway_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(GatewayError::Unavailable(format!(
                "timed out after {}s",
                self.gateway_timeout.as_secs_f32()
            ))),
        }
    }
}

/// Nothing is saved if files were attempted and none reached storage.
fn ensure_any_stored(outcomes: &[FileOutcome]) -> Result<(), AppError> {
    let attempted = outcomes
        .iter()
        .filter(|o| o.status != FileStatus::Skipped)
        .count();
    let failed = outcomes
        .iter()
        .filter(|o| o.status == FileStatus::Failed)
        .count();
    if attempted > 0 && failed == attempted {
        let reasons: Vec<&str> = outcomes.iter().filter_map(|o| o.error.as_deref()).collect();
        return Err(AppError::UpstreamUnavailable(format!(
            "no document could be stored: {}",
            reasons.join("; ")
        )));
    }
    Ok(())
}

fn persist_error(err: StoreError, outcomes: &[FileOutcome]) -> AppError {
    let uploaded = uploaded_files(outcomes);
    if uploaded.is_empty() {
        return err.into();
    }
    AppError::PartiallyCommitted {
        uploaded,
        detail: err.to_string(),
    }
}
