//! Reads a multipart submission into memory-backed fields and temp files.
//!
//! Every validation the request can fail happens here, before any gateway
//! is called.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use axum::extract::Multipart;
use axum::extract::multipart::Field;
use common::InternshipPatch;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use crate::config::UploadConfig;
use crate::error::AppError;
use crate::utils::filename::{has_allowed_extension, validate_flat_filename};

/// Form field prefix that declares a file's document type.
pub const DOCUMENT_TYPE_PREFIX: &str = "documentType_";

/// An uploaded file staged on local disk. Removed when dropped.
#[derive(Debug)]
pub struct StagedFile {
    pub original_name: String,
    pub path: PathBuf,
    pub size: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for StagedFile {
    fn drop(&mut self) {
        // Best effort.
        let _ = std::fs::remove_file(&self.path);
    }
}

/// A fully read submission form.
#[derive(Debug, Default)]
pub struct StagedForm {
    pub fields: InternshipPatch,
    /// Declared type per original file name.
    pub declared_types: HashMap<String, String>,
    /// Files in submission order.
    pub files: Vec<StagedFile>,
}

impl StagedForm {
    pub fn declared_type(&self, filename: &str) -> Option<&str> {
        self.declared_types.get(filename).map(String::as_str)
    }
}

fn multipart_error(e: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Multipart error: {e}"))
}

/// Read every part of the form, staging file parts under `config.staging_dir()`.
pub async fn stage_form(
    multipart: &mut Multipart,
    config: &UploadConfig,
) -> Result<StagedForm, AppError> {
    let mut form = StagedForm::default();
    let staging_dir = config.staging_dir();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if let Some(file_name) = field.file_name().map(str::to_string) {
            // Browsers send an empty part for an untouched file input.
            if file_name.trim().is_empty() {
                continue;
            }
            let file_name = validate_flat_filename(&file_name)
                .map_err(|e| AppError::Validation(e.message().into()))?
                .to_string();

            if form.files.len() >= config.max_files {
                return Err(AppError::Validation(format!(
                    "At most {} files may be uploaded per request",
                    config.max_files
                )));
            }
            if !has_allowed_extension(&file_name, &config.allowed_extensions) {
                return Err(AppError::Validation(format!(
                    "Unsupported file type for {file_name}; allowed: {}",
                    config.allowed_extensions.join(", ")
                )));
            }

            let staged = stage_field(field, &staging_dir, &file_name, config.max_file_size).await?;
            form.files.push(staged);
            continue;
        }

        let value = field.text().await.map_err(multipart_error)?;
        if let Some(target) = name.strip_prefix(DOCUMENT_TYPE_PREFIX) {
            form.declared_types
                .insert(target.to_string(), value.trim().to_string());
        } else if !form.fields.set(&name, &value) {
            tracing::debug!(field = %name, "Ignoring unknown form field");
        }
    }

    Ok(form)
}

/// Stream one file part to disk, enforcing the size limit as chunks arrive.
async fn stage_field(
    mut field: Field<'_>,
    staging_dir: &Path,
    file_name: &str,
    max_size: u64,
) -> Result<StagedFile, AppError> {
    tokio::fs::create_dir_all(staging_dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create staging dir: {e}")))?;

    // Constructed first so every exit path below removes the file.
    let mut staged = StagedFile {
        original_name: file_name.to_string(),
        path: staging_dir.join(format!("internship-upload-{}", Uuid::new_v4())),
        size: 0,
    };

    let mut temp_file = tokio::fs::File::create(&staged.path)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to create temp file: {e}")))?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
    {
        staged.size += chunk.len() as u64;
        if staged.size > max_size {
            return Err(AppError::Validation(format!(
                "{file_name} exceeds maximum size of {max_size} bytes"
            )));
        }
        temp_file
            .write_all(&chunk)
            .await
            .map_err(|e| AppError::Internal(format!("Temp file write failed: {e}")))?;
    }

    temp_file
        .flush()
        .await
        .map_err(|e| AppError::Internal(format!("Temp file flush failed: {e}")))?;

    Ok(staged)
}
