use axum::{
    Json,
    extract::{DefaultBodyLimit, Multipart, Path, State},
};
use common::Role;
use tracing::instrument;

use crate::config::UploadConfig;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::internship::{InternshipListResponse, InternshipResponse, SubmissionResponse};
use crate::state::AppState;
use crate::workflow::stage_form;

/// Body limit for the multipart routes: every file at full size plus the form fields.
pub fn upload_body_limit(config: &UploadConfig) -> DefaultBodyLimit {
    DefaultBodyLimit::max(config.body_limit())
}

#[utoipa::path(
    post,
    path = "/upload-internship-details",
    tag = "Student",
    operation_id = "submitInternship",
    summary = "Submit a new internship with its documents",
    description = "Multipart form with every internship field (`role`, `period`, `startDate`, \
        `endDate`, `companyName`, `placementType`, `stipend`, `researchIndustry`, `location`) and 1-6 files. \
        Each file is tagged by a `documentType_<originalFilename>` field naming its document type. \
        Files without a recognized type are skipped. Check `files` for per-file outcomes.",
    request_body(content_type = "multipart/form-data", description = "Internship fields and documents"),
    responses(
        (status = 200, description = "Internship created", body = SubmissionResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student profile not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Nothing saved (UPSTREAM_UNAVAILABLE) or files orphaned (PARTIALLY_COMMITTED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(email = %auth_user.email))]
pub async fn submit_internship(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmissionResponse>, AppError> {
    auth_user.require_role(&[Role::Student])?;

    let form = stage_form(&mut multipart, &state.config.upload).await?;
    let submission = state.workflow.submit_new(&auth_user.email, form).await?;
    Ok(Json(submission.into()))
}

#[utoipa::path(
    get,
    path = "/my-internships",
    tag = "Student",
    operation_id = "listMyInternships",
    summary = "List the caller's internships",
    responses(
        (status = 200, description = "Internships in stored order", body = InternshipListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Student profile not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(email = %auth_user.email))]
pub async fn list_my_internships(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<InternshipListResponse>, AppError> {
    auth_user.require_role(&[Role::Student])?;

    let internships = state.workflow.list_own(&auth_user.email).await?;
    Ok(Json(InternshipListResponse {
        success: true,
        internships,
    }))
}

#[utoipa::path(
    get,
    path = "/my-internships/{internship_id}",
    tag = "Student",
    operation_id = "getMyInternship",
    summary = "Get one of the caller's internships",
    params(("internship_id" = String, Path, description = "Internship ID")),
    responses(
        (status = 200, description = "Internship", body = InternshipResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Profile or internship not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(email = %auth_user.email))]
pub async fn get_my_internship(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(internship_id): Path<String>,
) -> Result<Json<InternshipResponse>, AppError> {
    auth_user.require_role(&[Role::Student])?;

    let record = state
        .workflow
        .get_one(&auth_user.email, &internship_id)
        .await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    put,
    path = "/my-internships/update/{internship_id}",
    tag = "Student",
    operation_id = "updateMyInternship",
    summary = "Partially update an internship",
    description = "Same multipart shape as submission, but every field and file is optional. \
        Supplied fields overwrite, omitted fields keep their stored value. \
        A new offer letter is verified against the record's start and end dates.",
    params(("internship_id" = String, Path, description = "Internship ID")),
    request_body(content_type = "multipart/form-data", description = "Changed fields and new documents"),
    responses(
        (status = 200, description = "Internship updated", body = InternshipResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Profile or internship not found (NOT_FOUND)", body = ErrorBody),
        (status = 500, description = "Nothing saved (UPSTREAM_UNAVAILABLE) or files orphaned (PARTIALLY_COMMITTED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(email = %auth_user.email))]
pub async fn update_my_internship(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(internship_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<InternshipResponse>, AppError> {
    auth_user.require_role(&[Role::Student])?;

    let form = stage_form(&mut multipart, &state.config.upload).await?;
    let submission = state
        .workflow
        .update_existing(&auth_user.email, &internship_id, form)
        .await?;
    Ok(Json(submission.into()))
}
