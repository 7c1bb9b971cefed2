use axum::{
    body::Body,
    extract::{Path, State},
    http::{StatusCode, header},
    response::Response,
};
use common::Role;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::state::AppState;

fn file_not_found() -> AppError {
    AppError::NotFound("File not found".into())
}

/// Build a safe `Content-Disposition` header value.
fn content_disposition_value(filename: &str) -> String {
    let ascii_name: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    if ascii_name.is_empty() {
        "inline; filename=\"document\"".to_string()
    } else {
        format!("inline; filename=\"{ascii_name}\"")
    }
}

#[utoipa::path(
    get,
    path = "/files/{folder}/{name}",
    tag = "Files",
    operation_id = "downloadFile",
    summary = "Download a document held by the local file store",
    description = "Only served when the `local` storage backend is configured. \
        Students may only read their own folder; faculty and admins may read any.",
    params(
        ("folder" = String, Path, description = "Student register number"),
        ("name" = String, Path, description = "Stored file name"),
    ),
    responses(
        (status = 200, description = "File content"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(email = %auth_user.email))]
pub async fn download_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((folder, name)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let store = state.local_files.as_ref().ok_or_else(file_not_found)?;

    if auth_user.role == Role::Student {
        let own = state
            .store
            .find_profile(&auth_user.email)
            .await?
            .is_some_and(|p| p.register_number == folder);
        if !own {
            return Err(AppError::PermissionDenied);
        }
    }

    let path = store
        .file_path(&folder, &name)
        .map_err(|_| file_not_found())?;
    let file = tokio::fs::File::open(&path)
        .await
        .map_err(|_| file_not_found())?;
    let size = file
        .metadata()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to stat {}: {e}", path.display())))?
        .len();
    let content_type = mime_guess::from_path(&name).first_or_octet_stream();

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_LENGTH, size.to_string())
        .header(header::CONTENT_DISPOSITION, content_disposition_value(&name))
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}
