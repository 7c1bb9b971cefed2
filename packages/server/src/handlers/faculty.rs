use axum::{Json, extract::State};
use common::Role;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::internship::StudentDetailsResponse;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/all-internships",
    tag = "Faculty",
    operation_id = "listAllInternships",
    summary = "List every student with their internships",
    description = "Sorted by register number. Requires the `faculty` or `admin` role.",
    responses(
        (status = 200, description = "All student profiles", body = StudentDetailsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Forbidden (TOKEN_INVALID, PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(email = %auth_user.email))]
pub async fn list_all_internships(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<StudentDetailsResponse>, AppError> {
    auth_user.require_role(&[Role::Faculty, Role::Admin])?;

    let student_details = state.workflow.list_all().await?;
    Ok(Json(StudentDetailsResponse {
        success: true,
        student_details,
    }))
}
