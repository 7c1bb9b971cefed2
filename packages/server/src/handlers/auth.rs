use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use common::Role;
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, TOKEN_COOKIE};
use crate::extractors::json::AppJson;
use crate::models::auth::{
    LoginRequest, LoginResponse, MessageResponse, VerifyResponse, validate_login_request,
};
use crate::state::AppState;
use crate::store::Credential;
use crate::utils::{hash, jwt};

/// Name shown for an account: the student's profile name, otherwise the
/// credential's display name, otherwise the role itself.
async fn display_name(state: &AppState, credential: &Credential) -> Result<String, AppError> {
    if credential.role == Role::Student
        && let Some(profile) = state.store.find_profile(&credential.email).await?
    {
        return Ok(profile.name);
    }
    Ok(credential.display_name.clone().unwrap_or_else(|| {
        match credential.role {
            Role::Student => "Student",
            Role::Faculty => "Faculty",
            Role::Admin => "Admin",
        }
        .to_string()
    }))
}

fn token_cookie(token: String, state: &AppState) -> Cookie<'static> {
    let ttl = i64::try_from(state.config.auth.token_ttl_secs).unwrap_or(i64::MAX);
    Cookie::build((TOKEN_COOKIE, token))
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.auth.cookie_secure)
        .path("/")
        .max_age(time::Duration::seconds(ttl))
        .build()
}

#[utoipa::path(
    post,
    path = "/login",
    tag = "Auth",
    operation_id = "login",
    summary = "Log in with email and password",
    description = "Returns a one-hour access token and also sets it as the httpOnly `access_token` cookie. \
        Wrong email and wrong password are indistinguishable.",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid credentials (INVALID_CREDENTIALS)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, jar, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(payload): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    validate_login_request(&payload)?;

    let email = payload.email.trim();
    let Some(credential) = state.store.find_credential(email).await? else {
        hash::verify_dummy(&payload.password);
        return Err(AppError::InvalidCredentials);
    };

    let is_valid = hash::verify_password(&payload.password, &credential.password_hash)
        .map_err(|e| AppError::Internal(format!("Password verify error: {}", e)))?;
    if !is_valid {
        return Err(AppError::InvalidCredentials);
    }

    let name = display_name(&state, &credential).await?;
    let identity = jwt::Identity {
        id: credential.id,
        name,
        email: credential.email,
        role: credential.role,
    };
    let token = jwt::sign(
        &identity,
        chrono::Utc::now().timestamp(),
        state.config.auth.token_ttl_secs,
        &state.config.auth.jwt_secret,
    )
    .map_err(|e| AppError::Internal(format!("JWT sign error: {}", e)))?;

    tracing::info!(role = %identity.role, "Login succeeded");
    let jar = jar.add(token_cookie(token.clone(), &state));
    Ok((
        jar,
        Json(LoginResponse {
            access_token: token,
            name: identity.name,
            email: identity.email,
            role: identity.role,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    tag = "Auth",
    operation_id = "logout",
    summary = "Clear the session cookie",
    responses((status = 200, description = "Cookie cleared", body = MessageResponse)),
)]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    let jar = jar.remove(Cookie::build(TOKEN_COOKIE).path("/"));
    (
        jar,
        Json(MessageResponse {
            message: "Logged out".into(),
        }),
    )
}

#[utoipa::path(
    get,
    path = "/verify",
    tag = "Auth",
    operation_id = "verifySession",
    summary = "Return the identity carried by the caller's token",
    responses(
        (status = 200, description = "Token accepted", body = VerifyResponse),
        (status = 401, description = "No token (TOKEN_MISSING)", body = ErrorBody),
        (status = 403, description = "Bad or expired token (TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(email = %auth_user.email))]
pub async fn verify(auth_user: AuthUser) -> Json<VerifyResponse> {
    Json(VerifyResponse {
        success: true,
        user: auth_user.into(),
    })
}
