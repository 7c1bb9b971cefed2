use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::CookieJar;
use common::Role;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::jwt::{self, Identity};

/// Cookie that carries the token for browser sessions.
pub const TOKEN_COOKIE: &str = "access_token";

/// Authenticated caller, decoded from `Authorization: Bearer <token>` or the
/// `access_token` cookie.
///
/// Missing token is `TOKEN_MISSING` (401); a token that fails signature or
/// expiry checks is `TOKEN_INVALID` (403). Role checks happen via
/// `require_role()` in the handler body, before any request body is read.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AuthUser {
    /// Returns `Ok(())` if the caller's role is in `allowed`, `Err(PermissionDenied)` otherwise.
    pub fn require_role(&self, allowed: &[Role]) -> Result<(), AppError> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(AppError::PermissionDenied)
        }
    }
}

impl From<Identity> for AuthUser {
    fn from(identity: Identity) -> Self {
        Self {
            id: identity.id,
            name: identity.name,
            email: identity.email,
            role: identity.role,
        }
    }
}

/// Pull the raw token out of the request, header first.
fn token_from_parts(parts: &Parts) -> Result<String, AppError> {
    if let Some(value) = parts.headers.get("Authorization") {
        let value = value.to_str().map_err(|_| AppError::TokenInvalid)?;
        let token = value
            .strip_prefix("Bearer ")
            .ok_or(AppError::TokenInvalid)?
            .trim();
        if token.is_empty() {
            return Err(AppError::TokenMissing);
        }
        return Ok(token.to_string());
    }

    let jar = CookieJar::from_headers(&parts.headers);
    match jar.get(TOKEN_COOKIE) {
        Some(cookie) if !cookie.value().is_empty() => Ok(cookie.value().to_string()),
        _ => Err(AppError::TokenMissing),
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)?;

        let now = chrono::Utc::now().timestamp();
        let claims = jwt::verify(&token, now, &state.config.auth.jwt_secret).map_err(|e| {
            tracing::debug!("Token rejected: {e}");
            AppError::TokenInvalid
        })?;

        Ok(Identity::from(claims).into())
    }
}
