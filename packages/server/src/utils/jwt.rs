use common::Role;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Identity carried by a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

/// JWT Claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Credential ID
    pub name: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64, // Expiration timestamp
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            id: claims.sub,
            name: claims.name,
            email: claims.email,
            role: claims.role,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("token rejected: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
    #[error("token expired")]
    Expired,
}

/// Sign a token for `identity`, valid for `ttl_secs` from `issued_at`.
pub fn sign(
    identity: &Identity,
    issued_at: i64,
    ttl_secs: u64,
    secret: &str,
) -> Result<String, jsonwebtoken::errors::Error> {
    let ttl = i64::try_from(ttl_secs).unwrap_or(i64::MAX);
    let claims = Claims {
        sub: identity.id.clone(),
        name: identity.name.clone(),
        email: identity.email.clone(),
        role: identity.role,
        iat: issued_at,
        exp: issued_at.saturating_add(ttl),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

/// Verify the signature and check `now < exp`.
///
/// Expiry is checked here rather than by the library so the result depends
/// only on the arguments.
pub fn verify(token: &str, now: i64, secret: &str) -> Result<Claims, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )?;

    if now >= token_data.claims.exp {
        return Err(TokenError::Expired);
    }
    Ok(token_data.claims)
}
