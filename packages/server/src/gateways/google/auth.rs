use std::path::Path;
use std::time::{Duration, Instant};

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

use super::{GoogleApiError, check};

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Refresh this long before Google's stated expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Fields of a service-account JSON key that matter here.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub token_uri: Option<String>,
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: String,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

struct CachedToken {
    token: String,
    refresh_at: Instant,
}

/// Access tokens for a service account via the JWT bearer grant, cached
/// until shortly before they expire.
pub struct ServiceAccountAuth {
    client_email: String,
    key: EncodingKey,
    token_uri: String,
    scopes: String,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    pub fn new(
        key: ServiceAccountKey,
        token_uri_override: Option<&str>,
        scopes: &[&str],
    ) -> Result<Self, GoogleApiError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| GoogleApiError::InvalidCredentials(format!("private_key: {e}")))?;
        let token_uri = token_uri_override
            .map(str::to_string)
            .or(key.token_uri)
            .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string());
        Ok(Self {
            client_email: key.client_email,
            key: encoding_key,
            token_uri,
            scopes: scopes.join(" "),
            cached: Mutex::new(None),
        })
    }

    pub async fn from_file(
        path: &Path,
        token_uri_override: Option<&str>,
        scopes: &[&str],
    ) -> Result<Self, GoogleApiError> {
        if !tokio::fs::try_exists(path).await? {
            return Err(GoogleApiError::CredentialsNotFound(path.to_path_buf()));
        }
        let raw = tokio::fs::read_to_string(path).await?;
        let key: ServiceAccountKey = serde_json::from_str(&raw).map_err(|e| {
            GoogleApiError::InvalidCredentials(format!("{}: {}", path.display(), e))
        })?;
        Self::new(key, token_uri_override, scopes)
    }

    /// A valid bearer token, fetching a new one if the cached one is stale.
    pub async fn access_token(&self, client: &reqwest::Client) -> Result<String, GoogleApiError> {
        // Held across the fetch so concurrent callers share one token request.
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.token.clone());
        }

        let fresh = self.fetch(client).await?;
        let lifetime = Duration::from_secs(fresh.expires_in).saturating_sub(EXPIRY_MARGIN);
        debug!(expires_in = fresh.expires_in, "Fetched service account token");
        *cached = Some(CachedToken {
            token: fresh.access_token.clone(),
            refresh_at: Instant::now() + lifetime,
        });
        Ok(fresh.access_token)
    }

    fn assertion(&self, now: i64) -> Result<String, GoogleApiError> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: self.scopes.clone(),
            aud: &self.token_uri,
            iat: now,
            exp: now + 3600,
        };
        encode(&Header::new(Algorithm::RS256), &claims, &self.key)
            .map_err(|e| GoogleApiError::TokenFailed(format!("failed to sign assertion: {e}")))
    }

    async fn fetch(&self, client: &reqwest::Client) -> Result<TokenResponse, GoogleApiError> {
        let assertion = self.assertion(chrono::Utc::now().timestamp())?;
        let response = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;
        let response = check(response).await.map_err(|e| match e {
            GoogleApiError::Api { status, message } => {
                GoogleApiError::TokenFailed(format!("{status}: {message}"))
            }
            other => other,
        })?;
        Ok(response.json().await?)
    }
}
