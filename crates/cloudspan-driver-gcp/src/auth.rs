//! Service-account authentication
//!
//! The service-account key JSON travels in `client_secret`. It is turned into
//! a signed RS256 assertion and exchanged for an access token at the key's
//! `token_uri` (OAuth2 JWT bearer grant).

use crate::error::{GcpError, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::{Deserialize, Serialize};

/// Scope requested for every token
pub const COMPUTE_SCOPE: &str = "https://www.googleapis.com/auth/compute";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Fields of a service-account key file
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub token_uri: Option<String>,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"***")
            .field("project_id", &self.project_id)
            .finish()
    }
}

impl ServiceAccountKey {
    pub fn from_json(json: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(json)
            .map_err(|e| GcpError::InvalidServiceAccount(e.to_string()))?;
        if key.client_email.is_empty() || key.private_key.is_empty() {
            return Err(GcpError::InvalidServiceAccount(
                "client_email and private_key are required".to_string(),
            ));
        }
        Ok(key)
    }

    pub fn token_uri(&self) -> &str {
        self.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

/// Sign the assertion presented to the token endpoint
pub fn sign_assertion(key: &ServiceAccountKey, now: DateTime<Utc>) -> Result<String> {
    let claims = Claims {
        iss: key.client_email.clone(),
        scope: COMPUTE_SCOPE.to_string(),
        aud: key.token_uri().to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ASSERTION_LIFETIME_SECS)).timestamp(),
    };

    let mut header = Header::new(Algorithm::RS256);
    header.kid = key.private_key_id.clone();
    let signing_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())?;
    Ok(encode(&header, &claims, &signing_key)?)
}

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    grant_type: &'a str,
    assertion: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct TokenError {
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchange a signed assertion for an access token
pub async fn exchange_token(http: &reqwest::Client, key: &ServiceAccountKey) -> Result<String> {
    let assertion = sign_assertion(key, Utc::now())?;
    tracing::debug!("Requesting access token for {}", key.client_email);

    let response = http
        .post(key.token_uri())
        .form(&TokenRequest {
            grant_type: JWT_BEARER_GRANT,
            assertion: &assertion,
        })
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body: TokenError = response.json().await.unwrap_or_default();
        let message = body
            .error_description
            .or(body.error)
            .unwrap_or_else(|| status.to_string());
        return Err(GcpError::Unauthorized(message));
    }

    let body: TokenResponse = response.json().await?;
    body.access_token
        .filter(|t| !t.is_empty())
        .ok_or_else(|| GcpError::Unauthorized("token endpoint returned no access_token".into()))
}
