use async_trait::async_trait;
use axum::http::{HeaderMap, header::AUTHORIZATION};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;
use crate::utils::CONFIG;

/// A verified identity derived from a bearer credential.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub email: String,
    pub uid: String,
    #[serde(default)]
    pub email_verified: bool,
}

#[derive(Debug, Clone, Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredential,

    #[error("Malformed authorization header")]
    MalformedCredential,

    #[error("Token expired, please sign in again")]
    Expired,

    #[error("Invalid credentials")]
    Invalid,

    #[error("identity issuer error: {0}")]
    Issuer(String),
}

/// Extracts the token from an `Authorization: Bearer <token>` header.
/// Anything less well-formed fails before any issuer I/O happens.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingCredential)?
        .to_str()
        .map_err(|_| AuthError::MalformedCredential)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedCredential)?;

    if token.is_empty() {
        return Err(AuthError::MalformedCredential);
    }
    Ok(token)
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError>;
}

/// Checks tokens against the external identity issuer. Stateless; every
/// request goes to the issuer, nothing is cached across requests.
pub struct IssuerClient {
    http: reqwest::Client,
    verify_url: String,
}

#[derive(Deserialize)]
struct IssuerRejection {
    #[serde(default)]
    error: String,
}

impl IssuerClient {
    pub fn new(verify_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            verify_url,
        }
    }

    pub fn from_env() -> Self {
        if CONFIG.issuer_verify_url.is_empty() {
            warn!("ISSUER_VERIFY_URL not set - authenticated routes will reject all requests");
        }
        Self::new(CONFIG.issuer_verify_url.clone())
    }
}

#[async_trait]
impl TokenVerifier for IssuerClient {
    async fn verify(&self, token: &str) -> Result<Principal, AuthError> {
        let response = self
            .http
            .post(&self.verify_url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|err| AuthError::Issuer(format!("issuer unreachable: {err}")))?;

        let status = response.status();

        if status.is_success() {
            return response
                .json::<Principal>()
                .await
                .map_err(|err| AuthError::Issuer(format!("malformed issuer response: {err}")));
        }

        if status.is_server_error() {
            return Err(AuthError::Issuer(format!("issuer returned {status}")));
        }

        let rejection = response
            .json::<IssuerRejection>()
            .await
            .unwrap_or(IssuerRejection {
                error: String::new(),
            });

        if rejection.error.to_ascii_lowercase().contains("expired") {
            warn!("Rejected expired credential");
            return Err(AuthError::Expired);
        }
        Err(AuthError::Invalid)
    }
}

/// Authenticates a request: header parsing first, then the issuer check.
/// Called explicitly at the top of every protected handler.
pub async fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<Principal, ApiError> {
    let token = bearer_token(headers)?;
    let principal = state.verifier.verify(token).await?;
    Ok(principal)
}
