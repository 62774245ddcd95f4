//! Token verification used by the content service's admin gate.
//!
//! In deployment the content service asks the auth service (`POST /api/v1/auth/verify`);
//! `LocalTokenVerifier` checks the signature in-process with the shared secret.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::warn;

use service::auth::domain::VerifiedToken;
use service::auth::TokenManager;

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The token was checked and refused.
    #[error("invalid token")]
    Rejected,
    /// The verifier could not be reached or answered unexpectedly.
    #[error("token verification unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedToken, VerifyError>;
}

pub struct HttpTokenVerifier {
    client: reqwest::Client,
    verify_url: String,
}

impl HttpTokenVerifier {
    pub fn new(service_url: &str, timeout: Duration) -> Result<Self, VerifyError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?;
        Ok(Self { client, verify_url: format!("{}/api/v1/auth/verify", service_url.trim_end_matches('/')) })
    }

    pub fn from_config(cfg: &configs::AuthClientConfig) -> Result<Self, VerifyError> {
        Self::new(&cfg.service_url, Duration::from_secs(cfg.timeout_secs))
    }
}

#[async_trait]
impl TokenVerifier for HttpTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedToken, VerifyError> {
        let resp = self
            .client
            .post(&self.verify_url)
            .json(&serde_json::json!({ "token": token }))
            .send()
            .await
            .map_err(|e| VerifyError::Unavailable(e.to_string()))?;
        match resp.status() {
            StatusCode::OK => {
                let verified: VerifiedToken = resp.json().await.map_err(|e| VerifyError::Unavailable(e.to_string()))?;
                if verified.valid { Ok(verified) } else { Err(VerifyError::Rejected) }
            }
            StatusCode::UNAUTHORIZED | StatusCode::BAD_REQUEST => Err(VerifyError::Rejected),
            other => {
                warn!(status = %other, "auth service returned unexpected status");
                Err(VerifyError::Unavailable(format!("auth service status {other}")))
            }
        }
    }
}

/// Verifies access tokens in-process with the shared signing secret.
pub struct LocalTokenVerifier {
    tokens: TokenManager,
}

impl LocalTokenVerifier {
    pub fn new(tokens: TokenManager) -> Self { Self { tokens } }
}

#[async_trait]
impl TokenVerifier for LocalTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedToken, VerifyError> {
        let claims = self
            .tokens
            .decode_as(token, service::auth::TokenType::Access)
            .map_err(|_| VerifyError::Rejected)?;
        Ok(VerifiedToken {
            valid: true,
            user_id: claims.user_id,
            role: claims.role.clone(),
            expires_at: claims.expires_at(),
        })
    }
}
