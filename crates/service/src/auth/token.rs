//! HS256 access/refresh token issuance and verification.

use std::fmt;

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::AuthError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    Access,
    Refresh,
}

/// Claims carried by both token kinds. Refresh tokens have no role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "type")]
    pub token_type: TokenType,
    pub iat: i64,
    pub exp: i64,
    pub sub: String,
}

impl Claims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0).single().unwrap_or_else(Utc::now)
    }
}

#[derive(Clone)]
pub struct TokenManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl fmt::Debug for TokenManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenManager")
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .field("encoding_key", &"[hidden]")
            .field("decoding_key", &"[hidden]")
            .finish()
    }
}

impl TokenManager {
    pub fn new(secret: &str, access_ttl: Duration, refresh_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(cfg: &configs::JwtConfig) -> Result<Self, AuthError> {
        let access = Duration::try_minutes(cfg.access_expiry_minutes)
            .filter(|d| *d > Duration::zero())
            .ok_or_else(|| AuthError::TokenError(format!("access expiry out of range: {} minutes", cfg.access_expiry_minutes)))?;
        let refresh = Duration::try_hours(cfg.refresh_expiry_hours)
            .filter(|d| *d > Duration::zero())
            .ok_or_else(|| AuthError::TokenError(format!("refresh expiry out of range: {} hours", cfg.refresh_expiry_hours)))?;
        Ok(Self::new(&cfg.secret, access, refresh))
    }

    /// Access token lifetime in seconds, reported as `expires_in`.
    pub fn access_ttl_secs(&self) -> i64 { self.access_ttl.num_seconds() }

    pub fn issue_access(&self, user_id: Uuid, role: &str) -> Result<String, AuthError> {
        self.issue(user_id, Some(role.to_string()), TokenType::Access, self.access_ttl)
    }

    pub fn issue_refresh(&self, user_id: Uuid) -> Result<String, AuthError> {
        self.issue(user_id, None, TokenType::Refresh, self.refresh_ttl)
    }

    fn issue(&self, user_id: Uuid, role: Option<String>, token_type: TokenType, ttl: Duration) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            role,
            token_type,
            iat: now.timestamp(),
            exp: now
                .checked_add_signed(ttl)
                .ok_or_else(|| AuthError::TokenError("token expiry overflows".into()))?
                .timestamp(),
            sub: user_id.to_string(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::TokenError(e.to_string()))
    }

    /// Check signature and expiry; returns the embedded claims.
    pub fn decode(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::InvalidToken("token expired".into()),
                _ => AuthError::InvalidToken("malformed or unsigned token".into()),
            })
    }

    /// Decode and require a specific token type.
    pub fn decode_as(&self, token: &str, expected: TokenType) -> Result<Claims, AuthError> {
        let claims = self.decode(token)?;
        if claims.token_type != expected {
            return Err(AuthError::InvalidToken("wrong token type".into()));
        }
        Ok(claims)
    }
}
