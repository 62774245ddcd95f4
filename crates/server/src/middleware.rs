use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::{error, warn};
use uuid::Uuid;

use models::user::ROLE_ADMIN;

use crate::auth_client::VerifyError;
use crate::errors::ApiError;
use crate::state::ContentState;

/// Identity attached to admin requests after the gate passes.
#[derive(Debug, Clone)]
pub struct AdminIdentity {
    pub user_id: Uuid,
    pub role: String,
}

/// Pull the token out of `Authorization: Bearer <token>`.
/// `Ok(None)` when the header is absent; `Err` when present but malformed.
pub fn bearer_token(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    let Some(value) = headers.get(AUTHORIZATION) else { return Ok(None) };
    let value = value
        .to_str()
        .map_err(|_| ApiError::Unauthorized("invalid authorization header format".into()))?;
    match value.split_once(' ') {
        Some(("Bearer", token)) if !token.trim().is_empty() => Ok(Some(token.trim())),
        _ => Err(ApiError::Unauthorized("invalid authorization header format".into())),
    }
}

/// Admin gate: verify the bearer token with the auth service and require role `admin`.
pub async fn require_admin(
    State(state): State<ContentState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();
    let token = bearer_token(req.headers())?
        .ok_or_else(|| ApiError::Unauthorized("authorization header required".into()))?
        .to_string();

    let verified = match state.verifier.verify(&token).await {
        Ok(v) => v,
        Err(VerifyError::Rejected) => {
            warn!(path = %path, "admin token rejected");
            return Err(ApiError::Unauthorized("invalid token".into()));
        }
        Err(e @ VerifyError::Unavailable(_)) => {
            error!(path = %path, error = %e, "token verification failed");
            return Err(ApiError::Unauthorized("invalid token".into()));
        }
    };

    let role = verified.role.unwrap_or_default();
    if role != ROLE_ADMIN {
        warn!(path = %path, user_id = %verified.user_id, role = %role, "admin role required");
        return Err(ApiError::Unauthorized("admin role required".into()));
    }

    req.extensions_mut().insert(AdminIdentity { user_id: verified.user_id, role });
    Ok(next.run(req).await)
}

/// Count responses per service and status class.
pub async fn track_requests(State(service): State<&'static str>, req: Request, next: Next) -> Response {
    let resp = next.run(req).await;
    common::metrics::record_http(service, resp.status().as_u16());
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_parsing() {
        let mut h = HeaderMap::new();
        assert!(matches!(bearer_token(&h), Ok(None)));
        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def"));
        assert_eq!(bearer_token(&h).unwrap(), Some("abc.def"));
        h.insert(AUTHORIZATION, HeaderValue::from_static("Basic xyz"));
        assert!(bearer_token(&h).is_err());
        h.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert!(bearer_token(&h).is_err());
    }
}
