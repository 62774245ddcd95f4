use axum::{extract::State, http::{HeaderMap, StatusCode}, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use common::types::MessageResponse;
use service::auth::domain::{AuthSession, AuthUser, LoginInput, RefreshedToken, RegisterInput, VerifiedToken};

use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::middleware::bearer_token;
use crate::state::AuthState;

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: AuthUser,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub token: String,
}

#[utoipa::path(post, path = "/api/v1/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequestDoc,
    responses((status = 201, description = "Registered"), (status = 400, description = "Validation failed or user already exists")))]
pub async fn register(
    State(state): State<AuthState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(RegisterResponse { user, message: "User registered successfully".into() })))
}

#[utoipa::path(post, path = "/api/v1/auth/login", tag = "auth", request_body = crate::openapi::LoginRequestDoc,
    responses((status = 200, description = "Token pair issued", body = crate::openapi::LoginResponseDoc), (status = 401, description = "Invalid credentials")))]
pub async fn login(
    State(state): State<AuthState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> Result<Json<AuthSession>, ApiError> {
    Ok(Json(state.auth.login(input).await?))
}

#[utoipa::path(post, path = "/api/v1/auth/refresh", tag = "auth", request_body = crate::openapi::RefreshRequestDoc,
    responses((status = 200, description = "New access token"), (status = 401, description = "Invalid refresh token")))]
pub async fn refresh(
    State(state): State<AuthState>,
    ApiJson(input): ApiJson<RefreshRequest>,
) -> Result<Json<RefreshedToken>, ApiError> {
    Ok(Json(state.auth.refresh(&input.refresh_token).await?))
}

/// Token comes from the `Authorization` header, or from a `{"token"}` body when the header is absent.
#[utoipa::path(post, path = "/api/v1/auth/verify", tag = "auth", request_body = crate::openapi::VerifyRequestDoc,
    responses((status = 200, description = "Token is valid", body = crate::openapi::VerifyResponseDoc), (status = 401, description = "Missing or invalid token")))]
pub async fn verify(
    State(state): State<AuthState>,
    headers: HeaderMap,
    body: Option<Json<VerifyRequest>>,
) -> Result<Json<VerifiedToken>, ApiError> {
    let token = match bearer_token(&headers)? {
        Some(t) => t.to_string(),
        None => body
            .map(|Json(b)| b.token)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("token required".into()))?,
    };
    Ok(Json(state.auth.verify(&token)?))
}

#[utoipa::path(post, path = "/api/v1/auth/logout", tag = "auth", responses((status = 200, description = "Logged out")))]
pub async fn logout() -> Json<MessageResponse> {
    info!("logout");
    Json(MessageResponse::new("Logged out successfully"))
}
