use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post, put},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::Health;

use crate::middleware::{require_admin, track_requests};
use crate::openapi::{AuthApiDoc, ContentApiDoc};
use crate::state::{AuthState, ContentState};

pub mod articles;
pub mod auth;
pub mod portfolio;
pub mod projects;

pub const AUTH_SERVICE: &str = "auth";
pub const CONTENT_SERVICE: &str = "content";

#[utoipa::path(get, path = "/healthz", tag = "health", responses((status = 200, description = "OK", body = crate::openapi::HealthResponse)))]
pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

async fn metrics() -> impl IntoResponse {
    common::metrics::encode_metrics()
}

/// Auth service: `/api/v1/auth/*` plus health, metrics and docs.
pub fn build_auth_router(state: AuthState) -> Router {
    let api = Router::new()
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/verify", post(auth::verify))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api-docs/openapi.json", get(|| async { Json(AuthApiDoc::openapi()) }))
        .with_state(state);
    with_common_layers(api, AUTH_SERVICE)
}

/// Content service: public reads under `/api/v1`, admin-gated writes under `/api/v1/admin`.
pub fn build_content_router(state: ContentState) -> Router {
    let public = Router::new()
        .route("/api/v1/articles", get(articles::list))
        .route("/api/v1/articles/:id", get(articles::get))
        .route("/api/v1/articles/slug/:slug", get(articles::get_by_slug))
        .route("/api/v1/projects", get(projects::list))
        .route("/api/v1/projects/:id", get(projects::get))
        .route("/api/v1/portfolio", get(portfolio::get));

    let admin = Router::new()
        .route("/api/v1/admin/articles", post(articles::create))
        .route("/api/v1/admin/articles/:id", put(articles::update).delete(articles::delete))
        .route("/api/v1/admin/projects", post(projects::create))
        .route("/api/v1/admin/projects/:id", put(projects::update).delete(projects::delete))
        .route("/api/v1/admin/portfolio", put(portfolio::upsert))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    let app = public
        .merge(admin)
        .route("/api-docs/openapi.json", get(|| async { Json(ContentApiDoc::openapi()) }))
        .with_state(state);
    with_common_layers(app, CONTENT_SERVICE)
}

fn with_common_layers(router: Router, service: &'static str) -> Router {
    router
        .route("/healthz", get(health))
        .route("/metrics", get(metrics))
        .layer(middleware::from_fn_with_state(service, track_requests))
        .layer(CorsLayer::very_permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx responses are logged at ERROR
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
