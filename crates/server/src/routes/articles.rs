use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::Deserialize;
use uuid::Uuid;

use common::types::MessageResponse;
use models::article;
use service::article::domain::{ArticleSummary, CreateArticleInput, UpdateArticleInput};
use service::pagination::{Page, Pagination};

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::middleware::AdminIdentity;
use crate::state::ContentState;

/// `page`/`limit` query, kept as raw strings: malformed or out-of-range values are clamped, not rejected.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::from_query(self.page.as_deref(), self.limit.as_deref())
    }
}

#[utoipa::path(get, path = "/api/v1/articles", tag = "articles",
    params(("page" = Option<i64>, Query, description = "1-based page"), ("limit" = Option<i64>, Query, description = "1..=100")),
    responses((status = 200, description = "Published articles, newest first")))]
pub async fn list(
    State(state): State<ContentState>,
    ApiQuery(q): ApiQuery<ListQuery>,
) -> Result<Json<Page<ArticleSummary>>, ApiError> {
    Ok(Json(state.articles.list_published(q.pagination()).await?))
}

#[utoipa::path(get, path = "/api/v1/articles/{id}", tag = "articles", params(("id" = Uuid, Path,)),
    responses((status = 200, description = "Article"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<ContentState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<article::Model>, ApiError> {
    Ok(Json(state.articles.get(id).await?))
}

#[utoipa::path(get, path = "/api/v1/articles/slug/{slug}", tag = "articles", params(("slug" = String, Path,)),
    responses((status = 200, description = "Published article"), (status = 404, description = "Not found")))]
pub async fn get_by_slug(
    State(state): State<ContentState>,
    ApiPath(slug): ApiPath<String>,
) -> Result<Json<article::Model>, ApiError> {
    Ok(Json(state.articles.get_by_slug(&slug).await?))
}

#[utoipa::path(post, path = "/api/v1/admin/articles", tag = "admin", request_body = crate::openapi::CreateArticleDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 401, description = "Admin role required")))]
pub async fn create(
    State(state): State<ContentState>,
    Extension(admin): Extension<AdminIdentity>,
    ApiJson(input): ApiJson<CreateArticleInput>,
) -> Result<(StatusCode, Json<article::Model>), ApiError> {
    let created = state.articles.create(admin.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(put, path = "/api/v1/admin/articles/{id}", tag = "admin", params(("id" = Uuid, Path,)), request_body = crate::openapi::UpdateArticleDoc,
    responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<ContentState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateArticleInput>,
) -> Result<Json<article::Model>, ApiError> {
    Ok(Json(state.articles.update(id, input).await?))
}

#[utoipa::path(delete, path = "/api/v1/admin/articles/{id}", tag = "admin", params(("id" = Uuid, Path,)),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(
    State(state): State<ContentState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.articles.delete(id).await?;
    Ok(Json(MessageResponse::new("Article deleted successfully")))
}
