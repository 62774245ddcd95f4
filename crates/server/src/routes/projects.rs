use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use uuid::Uuid;

use common::types::MessageResponse;
use models::project;
use service::pagination::{Page, Pagination};
use service::project::domain::{CreateProjectInput, ProjectFilter, UpdateProjectInput};

use crate::errors::ApiError;
use crate::extract::{ApiJson, ApiPath, ApiQuery};
use crate::state::ContentState;

#[derive(Debug, Default, Deserialize)]
pub struct ProjectListQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub featured: Option<bool>,
}

#[utoipa::path(get, path = "/api/v1/projects", tag = "projects",
    params(("page" = Option<i64>, Query,), ("limit" = Option<i64>, Query,), ("featured" = Option<bool>, Query, description = "Filter applied only when present")),
    responses((status = 200, description = "Projects, newest first")))]
pub async fn list(
    State(state): State<ContentState>,
    ApiQuery(q): ApiQuery<ProjectListQuery>,
) -> Result<Json<Page<project::Model>>, ApiError> {
    let p = Pagination::from_query(q.page.as_deref(), q.limit.as_deref());
    Ok(Json(state.projects.list(ProjectFilter { featured: q.featured }, p).await?))
}

#[utoipa::path(get, path = "/api/v1/projects/{id}", tag = "projects", params(("id" = Uuid, Path,)),
    responses((status = 200, description = "Project"), (status = 404, description = "Not found")))]
pub async fn get(
    State(state): State<ContentState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<project::Model>, ApiError> {
    Ok(Json(state.projects.get(id).await?))
}

#[utoipa::path(post, path = "/api/v1/admin/projects", tag = "admin", request_body = crate::openapi::CreateProjectDoc,
    responses((status = 201, description = "Created"), (status = 400, description = "Validation failed"), (status = 401, description = "Admin role required")))]
pub async fn create(
    State(state): State<ContentState>,
    ApiJson(input): ApiJson<CreateProjectInput>,
) -> Result<(StatusCode, Json<project::Model>), ApiError> {
    Ok((StatusCode::CREATED, Json(state.projects.create(input).await?)))
}

#[utoipa::path(put, path = "/api/v1/admin/projects/{id}", tag = "admin", params(("id" = Uuid, Path,)), request_body = crate::openapi::UpdateProjectDoc,
    responses((status = 200, description = "Updated"), (status = 404, description = "Not found")))]
pub async fn update(
    State(state): State<ContentState>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(input): ApiJson<UpdateProjectInput>,
) -> Result<Json<project::Model>, ApiError> {
    Ok(Json(state.projects.update(id, input).await?))
}

#[utoipa::path(delete, path = "/api/v1/admin/projects/{id}", tag = "admin", params(("id" = Uuid, Path,)),
    responses((status = 200, description = "Deleted"), (status = 404, description = "Not found")))]
pub async fn delete(
    State(state): State<ContentState>,
    ApiPath(id): ApiPath<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    state.projects.delete(id).await?;
    Ok(Json(MessageResponse::new("Project deleted successfully")))
}
