use axum::{extract::State, Json};

use models::portfolio;
use service::portfolio::PortfolioInput;

use crate::errors::ApiError;
use crate::extract::ApiJson;
use crate::state::ContentState;

#[utoipa::path(get, path = "/api/v1/portfolio", tag = "portfolio",
    responses((status = 200, description = "Portfolio profile"), (status = 404, description = "Not created yet")))]
pub async fn get(State(state): State<ContentState>) -> Result<Json<portfolio::Model>, ApiError> {
    Ok(Json(state.portfolio.get().await?))
}

#[utoipa::path(put, path = "/api/v1/admin/portfolio", tag = "admin", request_body = crate::openapi::PortfolioDoc,
    responses((status = 200, description = "Created or updated"), (status = 400, description = "Validation failed")))]
pub async fn upsert(
    State(state): State<ContentState>,
    ApiJson(input): ApiJson<PortfolioInput>,
) -> Result<Json<portfolio::Model>, ApiError> {
    Ok(Json(state.portfolio.upsert(input).await?))
}
