use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::{info, instrument};
use uuid::Uuid;

use models::portfolio::{self, validate_json_object, validate_name};

use super::repository::PortfolioRepository;
use crate::errors::ServiceError;

/// Full replacement body for `PUT /portfolio`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub social_links: Option<Json>,
    #[serde(default)]
    pub settings: Option<Json>,
}

pub struct PortfolioService {
    repo: Arc<dyn PortfolioRepository>,
}

impl PortfolioService {
    pub fn new(repo: Arc<dyn PortfolioRepository>) -> Self { Self { repo } }

    pub async fn get(&self) -> Result<portfolio::Model, ServiceError> {
        self.repo.get().await?.ok_or_else(|| ServiceError::not_found("portfolio"))
    }

    /// Create the profile if absent, otherwise overwrite it in place.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn upsert(&self, input: PortfolioInput) -> Result<portfolio::Model, ServiceError> {
        validate_name(&input.name)?;
        validate_json_object("social_links", &input.social_links)?;
        validate_json_object("settings", &input.settings)?;

        let now = Utc::now().fixed_offset();
        let existing = self.repo.get().await?;
        let model = portfolio::Model {
            id: existing.as_ref().map(|p| p.id).unwrap_or_else(Uuid::new_v4),
            name: input.name.trim().to_string(),
            title: input.title,
            bio: input.bio,
            email: input.email,
            social_links: input.social_links.filter(|v| !v.is_null()),
            settings: input.settings.filter(|v| !v.is_null()),
            updated_at: now,
        };
        let saved = match existing {
            Some(_) => self.repo.update(model).await?,
            None => self.repo.insert(model).await?,
        };
        info!(portfolio_id = %saved.id, "portfolio_saved");
        Ok(saved)
    }
}
