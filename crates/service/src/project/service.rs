use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use models::project::{self, normalize_technologies, validate_name, validate_url};

use super::domain::{CreateProjectInput, ProjectFilter, UpdateProjectInput};
use super::repository::ProjectRepository;
use crate::article::service::DEFAULT_DETAIL_TTL;
use crate::cache::{self, ContentCache, PROJECTS_PATTERN};
use crate::errors::ServiceError;
use crate::events::{self, DeletedRef, EventBus};
use crate::pagination::{Page, Pagination};

pub struct ProjectService {
    repo: Arc<dyn ProjectRepository>,
    cache: Arc<dyn ContentCache>,
    events: EventBus,
    detail_ttl: Duration,
}

impl ProjectService {
    pub fn new(repo: Arc<dyn ProjectRepository>, cache: Arc<dyn ContentCache>, events: EventBus) -> Self {
        Self { repo, cache, events, detail_ttl: DEFAULT_DETAIL_TTL }
    }

    pub fn with_detail_ttl(mut self, ttl: Duration) -> Self {
        self.detail_ttl = ttl;
        self
    }

    pub async fn list(&self, filter: ProjectFilter, p: Pagination) -> Result<Page<project::Model>, ServiceError> {
        let p = p.normalize();
        let key = cache::project_list_key(p.page, p.limit, filter.featured);
        if let Some(page) = cache::get_json::<Page<project::Model>>(self.cache.as_ref(), &key).await {
            return Ok(page);
        }
        let (rows, total) = self.repo.list(filter, p).await?;
        let page = Page::new(rows, p, total);
        cache::set_json(self.cache.as_ref(), &key, &page, self.detail_ttl).await;
        Ok(page)
    }

    pub async fn get(&self, id: Uuid) -> Result<project::Model, ServiceError> {
        let key = cache::project_detail_key(id);
        if let Some(p) = cache::get_json::<project::Model>(self.cache.as_ref(), &key).await {
            return Ok(p);
        }
        let p = self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("project"))?;
        cache::set_json(self.cache.as_ref(), &key, &p, self.detail_ttl).await;
        Ok(p)
    }

    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create(&self, input: CreateProjectInput) -> Result<project::Model, ServiceError> {
        validate_name(&input.name)?;
        validate_url("github_url", &input.github_url)?;
        validate_url("live_url", &input.live_url)?;

        let now = Utc::now().fixed_offset();
        let created = self.repo.insert(project::Model {
            id: Uuid::new_v4(),
            name: input.name.trim().to_string(),
            description: input.description,
            github_url: input.github_url,
            live_url: input.live_url,
            technologies: normalize_technologies(input.technologies),
            featured: input.featured,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }).await?;

        info!(project_id = %created.id, "project_created");
        self.events.emit(events::TOPIC_PROJECTS, events::PROJECT_CREATED, &created).await;
        cache::invalidate(self.cache.as_ref(), &[], &[PROJECTS_PATTERN]).await;
        Ok(created)
    }

    #[instrument(skip(self, input), fields(project_id = %id))]
    pub async fn update(&self, id: Uuid, input: UpdateProjectInput) -> Result<project::Model, ServiceError> {
        let mut p = self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("project"))?;

        if let Some(name) = input.name {
            validate_name(&name)?;
            p.name = name.trim().to_string();
        }
        if let Some(description) = input.description {
            p.description = description;
        }
        if let Some(url) = input.github_url {
            validate_url("github_url", &url)?;
            p.github_url = url;
        }
        if let Some(url) = input.live_url {
            validate_url("live_url", &url)?;
            p.live_url = url;
        }
        if let Some(tags) = input.technologies {
            p.technologies = normalize_technologies(tags);
        }
        if let Some(featured) = input.featured {
            p.featured = featured;
        }
        p.updated_at = Utc::now().fixed_offset();

        let updated = self.repo.update(p).await?;
        info!(project_id = %updated.id, "project_updated");
        self.events.emit(events::TOPIC_PROJECTS, events::PROJECT_UPDATED, &updated).await;
        cache::invalidate(self.cache.as_ref(), &[cache::project_detail_key(id)], &[PROJECTS_PATTERN]).await;
        Ok(updated)
    }

    #[instrument(skip(self), fields(project_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.repo.soft_delete(id, Utc::now().fixed_offset()).await? {
            return Err(ServiceError::not_found("project"));
        }
        info!(project_id = %id, "project_deleted");
        self.events.emit(events::TOPIC_PROJECTS, events::PROJECT_DELETED, &DeletedRef { id }).await;
        cache::invalidate(self.cache.as_ref(), &[cache::project_detail_key(id)], &[PROJECTS_PATTERN]).await;
        Ok(())
    }
}
