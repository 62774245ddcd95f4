use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use models::article::{self, validate_content, validate_slug, validate_title};

use super::domain::{ArticleSummary, CreateArticleInput, UpdateArticleInput};
use super::repository::ArticleRepository;
use crate::cache::{self, ContentCache, ARTICLES_PATTERN};
use crate::errors::ServiceError;
use crate::events::{self, DeletedRef, EventBus};
use crate::pagination::{Page, Pagination};

pub const DEFAULT_DETAIL_TTL: Duration = Duration::from_secs(600);

/// Application service encapsulating article business rules and write side effects.
pub struct ArticleService {
    repo: Arc<dyn ArticleRepository>,
    cache: Arc<dyn ContentCache>,
    events: EventBus,
    detail_ttl: Duration,
}

impl ArticleService {
    pub fn new(repo: Arc<dyn ArticleRepository>, cache: Arc<dyn ContentCache>, events: EventBus) -> Self {
        Self { repo, cache, events, detail_ttl: DEFAULT_DETAIL_TTL }
    }

    pub fn with_detail_ttl(mut self, ttl: Duration) -> Self {
        self.detail_ttl = ttl;
        self
    }

    /// Published articles, newest first, without bodies.
    pub async fn list_published(&self, p: Pagination) -> Result<Page<ArticleSummary>, ServiceError> {
        let p = p.normalize();
        let key = cache::article_list_key(p.page, p.limit);
        if let Some(page) = cache::get_json::<Page<ArticleSummary>>(self.cache.as_ref(), &key).await {
            return Ok(page);
        }
        let (rows, total) = self.repo.list_published(p).await?;
        let page = Page::new(rows.into_iter().map(ArticleSummary::from).collect(), p, total);
        cache::set_json(self.cache.as_ref(), &key, &page, self.detail_ttl).await;
        Ok(page)
    }

    /// Read-through lookup on `article:detail:{id}`.
    pub async fn get(&self, id: Uuid) -> Result<article::Model, ServiceError> {
        let key = cache::article_detail_key(id);
        if let Some(a) = cache::get_json::<article::Model>(self.cache.as_ref(), &key).await {
            return Ok(a);
        }
        let a = self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("article"))?;
        cache::set_json(self.cache.as_ref(), &key, &a, self.detail_ttl).await;
        Ok(a)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<article::Model, ServiceError> {
        self.repo
            .find_published_by_slug(slug)
            .await?
            .ok_or_else(|| ServiceError::not_found("article"))
    }

    #[instrument(skip(self, input), fields(author_id = %author_id, slug = %input.slug))]
    pub async fn create(&self, author_id: Uuid, input: CreateArticleInput) -> Result<article::Model, ServiceError> {
        validate_title(&input.title)?;
        validate_slug(&input.slug)?;
        validate_content(&input.content)?;
        if self.repo.slug_taken(&input.slug, None).await? {
            return Err(ServiceError::Validation("slug already exists".into()));
        }

        let now = Utc::now().fixed_offset();
        let created = self.repo.insert(article::Model {
            id: Uuid::new_v4(),
            title: input.title.trim().to_string(),
            slug: input.slug,
            excerpt: input.excerpt,
            content: input.content,
            author_id,
            published: input.published,
            published_at: input.published.then_some(now),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }).await?;

        info!(article_id = %created.id, "article_created");
        self.events.emit(events::TOPIC_ARTICLES, events::ARTICLE_CREATED, &created).await;
        cache::invalidate(self.cache.as_ref(), &[], &[ARTICLES_PATTERN]).await;
        Ok(created)
    }

    #[instrument(skip(self, input), fields(article_id = %id))]
    pub async fn update(&self, id: Uuid, input: UpdateArticleInput) -> Result<article::Model, ServiceError> {
        let mut a = self.repo.find_by_id(id).await?.ok_or_else(|| ServiceError::not_found("article"))?;

        if let Some(title) = input.title {
            validate_title(&title)?;
            a.title = title.trim().to_string();
        }
        if let Some(slug) = input.slug {
            validate_slug(&slug)?;
            if slug != a.slug && self.repo.slug_taken(&slug, Some(id)).await? {
                return Err(ServiceError::Validation("slug already exists".into()));
            }
            a.slug = slug;
        }
        if let Some(excerpt) = input.excerpt {
            a.excerpt = excerpt;
        }
        if let Some(content) = input.content {
            validate_content(&content)?;
            a.content = content;
        }
        let now = Utc::now().fixed_offset();
        if let Some(published) = input.published {
            a.published = published;
        }
        if a.published && a.published_at.is_none() {
            a.published_at = Some(now);
        }
        a.updated_at = now;

        let updated = self.repo.update(a).await?;
        info!(article_id = %updated.id, "article_updated");
        self.events.emit(events::TOPIC_ARTICLES, events::ARTICLE_UPDATED, &updated).await;
        cache::invalidate(self.cache.as_ref(), &[cache::article_detail_key(id)], &[ARTICLES_PATTERN]).await;
        Ok(updated)
    }

    #[instrument(skip(self), fields(article_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<(), ServiceError> {
        if !self.repo.soft_delete(id, Utc::now().fixed_offset()).await? {
            return Err(ServiceError::not_found("article"));
        }
        info!(article_id = %id, "article_deleted");
        self.events.emit(events::TOPIC_ARTICLES, events::ARTICLE_DELETED, &DeletedRef { id }).await;
        cache::invalidate(self.cache.as_ref(), &[cache::article_detail_key(id)], &[ARTICLES_PATTERN]).await;
        Ok(())
    }
}
