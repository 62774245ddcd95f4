use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

use models::article;

use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Persistence for articles. Soft-deleted rows are invisible to every method except `slug_taken`.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    async fn insert(&self, article: article::Model) -> Result<article::Model, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<article::Model>, ServiceError>;
    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<article::Model>, ServiceError>;
    /// Newest first, plus the total count before paging.
    async fn list_published(&self, p: Pagination) -> Result<(Vec<article::Model>, u64), ServiceError>;
    /// True when any row (soft-deleted included) other than `exclude` holds the slug.
    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, ServiceError>;
    async fn update(&self, article: article::Model) -> Result<article::Model, ServiceError>;
    /// Returns false when no live row matched.
    async fn soft_delete(&self, id: Uuid, at: DateTime<FixedOffset>) -> Result<bool, ServiceError>;
}

fn map_write_err(e: sea_orm::DbErr) -> ServiceError {
    match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => ServiceError::Validation("slug already exists".into()),
        Some(SqlErr::ForeignKeyConstraintViolation(_)) => ServiceError::Validation("author does not exist".into()),
        _ => ServiceError::Db(e.to_string()),
    }
}

fn active(a: article::Model) -> article::ActiveModel {
    article::ActiveModel {
        id: Set(a.id),
        title: Set(a.title),
        slug: Set(a.slug),
        excerpt: Set(a.excerpt),
        content: Set(a.content),
        author_id: Set(a.author_id),
        published: Set(a.published),
        published_at: Set(a.published_at),
        created_at: Set(a.created_at),
        updated_at: Set(a.updated_at),
        deleted_at: Set(a.deleted_at),
    }
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmArticleRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ArticleRepository for SeaOrmArticleRepository {
    async fn insert(&self, a: article::Model) -> Result<article::Model, ServiceError> {
        active(a).insert(&self.db).await.map_err(map_write_err)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<article::Model>, ServiceError> {
        Ok(article::Entity::find_by_id(id)
            .filter(article::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<article::Model>, ServiceError> {
        Ok(article::Entity::find()
            .filter(article::Column::Slug.eq(slug))
            .filter(article::Column::Published.eq(true))
            .filter(article::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }

    async fn list_published(&self, p: Pagination) -> Result<(Vec<article::Model>, u64), ServiceError> {
        let p = p.normalize();
        let paginator = article::Entity::find()
            .filter(article::Column::Published.eq(true))
            .filter(article::Column::DeletedAt.is_null())
            .order_by_desc(article::Column::CreatedAt)
            .paginate(&self.db, p.limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(p.page_index()).await?;
        Ok((items, total))
    }

    async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, ServiceError> {
        let mut q = article::Entity::find().filter(article::Column::Slug.eq(slug));
        if let Some(id) = exclude {
            q = q.filter(article::Column::Id.ne(id));
        }
        Ok(q.count(&self.db).await? > 0)
    }

    async fn update(&self, a: article::Model) -> Result<article::Model, ServiceError> {
        article::Entity::update(active(a))
            .filter(article::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => ServiceError::not_found("article"),
                other => map_write_err(other),
            })
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<FixedOffset>) -> Result<bool, ServiceError> {
        let res = article::Entity::update_many()
            .col_expr(article::Column::DeletedAt, sea_orm::sea_query::Expr::value(at))
            .col_expr(article::Column::UpdatedAt, sea_orm::sea_query::Expr::value(at))
            .filter(article::Column::Id.eq(id))
            .filter(article::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected > 0)
    }
}

/// Simple in-memory mock repository for tests and local wiring
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    use crate::pagination::slice;

    fn poisoned<T>(_: T) -> ServiceError { ServiceError::Db("lock poisoned".into()) }

    #[derive(Default)]
    pub struct MockArticleRepository {
        rows: Mutex<HashMap<Uuid, article::Model>>,
    }

    #[async_trait]
    impl ArticleRepository for MockArticleRepository {
        async fn insert(&self, a: article::Model) -> Result<article::Model, ServiceError> {
            let mut rows = self.rows.lock().map_err(poisoned)?;
            if rows.values().any(|r| r.slug == a.slug) {
                return Err(ServiceError::Validation("slug already exists".into()));
            }
            rows.insert(a.id, a.clone());
            Ok(a)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<article::Model>, ServiceError> {
            let rows = self.rows.lock().map_err(poisoned)?;
            Ok(rows.get(&id).filter(|a| a.deleted_at.is_none()).cloned())
        }

        async fn find_published_by_slug(&self, slug: &str) -> Result<Option<article::Model>, ServiceError> {
            let rows = self.rows.lock().map_err(poisoned)?;
            Ok(rows.values().find(|a| a.slug == slug && a.published && a.deleted_at.is_none()).cloned())
        }

        async fn list_published(&self, p: Pagination) -> Result<(Vec<article::Model>, u64), ServiceError> {
            let rows = self.rows.lock().map_err(poisoned)?;
            let mut live: Vec<article::Model> = rows.values().filter(|a| a.published && a.deleted_at.is_none()).cloned().collect();
            live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = live.len() as u64;
            Ok((slice(&live, p), total))
        }

        async fn slug_taken(&self, slug: &str, exclude: Option<Uuid>) -> Result<bool, ServiceError> {
            let rows = self.rows.lock().map_err(poisoned)?;
            Ok(rows.values().any(|a| a.slug == slug && Some(a.id) != exclude))
        }

        async fn update(&self, a: article::Model) -> Result<article::Model, ServiceError> {
            let mut rows = self.rows.lock().map_err(poisoned)?;
            match rows.get_mut(&a.id) {
                Some(existing) if existing.deleted_at.is_none() => {
                    *existing = a.clone();
                    Ok(a)
                }
                _ => Err(ServiceError::not_found("article")),
            }
        }

        async fn soft_delete(&self, id: Uuid, at: DateTime<FixedOffset>) -> Result<bool, ServiceError> {
            let mut rows = self.rows.lock().map_err(poisoned)?;
            match rows.get_mut(&id) {
                Some(a) if a.deleted_at.is_none() => {
                    a.deleted_at = Some(at);
                    a.updated_at = at;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }
}
