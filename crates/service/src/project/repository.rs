use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use models::project;

use super::domain::ProjectFilter;
use crate::errors::ServiceError;
use crate::pagination::Pagination;

/// Persistence for projects. Soft-deleted rows are invisible to every method.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    async fn insert(&self, project: project::Model) -> Result<project::Model, ServiceError>;
    async fn find_by_id(&self, id: Uuid) -> Result<Option<project::Model>, ServiceError>;
    async fn find_by_name(&self, name: &str) -> Result<Option<project::Model>, ServiceError>;
    /// Newest first, plus the total count before paging.
    async fn list(&self, filter: ProjectFilter, p: Pagination) -> Result<(Vec<project::Model>, u64), ServiceError>;
    async fn update(&self, project: project::Model) -> Result<project::Model, ServiceError>;
    async fn soft_delete(&self, id: Uuid, at: DateTime<FixedOffset>) -> Result<bool, ServiceError>;
}

fn active(p: project::Model) -> project::ActiveModel {
    project::ActiveModel {
        id: Set(p.id),
        name: Set(p.name),
        description: Set(p.description),
        github_url: Set(p.github_url),
        live_url: Set(p.live_url),
        technologies: Set(p.technologies),
        featured: Set(p.featured),
        created_at: Set(p.created_at),
        updated_at: Set(p.updated_at),
        deleted_at: Set(p.deleted_at),
    }
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmProjectRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl ProjectRepository for SeaOrmProjectRepository {
    async fn insert(&self, p: project::Model) -> Result<project::Model, ServiceError> {
        Ok(active(p).insert(&self.db).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<project::Model>, ServiceError> {
        Ok(project::Entity::find_by_id(id)
            .filter(project::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<project::Model>, ServiceError> {
        Ok(project::Entity::find()
            .filter(project::Column::Name.eq(name))
            .filter(project::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?)
    }

    async fn list(&self, filter: ProjectFilter, p: Pagination) -> Result<(Vec<project::Model>, u64), ServiceError> {
        let p = p.normalize();
        let mut q = project::Entity::find().filter(project::Column::DeletedAt.is_null());
        if let Some(featured) = filter.featured {
            q = q.filter(project::Column::Featured.eq(featured));
        }
        let paginator = q.order_by_desc(project::Column::CreatedAt).paginate(&self.db, p.limit);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(p.page_index()).await?;
        Ok((items, total))
    }

    async fn update(&self, p: project::Model) -> Result<project::Model, ServiceError> {
        project::Entity::update(active(p))
            .filter(project::Column::DeletedAt.is_null())
            .exec(&self.db)
            .await
            .map_err(|e| match e {
                sea_orm::DbErr::RecordNotUpdated => ServiceError::not_found("project"),
                other => ServiceError::from(other),
            })
    }

    async fn soft_delete(&self, id: Uuid, at: DateTime<FixedOffset>) -> Result<bool, ServiceError> {
        let res = project::Entity::update_many()
            .col_expr(project::Column::DeletedAt, sea_orm::sea_query::Expr::value(at))
            .col_expr(project::Column::UpdatedAt, sea_orm::sea_query::Expr::value(at))
            .filter(project::Column::Id.eq(id))
            .filter(project::Column::DeletedAt.is_null())
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
    pub struct MockProjectRepository {
        rows: Mutex<HashMap<Uuid, project::Model>>,
    }

    #[async_trait]
    impl ProjectRepository for MockProjectRepository {
        async fn insert(&self, p: project::Model) -> Result<project::Model, ServiceError> {
            self.rows.lock().map_err(poisoned)?.insert(p.id, p.clone());
            Ok(p)
        }

        async fn find_by_id(&self, id: Uuid) -> Result<Option<project::Model>, ServiceError> {
            let rows = self.rows.lock().map_err(poisoned)?;
            Ok(rows.get(&id).filter(|p| p.deleted_at.is_none()).cloned())
        }

        async fn find_by_name(&self, name: &str) -> Result<Option<project::Model>, ServiceError> {
            let rows = self.rows.lock().map_err(poisoned)?;
            Ok(rows.values().find(|p| p.name == name && p.deleted_at.is_none()).cloned())
        }

        async fn list(&self, filter: ProjectFilter, p: Pagination) -> Result<(Vec<project::Model>, u64), ServiceError> {
            let rows = self.rows.lock().map_err(poisoned)?;
            let mut live: Vec<project::Model> = rows
                .values()
                .filter(|r| r.deleted_at.is_none())
                .filter(|r| filter.featured.map_or(true, |f| r.featured == f))
                .cloned()
                .collect();
            live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            let total = live.len() as u64;
            Ok((slice(&live, p), total))
        }

        async fn update(&self, p: project::Model) -> Result<project::Model, ServiceError> {
            let mut rows = self.rows.lock().map_err(poisoned)?;
            match rows.get_mut(&p.id) {
                Some(existing) if existing.deleted_at.is_none() => {
                    *existing = p.clone();
                    Ok(p)
                }
                _ => Err(ServiceError::not_found("project")),
            }
        }

        async fn soft_delete(&self, id: Uuid, at: DateTime<FixedOffset>) -> Result<bool, ServiceError> {
            let mut rows = self.rows.lock().map_err(poisoned)?;
            match rows.get_mut(&id) {
                Some(p) if p.deleted_at.is_none() => {
                    p.deleted_at = Some(at);
                    p.updated_at = at;
                    Ok(true)
                }
                _ => Ok(false),
            }
        }
    }
}
