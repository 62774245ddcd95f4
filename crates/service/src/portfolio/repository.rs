use async_trait::async_trait;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, QueryOrder, Set};

use models::portfolio;

use crate::errors::ServiceError;

#[async_trait]
pub trait PortfolioRepository: Send + Sync {
    /// The single profile row, if one was ever written.
    async fn get(&self) -> Result<Option<portfolio::Model>, ServiceError>;
    async fn insert(&self, p: portfolio::Model) -> Result<portfolio::Model, ServiceError>;
    async fn update(&self, p: portfolio::Model) -> Result<portfolio::Model, ServiceError>;
}

fn active(p: portfolio::Model) -> portfolio::ActiveModel {
    portfolio::ActiveModel {
        id: Set(p.id),
        name: Set(p.name),
        title: Set(p.title),
        bio: Set(p.bio),
        email: Set(p.email),
        social_links: Set(p.social_links),
        settings: Set(p.settings),
        updated_at: Set(p.updated_at),
    }
}

/// SeaORM-backed repository implementation.
pub struct SeaOrmPortfolioRepository {
    pub db: DatabaseConnection,
}

#[async_trait]
impl PortfolioRepository for SeaOrmPortfolioRepository {
    async fn get(&self) -> Result<Option<portfolio::Model>, ServiceError> {
        Ok(portfolio::Entity::find()
            .order_by_asc(portfolio::Column::UpdatedAt)
            .one(&self.db)
            .await?)
    }

    async fn insert(&self, p: portfolio::Model) -> Result<portfolio::Model, ServiceError> {
        Ok(active(p).insert(&self.db).await?)
    }

    async fn update(&self, p: portfolio::Model) -> Result<portfolio::Model, ServiceError> {
        active(p).update(&self.db).await.map_err(|e| match e {
            sea_orm::DbErr::RecordNotUpdated => ServiceError::not_found("portfolio"),
            other => ServiceError::from(other),
        })
    }
}

/// Simple in-memory mock repository for tests and local wiring
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    fn poisoned<T>(_: T) -> ServiceError { ServiceError::Db("lock poisoned".into()) }

    #[derive(Default)]
    pub struct MockPortfolioRepository {
        row: Mutex<Option<portfolio::Model>>,
    }

    #[async_trait]
    impl PortfolioRepository for MockPortfolioRepository {
        async fn get(&self) -> Result<Option<portfolio::Model>, ServiceError> {
            Ok(self.row.lock().map_err(poisoned)?.clone())
        }

        async fn insert(&self, p: portfolio::Model) -> Result<portfolio::Model, ServiceError> {
            *self.row.lock().map_err(poisoned)? = Some(p.clone());
            Ok(p)
        }

        async fn update(&self, p: portfolio::Model) -> Result<portfolio::Model, ServiceError> {
            let mut row = self.row.lock().map_err(poisoned)?;
            match row.as_ref() {
                Some(existing) if existing.id == p.id => {
                    *row = Some(p.clone());
                    Ok(p)
                }
                _ => Err(ServiceError::not_found("portfolio")),
            }
        }
    }
}
