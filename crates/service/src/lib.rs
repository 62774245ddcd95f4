//! Service layer for the portfolio auth and content services.
//! - Separates business logic from data access (repository traits with SeaORM and in-memory impls).
//! - Reuses validation and entity definitions in `models` crate.
//! - Owns the side-effect ports: content cache and domain event publisher.

pub mod errors;
pub mod pagination;
pub mod auth;
pub mod cache;
pub mod events;
pub mod article;
pub mod project;
pub mod portfolio;
pub mod seed;
#[cfg(test)]
pub mod test_support;
