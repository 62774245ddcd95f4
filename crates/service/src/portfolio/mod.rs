//! Singleton portfolio profile: public read, admin upsert.

pub mod repository;
pub mod service;

pub use service::{PortfolioInput, PortfolioService};
