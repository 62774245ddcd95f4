//! SeaORM entities for the portfolio services plus field-level validation helpers.

pub mod errors;
pub mod db;
pub mod user;
pub mod article;
pub mod project;
pub mod portfolio;
