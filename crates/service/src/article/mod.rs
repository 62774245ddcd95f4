//! Articles: public reads of published posts, admin writes with cache and event side effects.

pub mod domain;
pub mod repository;
pub mod service;

pub use service::ArticleService;
