pub mod domain;
pub mod repository;
pub mod service;

pub use service::ProjectService;
