//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login, token refresh and verification live here, independent of the web framework.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod token;
pub mod repo;

pub use service::AuthService;
pub use token::{Claims, TokenManager, TokenType};
