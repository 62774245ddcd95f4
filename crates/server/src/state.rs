use std::sync::Arc;

use service::article::ArticleService;
use service::auth::repository::AuthRepository;
use service::auth::AuthService;
use service::portfolio::PortfolioService;
use service::project::ProjectService;

use crate::auth_client::TokenVerifier;

/// State shared by the auth service handlers.
#[derive(Clone)]
pub struct AuthState {
    pub auth: Arc<AuthService<dyn AuthRepository>>,
}

/// State shared by the content service handlers.
#[derive(Clone)]
pub struct ContentState {
    pub articles: Arc<ArticleService>,
    pub projects: Arc<ProjectService>,
    pub portfolio: Arc<PortfolioService>,
    pub verifier: Arc<dyn TokenVerifier>,
}
