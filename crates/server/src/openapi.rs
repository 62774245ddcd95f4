use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct RegisterRequestDoc { pub email: String, pub password: String, pub name: String }

#[derive(ToSchema)]
pub struct LoginRequestDoc { pub email: String, pub password: String }

#[derive(ToSchema)]
pub struct LoginResponseDoc {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(ToSchema)]
pub struct RefreshRequestDoc { pub refresh_token: String }

#[derive(ToSchema)]
pub struct VerifyRequestDoc { pub token: String }

#[derive(ToSchema)]
pub struct VerifyResponseDoc {
    pub valid: bool,
    pub user_id: Uuid,
    pub role: Option<String>,
    pub expires_at: String,
}

#[derive(ToSchema)]
pub struct CreateArticleDoc {
    pub title: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub content: String,
    pub published: Option<bool>,
}

#[derive(ToSchema)]
pub struct UpdateArticleDoc {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub content: Option<String>,
    pub published: Option<bool>,
}

#[derive(ToSchema)]
pub struct CreateProjectDoc {
    pub name: String,
    pub description: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub featured: Option<bool>,
}

#[derive(ToSchema)]
pub struct UpdateProjectDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub github_url: Option<String>,
    pub live_url: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub featured: Option<bool>,
}

#[derive(ToSchema)]
pub struct PortfolioDoc {
    pub name: String,
    pub title: Option<String>,
    pub bio: Option<String>,
    pub email: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub social_links: Option<serde_json::Value>,
    #[schema(value_type = Option<Object>)]
    pub settings: Option<serde_json::Value>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::refresh,
        crate::routes::auth::verify,
        crate::routes::auth::logout,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequestDoc,
            LoginRequestDoc,
            LoginResponseDoc,
            RefreshRequestDoc,
            VerifyRequestDoc,
            VerifyResponseDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "auth")
    )
)]
pub struct AuthApiDoc;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::articles::list,
        crate::routes::articles::get,
        crate::routes::articles::get_by_slug,
        crate::routes::articles::create,
        crate::routes::articles::update,
        crate::routes::articles::delete,
        crate::routes::projects::list,
        crate::routes::projects::get,
        crate::routes::projects::create,
        crate::routes::projects::update,
        crate::routes::projects::delete,
        crate::routes::portfolio::get,
        crate::routes::portfolio::upsert,
    ),
    components(
        schemas(
            HealthResponse,
            CreateArticleDoc,
            UpdateArticleDoc,
            CreateProjectDoc,
            UpdateProjectDoc,
            PortfolioDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "articles"),
        (name = "projects"),
        (name = "portfolio"),
        (name = "admin")
    )
)]
pub struct ContentApiDoc;
