//! Idempotent seeding: admin user, portfolio profile and a few sample entries.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use configs::SeederConfig;
use models::{article, project, user::{normalize_email, ROLE_ADMIN}};

use crate::article::repository::ArticleRepository;
use crate::auth::domain::NewUser;
use crate::auth::errors::AuthError;
use crate::auth::repository::AuthRepository;
use crate::auth::service::hash_password;
use crate::errors::ServiceError;
use crate::portfolio::{PortfolioInput, PortfolioService};
use crate::project::repository::ProjectRepository;

/// What a seeding run changed.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub admin_created: bool,
    pub portfolio_saved: bool,
    pub articles_inserted: usize,
    pub projects_inserted: usize,
}

pub struct Seeder {
    pub users: Arc<dyn AuthRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub projects: Arc<dyn ProjectRepository>,
    pub portfolio: Arc<PortfolioService>,
}

struct SampleArticle {
    title: &'static str,
    slug: &'static str,
    excerpt: &'static str,
    content: &'static str,
}

const SAMPLE_ARTICLES: &[SampleArticle] = &[
    SampleArticle {
        title: "Structuring an axum service in layers",
        slug: "structuring-an-axum-service",
        excerpt: "Handlers, services and repositories, and where each concern lives.",
        content: "# Layers\n\nHandlers bind JSON, services apply rules, repositories talk to the database.",
    },
    SampleArticle {
        title: "Cache invalidation with key patterns",
        slug: "cache-invalidation-with-key-patterns",
        excerpt: "Using prefix patterns to drop stale list pages after writes.",
        content: "# Patterns\n\nEvery list page lives under a shared prefix, so one SCAN clears them all.",
    },
];

struct SampleProject {
    name: &'static str,
    description: &'static str,
    github_url: &'static str,
    technologies: &'static [&'static str],
    featured: bool,
}

const SAMPLE_PROJECTS: &[SampleProject] = &[
    SampleProject {
        name: "Portfolio API",
        description: "Auth and content services behind this site.",
        github_url: "https://github.com/example/portfolio",
        technologies: &["rust", "axum", "postgres", "redis"],
        featured: true,
    },
    SampleProject {
        name: "Link Checker",
        description: "Crawls a site and reports broken links.",
        github_url: "https://github.com/example/link-checker",
        technologies: &["rust", "tokio"],
        featured: false,
    },
];

impl Seeder {
    pub async fn run(&self, cfg: &SeederConfig) -> anyhow::Result<SeedReport> {
        let mut report = SeedReport::default();
        let admin = self.seed_admin(cfg, &mut report).await?;
        self.seed_portfolio(cfg).await?;
        report.portfolio_saved = true;
        report.articles_inserted = self.seed_articles(admin).await?;
        report.projects_inserted = self.seed_projects().await?;
        info!(?report, "seeding_completed");
        Ok(report)
    }

    async fn seed_admin(&self, cfg: &SeederConfig, report: &mut SeedReport) -> Result<Uuid, AuthError> {
        let email = normalize_email(&cfg.admin_email);
        if let Some(existing) = self.users.find_user_by_email(&email).await? {
            if existing.role != ROLE_ADMIN {
                warn!(email = %email, role = %existing.role, "seed_admin_exists_without_admin_role");
            }
            info!(email = %email, "admin user already exists");
            return Ok(existing.id);
        }
        let user = self.users.create_user(NewUser {
            email,
            name: cfg.admin_name.clone(),
            password_hash: hash_password(&cfg.admin_password)?,
            role: ROLE_ADMIN.to_string(),
            email_verified: true,
        }).await?;
        report.admin_created = true;
        info!(user_id = %user.id, "admin_user_created");
        Ok(user.id)
    }

    async fn seed_portfolio(&self, cfg: &SeederConfig) -> Result<(), ServiceError> {
        self.portfolio.upsert(PortfolioInput {
            name: cfg.portfolio_name.clone(),
            title: cfg.portfolio_title.clone(),
            bio: cfg.portfolio_bio.clone(),
            email: cfg.portfolio_email.clone(),
            social_links: Some(json!({
                "github": cfg.portfolio_github,
                "linkedin": cfg.portfolio_linkedin,
            })),
            settings: Some(json!({
                "theme": cfg.portfolio_theme,
                "language": cfg.portfolio_language,
            })),
        }).await?;
        Ok(())
    }

    async fn seed_articles(&self, author_id: Uuid) -> Result<usize, ServiceError> {
        let mut inserted = 0;
        for sample in SAMPLE_ARTICLES {
            if self.articles.slug_taken(sample.slug, None).await? {
                continue;
            }
            let now = Utc::now().fixed_offset();
            self.articles.insert(article::Model {
                id: Uuid::new_v4(),
                title: sample.title.to_string(),
                slug: sample.slug.to_string(),
                excerpt: sample.excerpt.to_string(),
                content: sample.content.to_string(),
                author_id,
                published: true,
                published_at: Some(now),
                created_at: now,
                updated_at: now,
                deleted_at: None,
            }).await?;
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn seed_projects(&self) -> Result<usize, ServiceError> {
        let mut inserted = 0;
        for sample in SAMPLE_PROJECTS {
            if self.projects.find_by_name(sample.name).await?.is_some() {
                continue;
            }
            let now = Utc::now().fixed_offset();
            self.projects.insert(project::Model {
                id: Uuid::new_v4(),
                name: sample.name.to_string(),
                description: sample.description.to_string(),
                github_url: sample.github_url.to_string(),
                live_url: String::new(),
                technologies: project::normalize_technologies(sample.technologies.iter().map(|s| s.to_string()).collect()),
                featured: sample.featured,
                created_at: now,
                updated_at: now,
                deleted_at: None,
            }).await?;
            inserted += 1;
        }
        Ok(inserted)
    }
}
