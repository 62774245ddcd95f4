use std::future::Future;
use std::net::SocketAddr;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tracing::{error, info, warn};
use uuid::Uuid;

use configs::AppConfig;
use migration::{Migrator, MigratorTrait};
use sea_orm::DatabaseConnection;
use service::article::{repository::SeaOrmArticleRepository, ArticleService};
use service::auth::{repo::SeaOrmAuthRepository, repository::AuthRepository, AuthService, TokenManager};
use service::cache::{ContentCache, MemoryCache, RedisCache};
use service::events::{EventBus, EventPublisher, NoopPublisher, RedisPublisher};
use service::portfolio::{repository::SeaOrmPortfolioRepository, PortfolioService};
use service::project::{repository::SeaOrmProjectRepository, ProjectService};

use crate::auth_client::HttpTokenVerifier;
use crate::routes;
use crate::state::{AuthState, ContentState};

/// Load `.env`, then config file and environment overlay, then initialise logging from it.
pub fn load_config() -> anyhow::Result<AppConfig> {
    common::env::load_dotenv();
    let cfg = AppConfig::load_and_validate()?;
    common::utils::logging::init_logging(&cfg.logging.filter(), cfg.logging.json);
    Ok(cfg)
}

/// Connect and apply pending migrations.
pub async fn connect_and_migrate(cfg: &AppConfig) -> anyhow::Result<DatabaseConnection> {
    let db = models::db::connect_with_config(&cfg.database).await?;
    Migrator::up(&db, None).await?;
    info!("database migrations applied");
    Ok(db)
}

pub async fn build_auth_state(cfg: &AppConfig) -> anyhow::Result<AuthState> {
    let db = connect_and_migrate(cfg).await?;
    let repo: Arc<dyn AuthRepository> = Arc::new(SeaOrmAuthRepository { db });
    let auth = AuthService::new(repo, TokenManager::from_config(&cfg.jwt)?);
    Ok(AuthState { auth: Arc::new(auth) })
}

/// Redis when enabled and reachable, otherwise the in-process cache.
async fn build_cache(cfg: &AppConfig) -> Arc<dyn ContentCache> {
    if cfg.redis.enabled {
        match RedisCache::connect(&cfg.redis.url, cfg.redis.key_prefix.clone()).await {
            Ok(c) => {
                info!(url = %cfg.redis.url, "redis cache connected");
                return Arc::new(c);
            }
            Err(e) => warn!(error = %e, "redis cache unavailable, falling back to in-memory cache"),
        }
    }
    Arc::new(MemoryCache::default())
}

async fn build_events(cfg: &AppConfig) -> EventBus {
    let publisher: Arc<dyn EventPublisher> = if cfg.events.enabled {
        match RedisPublisher::connect(&cfg.events.url).await {
            Ok(p) => Arc::new(p),
            Err(e) => {
                warn!(error = %e, "event publisher unavailable, events will be dropped");
                Arc::new(NoopPublisher)
            }
        }
    } else {
        Arc::new(NoopPublisher)
    };
    EventBus::new(publisher, cfg.events.source.clone())
}

pub async fn build_content_state(cfg: &AppConfig) -> anyhow::Result<ContentState> {
    let db = connect_and_migrate(cfg).await?;
    let cache = build_cache(cfg).await;
    let events = build_events(cfg).await;
    let ttl = Duration::from_secs(cfg.redis.detail_ttl_secs);

    let articles = ArticleService::new(Arc::new(SeaOrmArticleRepository { db: db.clone() }), cache.clone(), events.clone())
        .with_detail_ttl(ttl);
    let projects = ProjectService::new(Arc::new(SeaOrmProjectRepository { db: db.clone() }), cache, events)
        .with_detail_ttl(ttl);
    let portfolio = PortfolioService::new(Arc::new(SeaOrmPortfolioRepository { db }));
    let verifier = HttpTokenVerifier::from_config(&cfg.auth_client)?;

    Ok(ContentState {
        articles: Arc::new(articles),
        projects: Arc::new(projects),
        portfolio: Arc::new(portfolio),
        verifier: Arc::new(verifier),
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl_c");
        return;
    }
    info!("received Ctrl+C, shutting down");
}

async fn serve(app: Router, addr: SocketAddr, service: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(service, %addr, "listening");
    axum::serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;
    info!(service, "server stopped");
    Ok(())
}

pub async fn run_auth(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_auth_state(&cfg).await?;
    let addr: SocketAddr = cfg.auth_server.bind_addr().parse()?;
    serve(routes::build_auth_router(state), addr, routes::AUTH_SERVICE).await
}

pub async fn run_content(cfg: AppConfig) -> anyhow::Result<()> {
    let state = build_content_state(&cfg).await?;
    let addr: SocketAddr = cfg.server.bind_addr().parse()?;
    serve(routes::build_content_router(state), addr, routes::CONTENT_SERVICE).await
}

/// Build a Tokio runtime sized by config, install a panic hook and drive `fut` to completion.
pub fn run_blocking<F>(service: &'static str, worker_threads: Option<usize>, fut: F) -> ExitCode
where
    F: Future<Output = anyhow::Result<()>>,
{
    let service_id = Uuid::new_v4();
    let pid = std::process::id();

    std::panic::set_hook(Box::new(move |info| {
        error!(service, event = "panic", %service_id, pid, message = %info, "unhandled panic occurred");
    }));

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    builder.enable_all();
    if let Some(w) = worker_threads { builder.worker_threads(w); }
    let rt = match builder.build() {
        Ok(rt) => rt,
        Err(e) => {
            error!(service, event = "runtime_build_failed", error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(service, event = "start", %service_id, pid, version = env!("CARGO_PKG_VERSION"), "service starting");
    match rt.block_on(fut) {
        Ok(()) => {
            info!(service, event = "stop", %service_id, pid, "service stopped normally");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(service, event = "run_failed", error = %e, "service returned error");
            ExitCode::FAILURE
        }
    }
}
