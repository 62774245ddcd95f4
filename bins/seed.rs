use std::process::ExitCode;
use std::sync::Arc;

use tracing::{error, info};

use configs::AppConfig;
use service::article::repository::SeaOrmArticleRepository;
use service::auth::repo::SeaOrmAuthRepository;
use service::portfolio::{repository::SeaOrmPortfolioRepository, PortfolioService};
use service::project::repository::SeaOrmProjectRepository;
use service::seed::Seeder;

async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let db = server::startup::connect_and_migrate(&cfg).await?;
    let seeder = Seeder {
        users: Arc::new(SeaOrmAuthRepository { db: db.clone() }),
        articles: Arc::new(SeaOrmArticleRepository { db: db.clone() }),
        projects: Arc::new(SeaOrmProjectRepository { db: db.clone() }),
        portfolio: Arc::new(PortfolioService::new(Arc::new(SeaOrmPortfolioRepository { db }))),
    };
    let report = seeder.run(&cfg.seeder).await?;
    info!(
        admin_created = report.admin_created,
        articles_inserted = report.articles_inserted,
        projects_inserted = report.projects_inserted,
        "seed_completed"
    );
    Ok(())
}

fn main() -> ExitCode {
    let cfg = match server::startup::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "seed", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    server::startup::run_blocking("seed", Some(1), run(cfg))
}
