use std::process::ExitCode;

use tracing::error;

fn main() -> ExitCode {
    let cfg = match server::startup::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            common::utils::logging::init_logging_default();
            error!(service = "content", event = "config_invalid", error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };
    let workers = cfg.server.worker_threads;
    server::startup::run_blocking("content", workers, server::run_content(cfg))
}
