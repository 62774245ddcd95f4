use std::io;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialize tracing subscriber with sensible defaults and stdout writer.
/// - Respects `RUST_LOG` if set
/// - Falls back to `info,tower_http=info,sea_orm=warn`
pub fn init_logging_default() {
    init_logging("info,tower_http=info,sea_orm=warn", false);
}

/// Initialize tracing with an explicit fallback filter and output format.
///
/// `RUST_LOG` still wins over `default_filter` when present. Calling this more
/// than once is harmless; later calls are ignored.
pub fn init_logging(default_filter: &str, json: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stdout);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
}
