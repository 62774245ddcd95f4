//! Environment helpers
//!
//! Loads dotenv files in environment-specific order before configuration is read.

use tracing::debug;

/// Load `.env.<env>` then `.env`, where `<env>` comes from `ENV`
/// (`development` by default, `dev`/`prod` suffixes as used by the deploy scripts).
///
/// Variables already present in the process environment are never overridden.
pub fn load_dotenv() {
    let env = std::env::var("ENV").unwrap_or_else(|_| "development".to_string());
    if let Some(file) = env_file_for(&env) {
        if dotenvy::from_filename(file).is_ok() {
            debug!(file, "loaded environment file");
        }
    }
    let _ = dotenvy::dotenv();
}

fn env_file_for(env: &str) -> Option<&'static str> {
    match env {
        "development" => Some(".env.dev"),
        "production" => Some(".env.prod"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::env_file_for;

    #[test]
    fn env_file_mapping() {
        assert_eq!(env_file_for("development"), Some(".env.dev"));
        assert_eq!(env_file_for("production"), Some(".env.prod"));
        assert_eq!(env_file_for("staging"), None);
    }
}
