use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;
use std::str::FromStr;

pub const MAX_WORKER_THREADS: usize = 1024;
/// One year.
pub const MAX_ACCESS_EXPIRY_MINUTES: i64 = 525_600;
/// Ten years.
pub const MAX_REFRESH_EXPIRY_HOURS: i64 = 87_600;

/// Application configuration shared by the auth service, the content service and the seeder.
///
/// Values come from `config.toml` (or `CONFIG_PATH`) and are then overridden by
/// environment variables, so a deployment can run with env vars only.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "ServerConfig::auth_default")]
    pub auth_server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub jwt: JwtConfig,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub auth_client: AuthClientConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub seeder: SeederConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".into(), port: 8080, worker_threads: Some(4) }
    }
}

impl ServerConfig {
    fn auth_default() -> Self {
        Self { port: 8081, ..Self::default() }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_secs: default_connect_timeout(),
            idle_timeout_secs: default_idle_timeout(),
            acquire_timeout_secs: default_acquire_timeout(),
            sqlx_logging: false,
        }
    }
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_acquire_timeout() -> u64 { 30 }

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_minutes")]
    pub access_expiry_minutes: i64,
    #[serde(default = "default_refresh_hours")]
    pub refresh_expiry_hours: i64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            secret: "dev-secret-change-me".into(),
            access_expiry_minutes: default_access_minutes(),
            refresh_expiry_hours: default_refresh_hours(),
        }
    }
}

fn default_access_minutes() -> i64 { 15 }
fn default_refresh_hours() -> i64 { 168 }

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    /// When false the content service falls back to an in-process cache.
    #[serde(default)]
    pub enabled: bool,
    pub url: String,
    #[serde(default)]
    pub key_prefix: Option<String>,
    #[serde(default = "default_detail_ttl")]
    pub detail_ttl_secs: u64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "redis://127.0.0.1:6379".into(),
            key_prefix: None,
            detail_ttl_secs: default_detail_ttl(),
        }
    }
}

fn default_detail_ttl() -> u64 { 600 }

#[derive(Debug, Clone, Deserialize)]
pub struct EventsConfig {
    #[serde(default)]
    pub enabled: bool,
    /// Redis URL of the broker; empty means reuse `redis.url`.
    #[serde(default)]
    pub url: String,
    #[serde(default = "default_event_source")]
    pub source: String,
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self { enabled: false, url: String::new(), source: default_event_source() }
    }
}

fn default_event_source() -> String { "backend".into() }

#[derive(Debug, Clone, Deserialize)]
pub struct AuthClientConfig {
    pub service_url: String,
    #[serde(default = "default_auth_timeout")]
    pub timeout_secs: u64,
}

impl Default for AuthClientConfig {
    fn default() -> Self {
        Self { service_url: "http://localhost:8081".into(), timeout_secs: default_auth_timeout() }
    }
}

fn default_auth_timeout() -> u64 { 5 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".into(), json: false }
    }
}

impl LoggingConfig {
    /// Filter directive used when `RUST_LOG` is absent.
    pub fn filter(&self) -> String {
        format!("{},tower_http=info,sea_orm=warn", self.level)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeederConfig {
    pub admin_email: String,
    pub admin_password: String,
    pub admin_name: String,
    pub portfolio_name: String,
    pub portfolio_title: String,
    pub portfolio_email: String,
    pub portfolio_bio: String,
    pub portfolio_github: String,
    pub portfolio_linkedin: String,
    pub portfolio_theme: String,
    pub portfolio_language: String,
}

impl Default for SeederConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@portfolio.local".into(),
            admin_password: "Admin123!".into(),
            admin_name: "Admin User".into(),
            portfolio_name: "Portfolio Owner".into(),
            portfolio_title: "Fullstack Developer".into(),
            portfolio_email: "owner@portfolio.local".into(),
            portfolio_bio: "Building reliable web platforms.".into(),
            portfolio_github: "https://github.com/".into(),
            portfolio_linkedin: "https://linkedin.com/".into(),
            portfolio_theme: "dark".into(),
            portfolio_language: "en".into(),
        }
    }
}

/// Parse `key` into `T`; unset is `None`, anything unparsable or out of range for `T` is an error.
fn env_num<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| anyhow!("{key}={raw:?} is not a valid {}", std::any::type_name::<T>())),
    }
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Load the TOML file if present, overlay process environment, then validate.
    pub fn load_and_validate() -> Result<Self> {
        let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        let mut cfg = if std::path::Path::new(&path).exists() {
            load_from_file(&path)?
        } else {
            AppConfig { auth_server: ServerConfig::auth_default(), ..AppConfig::default() }
        };
        cfg.apply_env(|k| std::env::var(k).ok())?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Overlay values from an environment lookup.
    /// Numeric values must parse into their field's type; anything else is an error.
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) -> Result<()> {
        let flag = |k: &str| get(k).map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes"));

        if let Some(v) = get("SERVER_HOST") { self.server.host = v; }
        if let Some(v) = env_num::<u16>(&get, "SERVER_PORT")? { self.server.port = v; }
        if let Some(v) = env_num::<usize>(&get, "TOKIO_WORKER_THREADS")? { self.server.worker_threads = Some(v); }
        if let Some(v) = get("AUTH_SERVICE_HOST") { self.auth_server.host = v; }
        if let Some(v) = env_num::<u16>(&get, "AUTH_SERVICE_PORT")? { self.auth_server.port = v; }

        if let Some(v) = get("DATABASE_URL") {
            self.database.url = v;
        } else if self.database.url.trim().is_empty() {
            if let Some(host) = get("DB_HOST") {
                let port = get("DB_PORT").unwrap_or_else(|| "5432".into());
                let user = get("DB_USER").unwrap_or_else(|| "portfolio".into());
                let password = get("DB_PASSWORD").unwrap_or_else(|| "password".into());
                let name = get("DB_NAME").unwrap_or_else(|| "portfolio".into());
                self.database.url = format!("postgres://{user}:{password}@{host}:{port}/{name}");
            }
        }
        if let Some(v) = env_num::<u32>(&get, "DB_MAX_CONNECTIONS")? { self.database.max_connections = v; }

        if let Some(v) = get("JWT_SECRET") { self.jwt.secret = v; }
        if let Some(v) = env_num::<i64>(&get, "JWT_ACCESS_EXPIRY_MINUTES")? { self.jwt.access_expiry_minutes = v; }
        if let Some(v) = env_num::<i64>(&get, "JWT_REFRESH_EXPIRY_HOURS")? { self.jwt.refresh_expiry_hours = v; }

        if let Some(v) = flag("REDIS_ENABLED") { self.redis.enabled = v; }
        if let Some(v) = get("REDIS_URL") { self.redis.url = v; }
        if let Some(v) = flag("EVENTS_ENABLED") { self.events.enabled = v; }
        if let Some(v) = get("EVENTS_URL") { self.events.url = v; }

        if let Some(v) = get("AUTH_SERVICE_URL") { self.auth_client.service_url = v; }

        if let Some(v) = get("LOG_LEVEL") { self.logging.level = v; }
        if let Some(v) = get("LOG_FORMAT") { self.logging.json = v.eq_ignore_ascii_case("json"); }

        if let Some(v) = get("ADMIN_EMAIL") { self.seeder.admin_email = v; }
        if let Some(v) = get("ADMIN_PASSWORD") { self.seeder.admin_password = v; }
        if let Some(v) = get("ADMIN_NAME") { self.seeder.admin_name = v; }
        if let Some(v) = get("PORTFOLIO_NAME") { self.seeder.portfolio_name = v; }
        if let Some(v) = get("PORTFOLIO_TITLE") { self.seeder.portfolio_title = v; }
        if let Some(v) = get("PORTFOLIO_EMAIL") { self.seeder.portfolio_email = v; }
        if let Some(v) = get("PORTFOLIO_BIO") { self.seeder.portfolio_bio = v; }
        if let Some(v) = get("PORTFOLIO_GITHUB") { self.seeder.portfolio_github = v; }
        if let Some(v) = get("PORTFOLIO_LINKEDIN") { self.seeder.portfolio_linkedin = v; }
        Ok(())
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize("server")?;
        self.auth_server.normalize("auth_server")?;
        self.database.validate()?;
        self.jwt.validate()?;
        if self.redis.detail_ttl_secs == 0 {
            return Err(anyhow!("redis.detail_ttl_secs must be > 0"));
        }
        if self.events.url.trim().is_empty() {
            self.events.url = self.redis.url.clone();
        }
        if self.auth_client.service_url.trim().is_empty() {
            return Err(anyhow!("auth_client.service_url is empty"));
        }
        self.auth_client.service_url = self.auth_client.service_url.trim_end_matches('/').to_string();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self, section: &str) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "0.0.0.0".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("{section}.port must be within 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(n) if n > MAX_WORKER_THREADS => {
                return Err(anyhow!("{section}.worker_threads must be <= {MAX_WORKER_THREADS}"));
            }
            Some(_) => {}
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl JwtConfig {
    pub fn validate(&self) -> Result<()> {
        if self.secret.is_empty() {
            return Err(anyhow!("jwt.secret must not be empty"));
        }
        if self.access_expiry_minutes <= 0 || self.refresh_expiry_hours <= 0 {
            return Err(anyhow!("jwt expiries must be positive"));
        }
        if self.access_expiry_minutes > MAX_ACCESS_EXPIRY_MINUTES {
            return Err(anyhow!("jwt.access_expiry_minutes must be <= {MAX_ACCESS_EXPIRY_MINUTES}"));
        }
        if self.refresh_expiry_hours > MAX_REFRESH_EXPIRY_HOURS {
            return Err(anyhow!("jwt.refresh_expiry_hours must be <= {MAX_REFRESH_EXPIRY_HOURS}"));
        }
        Ok(())
    }
}
