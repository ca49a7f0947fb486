use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub scheduler: SchedulerConfig,
    pub facebook: FacebookConfig,
    pub google: GoogleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `json` or `pretty`.
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Span lifecycle events to emit: `none`, `close`, or `full`.
    #[serde(default = "default_span_events")]
    pub span_events: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Master switch for the background export job.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// How often the export job evaluates due configs. The daily due window
    /// in the recurrence evaluator is sized for the 15-minute default.
    #[serde(default = "default_tick_minutes")]
    pub tick_minutes: u64,

    /// Grace period for in-flight jobs on shutdown.
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FacebookConfig {
    /// Graph API root including version, no trailing slash.
    #[serde(default = "default_graph_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GoogleConfig {
    #[serde(default = "default_sheets_base_url")]
    pub sheets_base_url: String,

    #[serde(default = "default_token_url")]
    pub token_url: String,

    /// OAuth client used to refresh stored user tokens.
    #[serde(default)]
    pub client_id: String,

    #[serde(default)]
    pub client_secret: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("ADX").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }

    /// Pool settings in the persistence crate's shape.
    pub fn pool_config(&self) -> persistence::db::PoolConfig {
        persistence::db::PoolConfig {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            acquire_timeout_secs: self.database.connect_timeout_secs,
            idle_timeout_secs: self.database.idle_timeout_secs,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    30
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_span_events() -> String {
    "close".to_string()
}

fn default_true() -> bool {
    true
}

fn default_tick_minutes() -> u64 {
    15
}

fn default_shutdown_grace() -> u64 {
    30
}

fn default_graph_base_url() -> String {
    "https://graph.facebook.com/v19.0".to_string()
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "server": {},
            "database": { "url": "postgres://localhost/ads_exporter" },
            "logging": {},
            "scheduler": {},
            "facebook": {},
            "google": {},
        }))
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.span_events, "close");
        assert_eq!(config.scheduler.tick_minutes, 15);
        assert!(config.scheduler.enabled);
        assert!(config.facebook.base_url.starts_with("https://graph.facebook.com/"));
        assert!(config.google.token_url.contains("oauth2.googleapis.com"));
    }

    #[test]
    fn test_socket_addr() {
        let config: Config = serde_json::from_value(serde_json::json!({
            "server": { "host": "127.0.0.1", "port": 9999 },
            "database": { "url": "postgres://localhost/x" },
            "logging": {},
            "scheduler": {},
            "facebook": {},
            "google": {},
        }))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:9999");
    }
}
