use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the SQLite database when no explicit URL is set
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Full database URL (e.g. `sqlite:./data/eval360.db?mode=rwc`)
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

impl ServerConfig {
    /// The database URL to connect to, derived from `data_dir` when not set.
    pub fn database_url(&self) -> String {
        match &self.database_url {
            Some(url) => url.clone(),
            None => format!(
                "sqlite:{}?mode=rwc",
                self.data_dir.join("eval360.db").display()
            ),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_max_connections() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing access tokens
    #[serde(default = "default_jwt_secret")]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: i64,
    /// Admin account created at startup when no user has this email
    #[serde(default)]
    pub admin_email: Option<String>,
    #[serde(default)]
    pub admin_password: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: default_jwt_secret(),
            token_ttl_hours: default_token_ttl_hours(),
            admin_email: None,
            admin_password: None,
        }
    }
}

fn default_jwt_secret() -> String {
    // Random per process: issued tokens stop validating after a restart
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Ten years
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 365 * 10;

fn default_token_ttl_hours() -> i64 {
    DEFAULT_TOKEN_TTL_HOURS
}

impl AuthConfig {
    /// Token lifetime, or `None` when `token_ttl_hours` is outside `1..=MAX_TOKEN_TTL_HOURS`
    pub fn token_ttl(&self) -> Option<chrono::Duration> {
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&self.token_ttl_hours) {
            return None;
        }
        chrono::Duration::try_hours(self.token_ttl_hours)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::from_toml(&content)?
        } else {
            info!("No config file found, using defaults");
            Config::default()
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(content).with_context(|| "Failed to parse configuration file")?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would fail later at runtime
    pub fn validate(&self) -> Result<()> {
        if self.auth.token_ttl().is_none() {
            bail!(
                "auth.token_ttl_hours must be between 1 and {}, got {}",
                MAX_TOKEN_TTL_HOURS,
                self.auth.token_ttl_hours
            );
        }
        Ok(())
    }

    /// Environment variables take precedence over the config file.
    fn apply_env_overrides(&mut self) {
        if let Ok(secret) = std::env::var("EVAL360_JWT_SECRET") {
            self.auth.jwt_secret = secret;
        }
        if let Ok(url) = std::env::var("EVAL360_DATABASE_URL") {
            self.server.database_url = Some(url);
        }
        if let Ok(port) = std::env::var("PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid PORT"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.auth.jwt_secret.len(), 64);
        assert!(config.server.database_url().starts_with("sqlite:"));
        assert!(config.server.database_url().ends_with("eval360.db?mode=rwc"));
    }

    #[test]
    fn test_partial_toml() {
        let config = Config::from_toml(
            r#"
            [server]
            port = 8081
            database_url = "sqlite::memory:"

            [auth]
            jwt_secret = "0123456789abcdef0123456789abcdef"
            admin_email = "root@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.database_url(), "sqlite::memory:");
        assert_eq!(config.auth.jwt_secret, "0123456789abcdef0123456789abcdef");
        assert_eq!(config.auth.admin_email.as_deref(), Some("root@example.com"));
        assert!(config.auth.admin_password.is_none());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::from_toml("[server]\nport = \"not a port\"").is_err());
    }

    #[test]
    fn test_token_ttl_out_of_range_rejected() {
        for hours in ["0", "-5", "9223372036854775807", "87601"] {
            let err = Config::from_toml(&format!("[auth]\ntoken_ttl_hours = {}", hours))
                .unwrap_err();
            assert!(
                err.to_string().contains("token_ttl_hours"),
                "unexpected error for {}: {}",
                hours,
                err
            );
        }
    }

    #[test]
    fn test_token_ttl() {
        let config = Config::from_toml("[auth]\ntoken_ttl_hours = 2").unwrap();
        assert_eq!(config.auth.token_ttl(), Some(chrono::Duration::hours(2)));

        let config = Config::from_toml(&format!(
            "[auth]\ntoken_ttl_hours = {}",
            MAX_TOKEN_TTL_HOURS
        ))
        .unwrap();
        assert!(config.auth.token_ttl().is_some());

        let auth = AuthConfig {
            token_ttl_hours: i64::MAX,
            ..AuthConfig::default()
        };
        assert!(auth.token_ttl().is_none());
        assert!(Config { auth, ..Config::default() }.validate().is_err());
    }
}
