//! Handles settings for the application. Configuration is read from
//! `settings.toml` (or the file passed with `--config`) and overridden by
//! `SPENDBOOK__<SECTION>__<KEY>` environment variables.
//!
//! See `settings.example.toml` for the available keys.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
    /// IANA time zone used for month boundaries.
    pub timezone: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            timezone: "UTC".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
    pub database: Database,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 5000,
            database: Database::Memory,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Auth {
    /// Token signing secret. Must be set to serve.
    pub secret: String,
    pub token_ttl_days: i64,
    /// Argon2 memory cost in KiB.
    pub password_memory_kib: u32,
    /// Argon2 passes.
    pub password_iterations: u32,
}

impl Default for Auth {
    fn default() -> Self {
        Self {
            secret: String::new(),
            token_ttl_days: 7,
            password_memory_kib: 19_456,
            password_iterations: 2,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub auth: Auth,
}

impl Settings {
    /// The default file is optional; an explicit `path` must exist.
    pub fn new(path: Option<&str>) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(
                File::with_name(path.unwrap_or(DEFAULT_CONFIG_PATH)).required(path.is_some()),
            )
            .add_source(
                Environment::with_prefix("SPENDBOOK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }
}
