//! # Server Configuration
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SERVER_PORT`, `DATABASE_PATH`, ...)
//! 2. Config file (`madang.toml`, from `--config` or `MADANG_CONFIG`)
//! 3. Defaults (this file)
//!
//! ## File Format
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [database]
//! path = "./madang.db"
//! max_connections = 5
//! min_connections = 1
//! acquire_timeout_secs = 30
//!
//! [session]
//! timeout_secs = 7200
//! sweep_interval_secs = 300
//! ```
//!
//! Every key maps to an environment variable named `<SECTION>_<KEY>` in
//! upper case, e.g. `session.timeout_secs` → `SESSION_TIMEOUT_SECS`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use madang_db::DbConfig;

/// Server configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: HttpSection,
    pub database: DatabaseSection,
    pub session: SessionSection,
}

/// `[server]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSection {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,
}

impl Default for HttpSection {
    fn default() -> Self {
        HttpSection {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSection {
    /// SQLite file path (created if missing)
    pub path: PathBuf,

    pub max_connections: u32,

    pub min_connections: u32,

    /// How long a request waits for a pooled connection
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        DatabaseSection {
            path: PathBuf::from("./madang.db"),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 30,
        }
    }
}

/// `[session]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// Idle lifetime of a login session (default: 2 hours)
    pub timeout_secs: u64,

    /// How often expired sessions are swept
    pub sweep_interval_secs: u64,
}

impl Default for SessionSection {
    fn default() -> Self {
        SessionSection {
            timeout_secs: 7200,
            sweep_interval_secs: 300,
        }
    }
}

impl ServerConfig {
    /// Loads the config file (if given), applies environment overrides and
    /// validates the result.
    ///
    /// A path that does not exist yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let text = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                ServerConfig::from_toml(&text)?
            }
            _ => ServerConfig::default(),
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Parses a TOML document. Missing sections and keys take defaults.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies `<SECTION>_<KEY>` overrides read through `lookup`.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        override_parsed(&lookup, "SERVER_PORT", &mut self.server.port)?;

        if let Some(path) = lookup("DATABASE_PATH") {
            self.database.path = PathBuf::from(path);
        }
        override_parsed(&lookup, "DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections)?;
        override_parsed(&lookup, "DATABASE_MIN_CONNECTIONS", &mut self.database.min_connections)?;
        override_parsed(
            &lookup,
            "DATABASE_ACQUIRE_TIMEOUT_SECS",
            &mut self.database.acquire_timeout_secs,
        )?;

        override_parsed(&lookup, "SESSION_TIMEOUT_SECS", &mut self.session.timeout_secs)?;
        override_parsed(
            &lookup,
            "SESSION_SWEEP_INTERVAL_SECS",
            &mut self.session.sweep_interval_secs,
        )?;
        Ok(())
    }

    /// Rejects values the server cannot start with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::InvalidValue("server.host".to_string()));
        }
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port".to_string()));
        }
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("database.path".to_string()));
        }
        if self.database.max_connections == 0
            || self.database.min_connections > self.database.max_connections
        {
            return Err(ConfigError::InvalidValue(
                "database.max_connections".to_string(),
            ));
        }
        if self.session.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("session.timeout_secs".to_string()));
        }
        if self.session.sweep_interval_secs == 0 {
            return Err(ConfigError::InvalidValue(
                "session.sweep_interval_secs".to_string(),
            ));
        }
        Ok(())
    }

    /// `host:port` to bind.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Pool settings for [`madang_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database.path)
            .max_connections(self.database.max_connections)
            .min_connections(self.database.min_connections)
            .connect_timeout(Duration::from_secs(self.database.acquire_timeout_secs))
    }

    pub fn session_timeout(&self) -> Duration {
        Duration::from_secs(self.session.timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.session.sweep_interval_secs)
    }
}

fn override_parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    target: &mut T,
) -> Result<(), ConfigError> {
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string()))?;
    }
    Ok(())
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Invalid config file: {0}")]
    Parse(String),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
