//! Server configuration: TOML file, environment, then CLI flags.

use std::path::Path;
use std::str::FromStr;

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::db::Provider;

/// Default configuration file looked up next to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "puzzlechat.toml";

/// Server configuration.
///
/// Precedence, lowest to highest: built-in defaults, the TOML file,
/// `PUZZLECHAT_*` environment variables, CLI flags.
#[derive(Debug, Clone, Getters, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Database backend to use.
    #[serde(default)]
    provider: Provider,

    /// Database file path.
    #[serde(default = "default_db_path")]
    db_path: String,

    /// Bind host.
    #[serde(default = "default_host")]
    host: String,

    /// Bind port.
    #[serde(default = "default_port")]
    port: u16,
}

fn default_db_path() -> String {
    "puzzlechat.db".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            provider: Provider::default(),
            db_path: default_db_path(),
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or parsed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        debug!("Loading config from file");
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::new(format!("Failed to read config file: {}", e)))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| ConfigError::new(format!("Failed to parse config: {}", e)))?;

        info!(provider = %config.provider, db_path = %config.db_path, "Config loaded");
        Ok(config)
    }

    /// Loads configuration: the given file (or `puzzlechat.toml` if present),
    /// then environment overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] on unreadable files or malformed values.
    #[instrument(skip(path))]
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::from_file(default)?
                } else {
                    Self::default()
                }
            }
        };
        config.apply_env()?;
        Ok(config)
    }

    /// Applies `PUZZLECHAT_*` environment variable overrides.
    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(provider) = std::env::var("PUZZLECHAT_PROVIDER") {
            self.provider = Provider::from_str(&provider)
                .map_err(|_| ConfigError::new(format!("Unknown provider '{}'", provider)))?;
        }
        if let Ok(db_path) = std::env::var("PUZZLECHAT_DB") {
            self.db_path = db_path;
        }
        if let Ok(host) = std::env::var("PUZZLECHAT_HOST") {
            self.host = host;
        }
        if let Ok(port) = std::env::var("PUZZLECHAT_PORT") {
            self.port = port
                .parse()
                .map_err(|_| ConfigError::new(format!("Invalid port '{}'", port)))?;
        }
        Ok(())
    }

    /// Overrides the database path (CLI flag).
    pub fn set_db_path(&mut self, db_path: String) {
        self.db_path = db_path;
    }

    /// Overrides the bind host (CLI flag).
    pub fn set_host(&mut self, host: String) {
        self.host = host;
    }

    /// Overrides the bind port (CLI flag).
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }
}

/// Configuration error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: String) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message,
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = ServerConfig::default();
        assert_eq!(config.provider(), &Provider::Sqlite);
        assert_eq!(config.db_path(), "puzzlechat.db");
        assert_eq!(*config.port(), 3000);
    }

    #[test]
    fn parses_partial_toml() {
        let config: ServerConfig = toml::from_str("db_path = \"custom.db\"\nport = 8080\n")
            .expect("Parse failed");
        assert_eq!(config.db_path(), "custom.db");
        assert_eq!(*config.port(), 8080);
        assert_eq!(config.provider(), &Provider::Sqlite);
    }

    #[test]
    fn rejects_unknown_provider_string() {
        let result: Result<ServerConfig, _> = toml::from_str("provider = \"oracle\"\n");
        assert!(result.is_err());
    }
}
