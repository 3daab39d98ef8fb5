use serde::{Deserialize, Serialize};

use super::database::DatabaseConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;
use super::notify::NotifyConfig;
use super::server::ServerConfig;
use super::upstream::UpstreamConfig;

/// Main configuration structure for Warden DNS
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Listener configuration (bind address, port, label)
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream resolver the proxy forwards to
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// Reputation database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Session announcement webhook
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from file or use defaults
    ///
    /// Priority order:
    /// 1. Explicitly provided path
    /// 2. warden-dns.toml in current directory
    /// 3. /etc/warden-dns/config.toml
    /// 4. Default configuration
    pub fn load(path: Option<&str>, cli_overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = path {
            Self::from_file(path)?
        } else if std::path::Path::new("warden-dns.toml").exists() {
            Self::from_file("warden-dns.toml")?
        } else if std::path::Path::new("/etc/warden-dns/config.toml").exists() {
            Self::from_file("/etc/warden-dns/config.toml")?
        } else {
            Self::default()
        };

        config.apply_cli_overrides(cli_overrides);
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileRead(path.to_string(), e.to_string()))?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Apply command-line overrides to configuration
    fn apply_cli_overrides(&mut self, overrides: CliOverrides) {
        if let Some(bind) = overrides.bind_address {
            self.server.bind_address = bind;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(upstream) = overrides.upstream {
            self.upstream.address = upstream;
        }
        if let Some(db) = overrides.database_path {
            self.database.path = db;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "Listener port cannot be 0".to_string(),
            ));
        }

        if self.upstream.address.is_empty() {
            return Err(ConfigError::Validation(
                "No upstream server configured".to_string(),
            ));
        }

        if self.server.max_inflight == 0 {
            return Err(ConfigError::Validation(
                "server.max_inflight must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<(), ConfigError> {
        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Parse(format!("Failed to serialize config: {}", e)))?;
        if let Some(dir) = std::path::Path::new(path).parent() {
            std::fs::create_dir_all(dir)
                .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        }
        std::fs::write(path, toml_string)
            .map_err(|e| ConfigError::FileWrite(path.to_string(), e.to_string()))?;
        Ok(())
    }

    /// Get the path to the configuration file being used
    pub fn config_path() -> Option<String> {
        if std::path::Path::new("warden-dns.toml").exists() {
            Some("warden-dns.toml".to_string())
        } else if std::path::Path::new("/etc/warden-dns/config.toml").exists() {
            Some("/etc/warden-dns/config.toml".to_string())
        } else {
            None
        }
    }
}

/// Command-line overrides for configuration
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub bind_address: Option<String>,
    pub port: Option<u16>,
    pub upstream: Option<String>,
    pub database_path: Option<String>,
    pub log_level: Option<String>,
}
