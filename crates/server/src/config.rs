//! Server configuration from defaults, environment and CLI flags.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Default host address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default port number
pub const DEFAULT_PORT: u16 = 8000;

/// Default snapshot directory
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default address of the demand model service
pub const DEFAULT_CLASSIFIER_ADDR: &str = "http://127.0.0.1:50051";

/// Default log filter when RUST_LOG is not set
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Prefix of every environment variable read by [`ServerConfig::from_env`]
pub const ENV_PREFIX: &str = "ROUTESAATHI_";

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Port must be non-zero")]
    ZeroPort,

    #[error("Data directory must not be empty")]
    EmptyDataDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding user.json, stats.json and fleet.json
    pub data_dir: PathBuf,
    /// gRPC address of the demand model. Empty disables the model.
    pub classifier_addr: String,
    pub log_level: String,
}

/// Values given explicitly on the command line. `None` keeps whatever the
/// environment or the defaults provided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub classifier_addr: Option<String>,
    pub log_level: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            classifier_addr: DEFAULT_CLASSIFIER_ADDR.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by `ROUTESAATHI_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overridden by whatever `lookup` returns for
    /// HOST, PORT, DATA_DIR, CLASSIFIER_ADDR and LOG_LEVEL (prefixed).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut config = Self::default();

        if let Some(host) = get("HOST") {
            config.host = host;
        }
        if let Some(port) = get("PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidValue {
                key: format!("{ENV_PREFIX}PORT"),
                value: port.clone(),
            })?;
        }
        if let Some(dir) = get("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(addr) = get("CLASSIFIER_ADDR") {
            config.classifier_addr = addr;
        }
        if let Some(level) = get("LOG_LEVEL") {
            config.log_level = level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Layer explicit flags on top of this configuration and re-validate
    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        if let Some(host) = overrides.host {
            self.host = host;
        }
        if let Some(port) = overrides.port {
            self.port = port;
        }
        if let Some(dir) = overrides.data_dir {
            self.data_dir = dir;
        }
        if let Some(addr) = overrides.classifier_addr {
            self.classifier_addr = addr;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }

        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::ZeroPort);
        }
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }
        Ok(())
    }

    /// Whether a model service address is configured
    pub fn classifier_enabled(&self) -> bool {
        !self.classifier_addr.trim().is_empty()
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: "host".to_string(),
                value: self.host.clone(),
            })
    }
}
