//! TOML configuration for the `lifetax` binary.
//!
//! ```toml
//! default_province = "british_columbia"
//! retention_days = 365
//! format = "table"
//! rates_dir = "rates"
//! log_file = "lifetax.log"
//!
//! [database]
//! backend = "sqlite"
//! connection_string = "lifetax.db"
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::fs;
use std::path::{Path, PathBuf};

use lifetax_core::db::{DEFAULT_RETENTION_DAYS, DbConfig};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::report::OutputFormat;

/// Looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "lifetax.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("retention_days must be positive, got {0}")]
    InvalidRetention(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DbConfig,

    /// Province code used when `--province` is not given.
    pub default_province: String,

    /// Days a saved income history stays retrievable.
    pub retention_days: i64,

    /// Directory with `federal.csv`, `provincial.csv` and optionally
    /// `surtax.csv`. The bundled tables are used when unset.
    pub rates_dir: Option<PathBuf>,

    pub format: OutputFormat,

    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: DbConfig::default(),
            default_province: "ontario".to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
            rates_dir: None,
            format: OutputFormat::Table,
            log_file: None,
        }
    }
}

impl Config {
    /// Loads `path`, or [`DEFAULT_CONFIG_FILE`] if it exists, or the
    /// defaults. An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&contents).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.display().to_string(),
                source,
            },
            other => other,
        })
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: "<string>".to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.retention_days <= 0 {
            return Err(ConfigError::InvalidRetention(self.retention_days));
        }
        Ok(())
    }
}
