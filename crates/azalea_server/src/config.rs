//! Environment-driven server configuration.
//!
//! # Responsibility
//! - Resolve bind address, database path and logging settings from
//!   `AZALEA_*` environment variables with documented defaults.
//!
//! # Invariants
//! - Invalid values are returned as `ConfigError`, never panics.
//! - `log_dir` is always absolute; relative values resolve against the
//!   working directory.

use azalea_core::default_log_level;
use std::env;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::str::FromStr;

pub const ENV_HOST: &str = "AZALEA_HOST";
pub const ENV_PORT: &str = "AZALEA_PORT";
pub const ENV_DB_PATH: &str = "AZALEA_DB_PATH";
pub const ENV_LOG_DIR: &str = "AZALEA_LOG_DIR";
pub const ENV_LOG_LEVEL: &str = "AZALEA_LOG_LEVEL";

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: &str = "5000";
const DEFAULT_DB_PATH: &str = "rsvp_database.db";
const DEFAULT_LOG_DIR_NAME: &str = "logs";

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    CurrentDir(std::io::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, value, reason } => {
                write!(f, "invalid {key} value `{value}`: {reason}")
            }
            Self::CurrentDir(err) => write!(f, "cannot resolve working directory: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CurrentDir(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    pub log_level: String,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolves configuration through `lookup`, which returns the raw value
    /// for a variable name or `None` when unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let log_dir = PathBuf::from(
            non_blank(lookup(ENV_LOG_DIR)).unwrap_or_else(|| DEFAULT_LOG_DIR_NAME.to_string()),
        );
        let log_dir = if log_dir.is_absolute() {
            log_dir
        } else {
            env::current_dir()
                .map_err(ConfigError::CurrentDir)?
                .join(log_dir)
        };

        Ok(Self {
            host: non_blank(lookup(ENV_HOST)).unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: try_load(&lookup, ENV_PORT, DEFAULT_PORT)?,
            db_path: non_blank(lookup(ENV_DB_PATH))
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                .into(),
            log_dir,
            log_level: non_blank(lookup(ENV_LOG_LEVEL))
                .unwrap_or_else(|| default_log_level().to_string()),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn try_load<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let raw = non_blank(lookup(key)).unwrap_or_else(|| default.to_string());
    raw.parse().map_err(|err: T::Err| ConfigError::InvalidValue {
        key,
        reason: err.to_string(),
        value: raw.clone(),
    })
}
