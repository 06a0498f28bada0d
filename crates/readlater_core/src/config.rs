//! Store configuration.
//!
//! # Responsibility
//! - Describe where the viewer database and rolling logs live.
//! - Open a ready-to-use store from one validated configuration.
//!
//! # Invariants
//! - `db_path` and `log_dir` are absolute after `validate()` succeeds.

use crate::db::{open_db, DbError};
use crate::logging::{default_log_level, init_logging, normalize_level, LoggingError};
use rusqlite::Connection;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

const DB_FILE_NAME: &str = "readlater.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Configuration errors raised before any storage is touched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must be an absolute path, got `{}`", .path.display())]
    RelativePath { field: &'static str, path: PathBuf },
    #[error("{field} must be valid UTF-8, got `{}`", .path.display())]
    NonUtf8Path { field: &'static str, path: PathBuf },
    #[error("failed to create data directory `{}`: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Db(#[from] DbError),
}

/// Host-provided settings for the local viewer store.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// SQLite database file.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    #[serde(default = "default_level_string")]
    pub log_level: String,
    /// Directory for rolling log files.
    pub log_dir: PathBuf,
}

impl StoreConfig {
    /// Lays out database and logs under one application data directory.
    pub fn for_data_dir(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_level: default_level_string(),
            log_dir: data_dir.join(LOG_DIR_NAME),
        }
    }

    /// Checks paths are absolute, `log_dir` is UTF-8 and the log level is known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, path) in [("db_path", &self.db_path), ("log_dir", &self.log_dir)] {
            if !path.is_absolute() {
                return Err(ConfigError::RelativePath {
                    field,
                    path: path.clone(),
                });
            }
        }
        self.log_dir_str()?;
        normalize_level(&self.log_level)?;
        Ok(())
    }

    fn log_dir_str(&self) -> Result<&str, ConfigError> {
        self.log_dir.to_str().ok_or_else(|| ConfigError::NonUtf8Path {
            field: "log_dir",
            path: self.log_dir.clone(),
        })
    }
}

/// Initializes logging and opens the migrated viewer database.
///
/// # Errors
/// - Configuration, logging or database bootstrap failures, unchanged.
pub fn open_store(config: &StoreConfig) -> Result<Connection, ConfigError> {
    config.validate()?;
    init_logging(&config.log_level, config.log_dir_str()?)?;
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    Ok(open_db(&config.db_path)?)
}

fn default_level_string() -> String {
    default_log_level().to_string()
}
