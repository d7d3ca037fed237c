//! Runtime configuration for hosts embedding the waiter core.
//!
//! # Responsibility
//! - Resolve database target, logging and pagination defaults from
//!   environment-style keys.
//! - Reject malformed values up front instead of at first use.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, normalize_level};
use crate::service::waiter_service::{WaiterListQuery, DEFAULT_LIST_LIMIT};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "WAITER_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "WAITER_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "WAITER_LOG_DIR";
pub const ENV_PAGE_LIMIT: &str = "WAITER_PAGE_LIMIT";

const IN_MEMORY_MARKER: &str = ":memory:";

/// Where waiter data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseTarget {
    Memory,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub database: DatabaseTarget,
    pub log_level: &'static str,
    /// File logging stays off when unset.
    pub log_dir: Option<PathBuf>,
    pub default_page_limit: u32,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            database: DatabaseTarget::Memory,
            log_level: default_log_level(),
            log_dir: None,
            default_page_limit: DEFAULT_LIST_LIMIT,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidValue { key: &'static str, message: String },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {}

impl CoreConfig {
    /// Loads configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let mut config = Self::default();

        if let Some(path) = read(ENV_DB_PATH) {
            if path != IN_MEMORY_MARKER {
                config.database = DatabaseTarget::File(PathBuf::from(path));
            }
        }

        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = normalize_level(&level).map_err(|err| ConfigError::InvalidValue {
                key: ENV_LOG_LEVEL,
                message: err.to_string(),
            })?;
        }

        if let Some(dir) = read(ENV_LOG_DIR) {
            let dir = PathBuf::from(dir);
            if !dir.is_absolute() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_LOG_DIR,
                    message: format!("must be an absolute path, got `{}`", dir.display()),
                });
            }
            config.log_dir = Some(dir);
        }

        if let Some(limit) = read(ENV_PAGE_LIMIT) {
            config.default_page_limit = match limit.parse::<u32>() {
                Ok(value) if value > 0 => value,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_PAGE_LIMIT,
                        message: format!("expected a positive integer, got `{limit}`"),
                    })
                }
            };
        }

        Ok(config)
    }

    /// Builds a list window from optional request parameters.
    pub fn list_query(&self, skip: Option<u32>, limit: Option<u32>) -> WaiterListQuery {
        WaiterListQuery {
            skip: skip.unwrap_or(0),
            limit: limit.unwrap_or(self.default_page_limit),
        }
    }

    /// Opens and migrates the configured database.
    pub fn open_database(&self) -> DbResult<Connection> {
        match &self.database {
            DatabaseTarget::Memory => open_db_in_memory(),
            DatabaseTarget::File(path) => open_db(path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        ConfigError, CoreConfig, DatabaseTarget, ENV_DB_PATH, ENV_LOG_DIR, ENV_LOG_LEVEL,
        ENV_PAGE_LIMIT,
    };
    use std::collections::HashMap;
    use std::path::PathBuf;

    fn load(pairs: &[(&str, &str)]) -> Result<CoreConfig, ConfigError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        CoreConfig::from_lookup(|key| values.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let config = load(&[]).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.default_page_limit, 100);
        assert_eq!(config.database, DatabaseTarget::Memory);
    }

    #[test]
    fn reads_all_keys() {
        let config = load(&[
            (ENV_DB_PATH, "/var/lib/waiters.sqlite3"),
            (ENV_LOG_LEVEL, " WARNING "),
            (ENV_LOG_DIR, "/var/log/waiters"),
            (ENV_PAGE_LIMIT, "25"),
        ])
        .unwrap();
        assert_eq!(
            config.database,
            DatabaseTarget::File(PathBuf::from("/var/lib/waiters.sqlite3"))
        );
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, Some(PathBuf::from("/var/log/waiters")));
        assert_eq!(config.default_page_limit, 25);
    }

    #[test]
    fn memory_marker_and_blank_values_keep_defaults() {
        let config = load(&[(ENV_DB_PATH, ":memory:"), (ENV_LOG_DIR, "  ")]).unwrap();
        assert_eq!(config.database, DatabaseTarget::Memory);
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn rejects_relative_log_dir() {
        let err = load(&[(ENV_LOG_DIR, "logs")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_LOG_DIR));
    }

    #[test]
    fn rejects_zero_and_non_numeric_page_limit() {
        for raw in ["0", "ten", "-1"] {
            let err = load(&[(ENV_PAGE_LIMIT, raw)]).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { key, .. } if key == ENV_PAGE_LIMIT));
        }
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = load(&[(ENV_LOG_LEVEL, "loud")]).unwrap_err();
        assert!(err.to_string().contains(ENV_LOG_LEVEL));
    }

    #[test]
    fn list_query_falls_back_to_configured_limit() {
        let config = load(&[(ENV_PAGE_LIMIT, "20")]).unwrap();
        let query = config.list_query(None, None);
        assert_eq!(query.skip, 0);
        assert_eq!(query.limit, 20);

        let explicit = config.list_query(Some(40), Some(500));
        assert_eq!(explicit.skip, 40);
        assert_eq!(explicit.limit, 500);
    }

    #[test]
    fn open_database_uses_configured_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waiters.sqlite3");
        let config = CoreConfig {
            database: DatabaseTarget::File(path.clone()),
            ..CoreConfig::default()
        };
        config.open_database().unwrap();
        assert!(path.exists());
    }
}
