//! Waiter store bootstrap.
//!
//! Every connection handed out here has foreign keys on, a busy timeout set
//! and the `waiters` schema migrated to the version this build ships.
//! The applied version lives in `PRAGMA user_version`; a store stamped with a
//! higher version is refused rather than opened.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Failure while opening or migrating the waiter store.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The store file was written by a newer build with unknown waiter tables.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "waiter store error: {err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "waiter store is at schema v{db_version}; this build only knows up to v{latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
