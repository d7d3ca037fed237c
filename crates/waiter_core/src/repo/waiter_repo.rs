//! Waiter repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide scoped count/list, lookup, insert, sparse update and hard delete
//!   over the `waiters` table.
//! - Hand out a `UnitOfWork` so callers can group one read-then-write
//!   sequence into a single transaction.
//!
//! # Invariants
//! - Write paths validate records before SQL mutations.
//! - Read paths reject invalid persisted rows instead of masking them.
//! - Listing order is `id ASC`, which is insertion order.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::caller::UserId;
use crate::model::waiter::{Waiter, WaiterCreate, WaiterId, WaiterUpdate, WaiterValidationError};
use crate::policy::ownership::VisibilityScope;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const WAITER_SELECT_SQL: &str = "SELECT
    id,
    owner_id,
    name,
    description
FROM waiters";

const REQUIRED_WAITER_COLUMNS: &[&str] = &[
    "id",
    "owner_id",
    "name",
    "description",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Error raised by waiter persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(WaiterValidationError),
    Db(DbError),
    NotFound(WaiterId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "waiter not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted waiter data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} is behind required {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<WaiterValidationError> for RepoError {
    fn from(value: WaiterValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Scoped store session. Dropping without `commit` rolls back.
///
/// The SQLite unit takes the write lock up front, so concurrent units
/// queue on the busy timeout instead of failing mid-way.
pub trait UnitOfWork {
    fn commit(self: Box<Self>) -> RepoResult<()>;
}

impl UnitOfWork for Transaction<'_> {
    fn commit(self: Box<Self>) -> RepoResult<()> {
        Transaction::commit(*self)?;
        Ok(())
    }
}

/// Persistence contract consumed by the waiter service.
pub trait WaiterRepository {
    /// Opens a unit of work covering subsequent calls until committed or dropped.
    fn begin(&self) -> RepoResult<Box<dyn UnitOfWork + '_>>;
    fn count(&self, scope: VisibilityScope) -> RepoResult<u64>;
    fn list(&self, scope: VisibilityScope, skip: u32, limit: u32) -> RepoResult<Vec<Waiter>>;
    fn get(&self, id: WaiterId) -> RepoResult<Option<Waiter>>;
    /// Persists a new waiter owned by `owner_id` and returns it with its id.
    fn insert(&self, owner_id: UserId, payload: &WaiterCreate) -> RepoResult<Waiter>;
    /// Merges the present fields of `patch` onto `waiter` and persists the result.
    fn apply_update(&self, waiter: &Waiter, patch: &WaiterUpdate) -> RepoResult<Waiter>;
    fn delete(&self, waiter: &Waiter) -> RepoResult<()>;
}

/// SQLite-backed waiter repository.
pub struct SqliteWaiterRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteWaiterRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when the schema version is behind.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the `waiters`
    ///   shape does not match what this repository queries.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl WaiterRepository for SqliteWaiterRepository<'_> {
    fn begin(&self) -> RepoResult<Box<dyn UnitOfWork + '_>> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        Ok(Box::new(tx))
    }

    fn count(&self, scope: VisibilityScope) -> RepoResult<u64> {
        let (filter, bind_values) = scope_filter(scope);
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM waiters{filter};"),
            params_from_iter(bind_values),
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative waiter count `{count}`")))
    }

    fn list(&self, scope: VisibilityScope, skip: u32, limit: u32) -> RepoResult<Vec<Waiter>> {
        let (filter, mut bind_values) = scope_filter(scope);
        let sql = format!("{WAITER_SELECT_SQL}{filter} ORDER BY id ASC LIMIT ? OFFSET ?;");
        bind_values.push(Value::Integer(i64::from(limit)));
        bind_values.push(Value::Integer(i64::from(skip)));

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut waiters = Vec::new();
        while let Some(row) = rows.next()? {
            waiters.push(parse_waiter_row(row)?);
        }
        Ok(waiters)
    }

    fn get(&self, id: WaiterId) -> RepoResult<Option<Waiter>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{WAITER_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_waiter_row(row)?)),
            None => Ok(None),
        }
    }

    fn insert(&self, owner_id: UserId, payload: &WaiterCreate) -> RepoResult<Waiter> {
        payload.validate()?;

        self.conn.execute(
            "INSERT INTO waiters (owner_id, name, description) VALUES (?1, ?2, ?3);",
            params![
                owner_id.to_string(),
                payload.name.as_str(),
                payload.description.as_deref(),
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        self.get(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted waiter {id} missing on read-back"))
        })
    }

    fn apply_update(&self, waiter: &Waiter, patch: &WaiterUpdate) -> RepoResult<Waiter> {
        let mut merged = waiter.clone();
        merged.apply(patch);
        merged.validate()?;

        let changed = self.conn.execute(
            "UPDATE waiters
             SET
                name = ?1,
                description = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?3;",
            params![merged.name.as_str(), merged.description.as_deref(), merged.id],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(waiter.id));
        }

        Ok(merged)
    }

    fn delete(&self, waiter: &Waiter) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM waiters WHERE id = ?1;", [waiter.id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(waiter.id));
        }
        Ok(())
    }
}

fn scope_filter(scope: VisibilityScope) -> (&'static str, Vec<Value>) {
    match scope {
        VisibilityScope::All => ("", Vec::new()),
        VisibilityScope::Owner(owner_id) => (
            " WHERE owner_id = ?",
            vec![Value::Text(owner_id.to_string())],
        ),
    }
}

fn parse_waiter_row(row: &Row<'_>) -> RepoResult<Waiter> {
    let owner_text: String = row.get("owner_id")?;
    let owner_id = Uuid::parse_str(&owner_text).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid uuid value `{owner_text}` in waiters.owner_id"
        ))
    })?;

    let waiter = Waiter {
        id: row.get("id")?,
        owner_id,
        name: row.get("name")?,
        description: row.get("description")?,
    };
    waiter.validate()?;
    Ok(waiter)
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'waiters'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable("waiters"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(waiters);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;
    for &column in REQUIRED_WAITER_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: "waiters",
                column,
            });
        }
    }

    Ok(())
}
