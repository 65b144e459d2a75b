//! Durable key-value slot contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide get/set-by-key access to whole-payload storage slots.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `set` replaces the full value for a key atomically.
//! - Readers see either the previous full value or the new full value,
//!   never a partial payload.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SLOTS_TABLE: &str = "slots";
const SLOTS_COLUMNS: &[&str] = &["key", "value", "updated_at"];

pub type SlotResult<T> = Result<T, SlotError>;

/// Error for slot persistence and repository construction.
#[derive(Debug)]
pub enum SlotError {
    Db(DbError),
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

impl Display for SlotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open via db::open_db"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for SlotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for SlotError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SlotError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Storage contract for named whole-value slots.
///
/// The store depends on this trait rather than on SQLite so tests can
/// substitute in-memory or failing backends.
pub trait SlotRepository {
    /// Reads the current value for `key`, `None` when the slot was never
    /// written.
    fn get(&self, key: &str) -> SlotResult<Option<String>>;

    /// Replaces the full value for `key`, creating the slot on first write.
    fn set(&self, key: &str, value: &str) -> SlotResult<()>;
}

/// SQLite-backed slot repository.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    /// Wraps a migrated connection after verifying the schema it needs.
    ///
    /// # Errors
    /// - `UninitializedConnection` when `PRAGMA user_version` does not
    ///   match the latest migration version.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the slots
    ///   schema is absent or partial.
    pub fn try_new(conn: &'conn Connection) -> SlotResult<Self> {
        let expected_version = latest_version();
        let actual_version =
            conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
        if actual_version != expected_version {
            return Err(SlotError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        ensure_table(conn, SLOTS_TABLE)?;
        for column in SLOTS_COLUMNS.iter().copied() {
            ensure_column(conn, SLOTS_TABLE, column)?;
        }

        Ok(Self { conn })
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn get(&self, key: &str) -> SlotResult<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM slots WHERE key = ?1;", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> SlotResult<()> {
        self.conn.execute(
            "INSERT INTO slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

fn ensure_table(conn: &Connection, table: &'static str) -> SlotResult<()> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    if exists == 0 {
        return Err(SlotError::MissingRequiredTable(table));
    }
    Ok(())
}

fn ensure_column(conn: &Connection, table: &'static str, column: &'static str) -> SlotResult<()> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let name: String = row.get("name")?;
        if name == column {
            return Ok(());
        }
    }
    Err(SlotError::MissingRequiredColumn { table, column })
}
