//! Relational configuration store.
//!
//! One table per definition kind, keyed by definition name. Rows come back in
//! insertion order.

pub mod databases;
pub mod endpoints;
pub mod import;
pub mod queries;

use crate::types::DefinitionKind;
use anyhow::{Context, Result, anyhow, bail};
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Database handle wrapping a SQLite connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open the database at the given path.
    ///
    /// With `create_if_missing` the file and its parent directory are created
    /// as needed; otherwise a missing file is an error.
    pub fn open<P: AsRef<Path>>(path: P, create_if_missing: bool) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            if !create_if_missing {
                bail!("Configuration database not found: {}", path.display());
            }
            if let Some(parent) = path.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory {}", parent.display())
                })?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open configuration database {}", path.display()))?;

        conn.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA busy_timeout=5000;",
        )?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;

        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };

        db.run_migrations()?;

        Ok(db)
    }

    /// Run database migrations.
    fn run_migrations(&self) -> Result<()> {
        self.with_conn_mut(|conn| {
            embedded::migrations::runner()
                .run(conn)
                .context("Failed to run configuration schema migrations")?;
            Ok(())
        })
    }

    /// Execute a function with exclusive access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("configuration database lock poisoned"))?;
        f(&conn)
    }

    /// Execute a function with mutable access to the connection (for transactions).
    pub fn with_conn_mut<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T>,
    {
        let mut conn = self
            .conn
            .lock()
            .map_err(|_| anyhow!("configuration database lock poisoned"))?;
        f(&mut conn)
    }

    /// Number of rows stored for a kind.
    pub fn count(&self, kind: DefinitionKind) -> Result<usize> {
        self.with_conn(|conn| {
            let sql = format!("SELECT COUNT(*) FROM {}", kind.table());
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count as usize)
        })
    }

    /// True when no kind has any rows.
    pub fn is_empty(&self) -> Result<bool> {
        for kind in DefinitionKind::ALL {
            if self.count(kind)? > 0 {
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Get the current timestamp in milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Encode optional metadata as JSON text.
pub(crate) fn to_json_opt<T: serde::Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value
        .as_ref()
        .map(|v| serde_json::to_string(v).map_err(Into::into))
        .transpose()
}

/// Decode optional JSON text, naming the column on failure.
pub(crate) fn from_json_opt<T: serde::de::DeserializeOwned>(
    text: Option<String>,
    column: &str,
    name: &str,
) -> Result<Option<T>> {
    text.map(|t| {
        serde_json::from_str(&t)
            .with_context(|| format!("Invalid JSON in column '{}' of row '{}'", column, name))
    })
    .transpose()
}
