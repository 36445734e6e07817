//! # ludo-db
//!
//! libSQL store for the Ludo storefront's ten managed entity kinds.
//!
//! Hosts the schema and its table descriptors, the audit repository, and the
//! snapshot subsystem: the exporter that reads every managed table into one
//! consistent document, and the restore engine that atomically replaces the
//! whole dataset with a document's contents.
//!
//! Uses the `libsql` crate in local mode (v0.9.29).

pub mod backup;
pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod schema;
pub mod service;

use std::time::Duration;

use error::DatabaseError;
use libsql::Builder;
use ludo_config::{DatabaseConfig, IN_MEMORY};

/// Busy timeout used when no configuration is supplied.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Central database handle.
///
/// File-backed databases hand out a fresh connection per [`LudoDb::connect`]
/// call, so exports and restores each get their own transaction scope.
/// In-memory databases exist only inside one connection, which is shared.
pub struct LudoDb {
    db: libsql::Database,
    conn: libsql::Connection,
    in_memory: bool,
    busy_timeout: Duration,
}

impl LudoDb {
    /// Open a local database at the given path, or `:memory:`.
    ///
    /// Runs migrations automatically on first open.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        Self::open_local_with(path, DEFAULT_BUSY_TIMEOUT).await
    }

    /// Open with an explicit busy timeout for competing writers.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local_with(path: &str, busy_timeout: Duration) -> Result<Self, DatabaseError> {
        let in_memory = path == IN_MEMORY;
        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        configure(&conn, in_memory, busy_timeout).await?;

        let ludo_db = Self {
            db,
            conn,
            in_memory,
            busy_timeout,
        };
        ludo_db.run_migrations().await?;
        Ok(ludo_db)
    }

    /// Open from the `database` config section.
    ///
    /// # Errors
    ///
    /// See [`LudoDb::open_local`].
    pub async fn open(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        Self::open_local_with(&config.path, Duration::from_millis(config.busy_timeout_ms)).await
    }

    /// The primary connection.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    #[must_use]
    pub const fn is_in_memory(&self) -> bool {
        self.in_memory
    }

    /// A connection with its own transaction scope.
    ///
    /// For `:memory:` this is the shared primary connection; callers that need
    /// isolation must serialise on it themselves.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if a new connection cannot be configured.
    pub async fn connect(&self) -> Result<libsql::Connection, DatabaseError> {
        if self.in_memory {
            return Ok(self.conn.clone());
        }
        let conn = self.db.connect()?;
        configure(&conn, false, self.busy_timeout).await?;
        Ok(conn)
    }

    /// Row count of one table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn count(&self, table: &str) -> Result<u64, DatabaseError> {
        let mut rows = self
            .conn
            .query(&format!("SELECT COUNT(*) FROM {table}"), ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let n = row.get::<i64>(0)?;
        u64::try_from(n).map_err(|_| DatabaseError::InvalidState(format!("negative count {n}")))
    }
}

/// Per-connection pragmas.
async fn configure(
    conn: &libsql::Connection,
    in_memory: bool,
    busy_timeout: Duration,
) -> Result<(), DatabaseError> {
    // Enable foreign keys (must be per-connection in SQLite)
    conn.execute("PRAGMA foreign_keys = ON", ())
        .await
        .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

    if in_memory {
        return Ok(());
    }

    // Both pragmas answer with a row, so they go through `query`.
    for pragma in [
        "PRAGMA journal_mode = WAL".to_string(),
        format!("PRAGMA busy_timeout = {}", busy_timeout.as_millis()),
    ] {
        let mut rows = conn
            .query(&pragma, ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("{pragma}: {e}")))?;
        rows.next().await?;
    }
    Ok(())
}
