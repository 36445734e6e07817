//! Service layer for snapshot operations.
//!
//! `StoreService` wraps `LudoDb` (raw database access), the audit sink, and
//! the in-process restore lock. Export and restore are implemented as
//! `impl StoreService` blocks in the `backup` module.

use std::sync::Arc;

use ludo_config::{BackupConfig, LudoConfig};
use ludo_core::audit::AuditEntry;
use tokio::sync::Mutex;

use crate::LudoDb;
use crate::error::DatabaseError;
use crate::repos::audit::{AuditSink, DbAuditSink};

pub struct StoreService {
    db: LudoDb,
    audit: Arc<dyn AuditSink>,
    /// Held for the lifetime of every restore transaction. On `:memory:`
    /// stores, exports take it too because they share the one connection.
    restore_lock: Arc<Mutex<()>>,
    backup: BackupConfig,
}

impl StoreService {
    /// Wrap an open database, auditing into its own `audit_log` table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the audit connection cannot be opened.
    pub async fn new(db: LudoDb) -> Result<Self, DatabaseError> {
        let audit = Arc::new(DbAuditSink::new(db.connect().await?));
        Ok(Self::with_audit_sink(db, audit))
    }

    /// Open a local database (file path or `:memory:`) with default tuning.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(path: &str) -> Result<Self, DatabaseError> {
        Self::new(LudoDb::open_local(path).await?).await
    }

    /// Open the store described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn from_config(config: &LudoConfig) -> Result<Self, DatabaseError> {
        let service = Self::new(LudoDb::open(&config.database).await?).await?;
        Ok(service.with_backup_config(config.backup.clone()))
    }

    /// Use a caller-supplied audit sink.
    #[must_use]
    pub fn with_audit_sink(db: LudoDb, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            db,
            audit,
            restore_lock: Arc::new(Mutex::new(())),
            backup: BackupConfig::default(),
        }
    }

    #[must_use]
    pub fn with_backup_config(mut self, backup: BackupConfig) -> Self {
        self.backup = backup;
        self
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &LudoDb {
        &self.db
    }

    #[must_use]
    pub const fn backup_config(&self) -> &BackupConfig {
        &self.backup
    }

    pub(crate) fn restore_lock(&self) -> Arc<Mutex<()>> {
        Arc::clone(&self.restore_lock)
    }

    /// Record an audit entry, logging and discarding any failure.
    ///
    /// On `:memory:` stores the write takes the restore lock, so it can never
    /// land inside (and be rolled back with) a restore transaction on the
    /// shared connection. Callers must not hold the lock themselves.
    pub(crate) async fn record_audit(&self, entry: AuditEntry) {
        let _shared_conn = if self.db.is_in_memory() {
            Some(self.restore_lock.lock().await)
        } else {
            None
        };
        if let Err(error) = self.audit.record(&entry).await {
            tracing::warn!(
                %error,
                action = %entry.action,
                actor = %entry.actor,
                "audit write failed; continuing"
            );
        }
    }
}
