//! Error types for ludo-db.

use std::fmt;

use ludo_core::entity::EntityKind;
use ludo_core::errors::{CyclicDependencyError, SnapshotError};
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in DB).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),
}

/// Step of the restore transaction that was running when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestorePhase {
    Begin,
    Delete,
    Insert,
    Sequence,
    Commit,
}

impl RestorePhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Begin => "begin",
            Self::Delete => "delete",
            Self::Insert => "insert",
            Self::Sequence => "sequence",
            Self::Commit => "commit",
        }
    }
}

impl fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors from snapshot export and restore.
#[derive(Debug, Error)]
pub enum BackupError {
    /// The uploaded document is missing required structure. Nothing was mutated.
    #[error("{0}")]
    Validation(String),

    /// A statement inside the restore transaction failed; the transaction was
    /// rolled back and the dataset is unchanged.
    #[error("Restore failed during {phase}{}: {source}", entity_suffix(.entity))]
    Transaction {
        phase: RestorePhase,
        entity: Option<EntityKind>,
        #[source]
        source: libsql::Error,
    },

    /// Reading one entity type failed; no snapshot was produced.
    #[error("Export failed reading {entity}: {source}")]
    Export {
        entity: EntityKind,
        #[source]
        source: DatabaseError,
    },

    /// The declared entity dependencies contain a cycle.
    #[error(transparent)]
    Graph(#[from] CyclicDependencyError),

    /// The detached restore task panicked or was aborted. Its transaction was
    /// never committed.
    #[error("Restore task was interrupted: {0}")]
    Interrupted(String),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

fn entity_suffix(entity: &Option<EntityKind>) -> String {
    entity.map_or_else(String::new, |kind| format!(" of {kind}"))
}

impl BackupError {
    pub(crate) const fn transaction(
        phase: RestorePhase,
        entity: Option<EntityKind>,
        source: libsql::Error,
    ) -> Self {
        Self::Transaction {
            phase,
            entity,
            source,
        }
    }

    /// The caller supplied a bad document (as opposed to a server-side failure).
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<SnapshotError> for BackupError {
    fn from(err: SnapshotError) -> Self {
        match err {
            SnapshotError::Validation(message) => Self::Validation(message),
            malformed @ SnapshotError::Malformed(_) => Self::Validation(malformed.to_string()),
        }
    }
}

impl From<libsql::Error> for BackupError {
    fn from(err: libsql::Error) -> Self {
        Self::Database(DatabaseError::LibSql(err))
    }
}

/// A best-effort audit write failed. Logged and discarded, never returned to
/// the caller of export or restore.
#[derive(Debug, Error)]
pub enum AuditSinkError {
    #[error("Audit write failed: {0}")]
    Write(#[from] DatabaseError),

    #[error("Audit sink unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_error_names_phase_and_entity() {
        let err = BackupError::transaction(
            RestorePhase::Insert,
            Some(EntityKind::UserRoles),
            libsql::Error::ConnectionFailed("disk gone".into()),
        );
        let message = err.to_string();
        assert!(message.starts_with("Restore failed during insert of userRoles"), "{message}");
        assert!(!err.is_validation());
    }

    #[test]
    fn commit_error_has_no_entity() {
        let err = BackupError::transaction(
            RestorePhase::Commit,
            None,
            libsql::Error::ConnectionFailed("x".into()),
        );
        assert!(err.to_string().starts_with("Restore failed during commit: "));
    }

    #[test]
    fn snapshot_errors_become_validation() {
        let err: BackupError = SnapshotError::Validation("missing 'database'".into()).into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "missing 'database'");

        let malformed = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BackupError = SnapshotError::Malformed(malformed).into();
        assert!(err.is_validation());
    }
}
