//! Cross-cutting error types for Ludo.
//!
//! Domain-specific errors (`DatabaseError`, `BackupError`, `AuthError`) live in
//! their own crates. The errors here can be raised without any I/O.

use thiserror::Error;

/// The declared dependency edges contain a cycle.
///
/// This indicates a mis-modelled schema and is never recovered from at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cyclic dependency among: {}", .cycle.join(", "))]
pub struct CyclicDependencyError {
    /// Nodes on the offending cycle, in declaration order.
    pub cycle: Vec<String>,
}

/// A snapshot document could not be accepted.
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The bytes are not a JSON document.
    #[error("Malformed snapshot document: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The document is JSON but lacks the required structure.
    #[error("Invalid snapshot: {0}")]
    Validation(String),
}
