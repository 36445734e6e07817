//! Audit entries emitted by the snapshot subsystem.
//!
//! Audit writes are best-effort side effects: they are recorded through an
//! `AuditSink` and a failure never changes the outcome of the operation that
//! produced the entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What the audited operation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Export,
    Restore,
}

impl AuditAction {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Export => "export",
            Self::Restore => "restore",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An append-only audit log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Assigned by the store; `None` until persisted.
    pub id: Option<i64>,
    pub actor: String,
    pub action: AuditAction,
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    #[must_use]
    pub fn new(actor: impl Into<String>, action: AuditAction, detail: Option<serde_json::Value>) -> Self {
        Self {
            id: None,
            actor: actor.into(),
            action,
            detail,
            created_at: Utc::now(),
        }
    }
}
