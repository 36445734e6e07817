//! Response types shared by the HTTP surface and the CLI.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::entity::EntityKind;
use crate::snapshot::Counts;

/// Outcome of a committed restore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResult {
    pub success: bool,
    /// `meta.counts` echoed back from the uploaded document.
    pub counts: Counts,
    /// Rows actually inserted per kind.
    pub inserted: BTreeMap<EntityKind, u64>,
    /// Next-id counter value per kind after resync (highest restored id).
    pub sequences: BTreeMap<EntityKind, i64>,
}

/// JSON body of `POST /admin/restore` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreResponse {
    pub success: bool,
    pub message: String,
    pub counts: Counts,
}

impl From<&RestoreResult> for RestoreResponse {
    fn from(result: &RestoreResult) -> Self {
        Self {
            success: result.success,
            message: "Database restored successfully".to_string(),
            counts: result.counts.clone(),
        }
    }
}

/// JSON error body returned by the admin endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    #[must_use]
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Summary printed by `ludo backup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupSummary {
    pub file: String,
    pub timestamp: String,
    pub exported_by: String,
    pub counts: Counts,
}

/// Output of `ludo order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub insertion: Vec<EntityKind>,
    pub deletion: Vec<EntityKind>,
}
