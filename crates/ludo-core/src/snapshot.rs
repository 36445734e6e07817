//! The snapshot document: a point-in-time JSON copy of every managed kind.
//!
//! ```json
//! {
//!   "timestamp": "2026-10-16T09:30:00.000Z",
//!   "exportedBy": "ops",
//!   "version": "1.0",
//!   "database": { "roles": [...], "users": [...], ... },
//!   "meta": { "counts": { "users": 3, ... } }
//! }
//! ```
//!
//! Rows are kept as JSON objects keyed by camelCase field name. Typing them
//! against the table layout is the storage layer's job.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::EntityKind;
use crate::errors::SnapshotError;

/// Format version written by this build. Documents without a version are
/// accepted as the same format.
pub const SNAPSHOT_FORMAT_VERSION: &str = "1.0";

/// One exported record.
pub type Row = serde_json::Map<String, Value>;

/// `meta.counts`: entity name to row total, as written by the exporter.
pub type Counts = BTreeMap<String, Value>;

/// Kinds whose totals are reported in `meta.counts`.
pub const COUNTED_KINDS: [EntityKind; 6] = [
    EntityKind::Users,
    EntityKind::Products,
    EntityKind::Orders,
    EntityKind::Categories,
    EntityKind::Roles,
    EntityKind::PaymentMethods,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub exported_by: String,
    #[serde(default = "default_version")]
    pub version: String,
    pub database: BTreeMap<EntityKind, Vec<Row>>,
    pub meta: SnapshotMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMeta {
    /// Informational totals. Never trusted for correctness on restore, so
    /// values are kept as uploaded whatever their JSON type.
    #[serde(default)]
    pub counts: Counts,
}

fn default_version() -> String {
    SNAPSHOT_FORMAT_VERSION.to_string()
}

impl Snapshot {
    /// Assemble a fresh snapshot stamped with the current time.
    ///
    /// `meta.counts` is derived from the row lists of [`COUNTED_KINDS`].
    #[must_use]
    pub fn new(exported_by: impl Into<String>, database: BTreeMap<EntityKind, Vec<Row>>) -> Self {
        let counts = COUNTED_KINDS
            .iter()
            .map(|kind| {
                let n = database.get(kind).map_or(0, Vec::len);
                (kind.as_str().to_string(), Value::from(n as u64))
            })
            .collect();

        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            exported_by: exported_by.into(),
            version: SNAPSHOT_FORMAT_VERSION.to_string(),
            database,
            meta: SnapshotMeta { counts },
        }
    }

    /// Rows of one kind; empty if the kind is absent.
    #[must_use]
    pub fn rows(&self, kind: EntityKind) -> &[Row] {
        self.database
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Total rows across every kind.
    #[must_use]
    pub fn total_rows(&self) -> usize {
        self.database.values().map(Vec::len).sum()
    }

    /// Calendar day (UTC) of the export; today if the timestamp is unparsable.
    #[must_use]
    pub fn export_date(&self) -> NaiveDate {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .map_or_else(|_| Utc::now().date_naive(), |dt| dt.with_timezone(&Utc).date_naive())
    }

    /// Download name, e.g. `backup-2026-10-16.json`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("backup-{}.json", self.export_date().format("%Y-%m-%d"))
    }

    /// Parse and validate a snapshot document.
    ///
    /// # Errors
    ///
    /// `SnapshotError::Malformed` if the bytes are not JSON,
    /// `SnapshotError::Validation` if the structure is wrong.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let value: Value = serde_json::from_slice(bytes)?;
        validate_document(&value)?;
        serde_json::from_value(value).map_err(|e| SnapshotError::Validation(e.to_string()))
    }

    /// Serialize as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Propagates serializer failures.
    pub fn to_json_vec(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec_pretty(self)
    }
}

fn invalid(message: impl Into<String>) -> SnapshotError {
    SnapshotError::Validation(message.into())
}

/// Structural checks run before any typed decoding.
///
/// Every managed kind must be present as an array of objects; unknown kinds,
/// a foreign format version, or a missing `meta.counts` object are rejected.
///
/// # Errors
///
/// `SnapshotError::Validation` describing the first problem found.
pub fn validate_document(value: &Value) -> Result<(), SnapshotError> {
    let root = value
        .as_object()
        .ok_or_else(|| invalid("snapshot must be a JSON object"))?;

    if let Some(version) = root.get("version") {
        match version.as_str() {
            Some(SNAPSHOT_FORMAT_VERSION) => {}
            Some(other) => {
                return Err(invalid(format!(
                    "unsupported snapshot version '{other}' (expected '{SNAPSHOT_FORMAT_VERSION}')"
                )));
            }
            None => return Err(invalid("'version' must be a string")),
        }
    }

    let database = root
        .get("database")
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("missing or non-object 'database' section"))?;

    root.get("meta")
        .and_then(|meta| meta.get("counts"))
        .and_then(Value::as_object)
        .ok_or_else(|| invalid("missing or non-object 'meta.counts'"))?;

    for kind in EntityKind::ALL {
        match database.get(kind.as_str()) {
            None => return Err(invalid(format!("missing entity list 'database.{kind}'"))),
            Some(Value::Array(rows)) => {
                if let Some(i) = rows.iter().position(|row| !row.is_object()) {
                    return Err(invalid(format!("'database.{kind}[{i}]' is not an object")));
                }
            }
            Some(_) => return Err(invalid(format!("'database.{kind}' must be a list"))),
        }
    }

    if let Some(unknown) = database.keys().find(|key| EntityKind::from_wire(key).is_none()) {
        return Err(invalid(format!("unknown entity kind 'database.{unknown}'")));
    }

    Ok(())
}
