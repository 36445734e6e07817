//! Audit log repository and the best-effort audit sink.
//!
//! Export and restore record one entry each through an [`AuditSink`]. The sink
//! is a collaborator boundary: its failures are logged by the caller and never
//! change the result of the audited operation.

use async_trait::async_trait;
use ludo_core::audit::{AuditAction, AuditEntry};

use crate::error::{AuditSinkError, DatabaseError};
use crate::helpers::{parse_datetime, parse_enum, parse_optional_json};
use crate::service::StoreService;

/// Destination for audit entries.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record one entry.
    ///
    /// # Errors
    ///
    /// Returns `AuditSinkError` if the entry could not be stored.
    async fn record(&self, entry: &AuditEntry) -> Result<(), AuditSinkError>;
}

/// Writes entries to the `audit_log` table.
pub struct DbAuditSink {
    conn: libsql::Connection,
}

impl DbAuditSink {
    #[must_use]
    pub const fn new(conn: libsql::Connection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl AuditSink for DbAuditSink {
    async fn record(&self, entry: &AuditEntry) -> Result<(), AuditSinkError> {
        append_audit(&self.conn, entry).await?;
        Ok(())
    }
}

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub actor: Option<String>,
    pub action: Option<AuditAction>,
    pub limit: Option<u32>,
}

/// Append an audit entry.
///
/// # Errors
///
/// Returns `DatabaseError` if the INSERT fails.
pub async fn append_audit(
    conn: &libsql::Connection,
    entry: &AuditEntry,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO audit_log (actor, action, detail, created_at) VALUES (?1, ?2, ?3, ?4)",
        libsql::params![
            entry.actor.as_str(),
            entry.action.as_str(),
            entry
                .detail
                .as_ref()
                .map(std::string::ToString::to_string)
                .as_deref(),
            entry.created_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

/// Query audit entries with optional filters, newest first.
///
/// # Errors
///
/// Returns `DatabaseError` if the query fails.
pub async fn query_audit(
    conn: &libsql::Connection,
    filter: &AuditFilter,
) -> Result<Vec<AuditEntry>, DatabaseError> {
    let mut conditions = Vec::new();
    let mut params: Vec<libsql::Value> = Vec::new();

    if let Some(ref actor) = filter.actor {
        params.push(libsql::Value::Text(actor.clone()));
        conditions.push(format!("actor = ?{}", params.len()));
    }
    if let Some(action) = filter.action {
        params.push(libsql::Value::Text(action.as_str().to_string()));
        conditions.push(format!("action = ?{}", params.len()));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let limit = filter.limit.unwrap_or(100);
    let sql = format!(
        "SELECT id, actor, action, detail, created_at
         FROM audit_log {where_clause}
         ORDER BY id DESC LIMIT {limit}"
    );

    let mut rows = conn.query(&sql, params).await?;
    let mut entries = Vec::new();
    while let Some(row) = rows.next().await? {
        entries.push(AuditEntry {
            id: Some(row.get::<i64>(0)?),
            actor: row.get::<String>(1)?,
            action: parse_enum(&row.get::<String>(2)?)?,
            detail: parse_optional_json(row.get::<Option<String>>(3)?.as_deref())?,
            created_at: parse_datetime(&row.get::<String>(4)?)?,
        });
    }

    Ok(entries)
}

impl StoreService {
    /// Recent audit entries from the store's own `audit_log` table.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        query_audit(self.db().conn(), filter).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::LudoDb;

    #[tokio::test]
    async fn append_and_query() {
        let db = LudoDb::open_local(":memory:").await.unwrap();
        let sink = DbAuditSink::new(db.conn().clone());

        sink.record(&AuditEntry::new(
            "ops",
            AuditAction::Export,
            Some(json!({"counts": {"users": 3}})),
        ))
        .await
        .unwrap();
        sink.record(&AuditEntry::new("ops", AuditAction::Restore, None))
            .await
            .unwrap();
        sink.record(&AuditEntry::new("other", AuditAction::Export, None))
            .await
            .unwrap();

        let all = query_audit(db.conn(), &AuditFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].actor, "other");
        assert!(all.iter().all(|e| e.id.is_some()));

        let exports = query_audit(
            db.conn(),
            &AuditFilter {
                actor: Some("ops".into()),
                action: Some(AuditAction::Export),
                limit: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].detail, Some(json!({"counts": {"users": 3}})));
    }

    #[tokio::test]
    async fn limit_is_applied() {
        let db = LudoDb::open_local(":memory:").await.unwrap();
        for _ in 0..5 {
            append_audit(db.conn(), &AuditEntry::new("ops", AuditAction::Export, None))
                .await
                .unwrap();
        }
        let filter = AuditFilter {
            limit: Some(2),
            ..Default::default()
        };
        assert_eq!(query_audit(db.conn(), &filter).await.unwrap().len(), 2);
    }
}
