//! Restore engine.
//!
//! A restore replaces the whole managed dataset with a snapshot's contents:
//!
//! 1. Parse, validate, and type every row against its table descriptor. Any
//!    problem here is a `BackupError::Validation` and nothing has been touched.
//! 2. In one `BEGIN IMMEDIATE` transaction: delete every table in deletion
//!    order, insert every table in insertion order with the snapshot's own
//!    primary keys, then resynchronise `sqlite_sequence` to the highest
//!    restored id. Any failure rolls the whole transaction back.
//!
//! Step 2 runs on a detached task that owns its connection and the restore
//! lock, so dropping the caller's future (a client disconnect) cannot abandon
//! a transaction halfway.

use std::collections::BTreeMap;

use libsql::TransactionBehavior;
use ludo_config::BackupConfig;
use ludo_core::audit::{AuditAction, AuditEntry};
use ludo_core::entity::EntityKind;
use ludo_core::graph::OrderPlan;
use ludo_core::responses::RestoreResult;
use ludo_core::snapshot::Snapshot;
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::error::{BackupError, RestorePhase};
use crate::helpers::json_to_params;
use crate::schema::{TableSpec, table_spec};
use crate::service::StoreService;

/// Typed bind values per entity kind, one `Vec` per row in snapshot order.
type PreparedRows = BTreeMap<EntityKind, Vec<Vec<libsql::Value>>>;

/// What the transaction did, reported after commit.
#[derive(Debug, Default)]
struct Applied {
    inserted: BTreeMap<EntityKind, u64>,
    sequences: BTreeMap<EntityKind, i64>,
}

impl StoreService {
    /// Replace the managed dataset with the snapshot in `raw`.
    ///
    /// `actor` is recorded in the best-effort `restore` audit entry.
    ///
    /// # Errors
    ///
    /// - `BackupError::Validation` if the document is malformed or a row does
    ///   not fit its table. Nothing was mutated.
    /// - `BackupError::Transaction` if a statement failed. The transaction was
    ///   rolled back and the dataset is unchanged.
    pub async fn restore(&self, raw: &[u8], actor: &str) -> Result<RestoreResult, BackupError> {
        let snapshot = Snapshot::from_slice(raw)?;
        self.restore_snapshot(&snapshot, actor).await
    }

    /// Replace the managed dataset with an already parsed snapshot.
    ///
    /// # Errors
    ///
    /// See [`StoreService::restore`].
    pub async fn restore_snapshot(
        &self,
        snapshot: &Snapshot,
        actor: &str,
    ) -> Result<RestoreResult, BackupError> {
        let plan = EntityKind::graph().plan()?;
        let rows = prepare(snapshot)?;

        // Waiting here is still cancellable: no statement has run yet.
        let guard = self.restore_lock().lock_owned().await;
        let conn = self.db().connect().await?;
        let job = RestoreJob {
            conn,
            plan,
            rows,
            backup: self.backup_config().clone(),
        };

        let applied = tokio::spawn(async move {
            let _guard = guard;
            job.run().await
        })
        .await
        .map_err(|e| BackupError::Interrupted(e.to_string()))??;

        let result = RestoreResult {
            success: true,
            counts: snapshot.meta.counts.clone(),
            inserted: applied.inserted,
            sequences: applied.sequences,
        };
        report_count_mismatches(&result);
        info!(actor, inserted = ?result.inserted, "snapshot restored");

        self.record_audit(AuditEntry::new(
            actor,
            AuditAction::Restore,
            Some(json!({ "counts": result.counts, "inserted": result.inserted })),
        ))
        .await;

        Ok(result)
    }
}

/// Type every row before the transaction opens.
fn prepare(snapshot: &Snapshot) -> Result<PreparedRows, BackupError> {
    EntityKind::ALL
        .into_iter()
        .map(|kind| {
            let spec = table_spec(kind);
            let rows = snapshot
                .rows(kind)
                .iter()
                .enumerate()
                .map(|(i, row)| {
                    json_to_params(spec, row).map_err(|reason| {
                        BackupError::Validation(format!("database.{kind}[{i}]: {reason}"))
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            Ok::<_, BackupError>((kind, rows))
        })
        .collect()
}

/// `meta.counts` is informational; disagreement is logged, never fatal.
fn report_count_mismatches(result: &RestoreResult) {
    for (name, claimed) in &result.counts {
        let Some(kind) = EntityKind::from_wire(name) else {
            continue;
        };
        let actual = result.inserted.get(&kind).copied().unwrap_or(0);
        let Some(claimed) = claimed.as_u64() else {
            warn!(entity = %kind, %claimed, actual, "meta.counts entry is not a row count");
            continue;
        };
        if actual != claimed {
            warn!(entity = %kind, claimed, actual, "meta.counts disagrees with restored rows");
        }
    }
}

/// Everything the detached transaction needs, owned.
struct RestoreJob {
    conn: libsql::Connection,
    plan: OrderPlan<EntityKind>,
    rows: PreparedRows,
    backup: BackupConfig,
}

impl RestoreJob {
    async fn run(self) -> Result<Applied, BackupError> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .await
            .map_err(|source| fail(RestorePhase::Begin, None, source))?;

        match self.apply(&tx).await {
            Ok(applied) => {
                tx.commit()
                    .await
                    .map_err(|source| fail(RestorePhase::Commit, None, source))?;
                Ok(applied)
            }
            Err(err) => {
                if let Err(rollback) = tx.rollback().await {
                    error!(%rollback, "rollback after failed restore also failed");
                }
                Err(err)
            }
        }
    }

    async fn apply(&self, conn: &libsql::Connection) -> Result<Applied, BackupError> {
        for &kind in &self.plan.deletion {
            let spec = table_spec(kind);
            let deleted = conn
                .execute(&spec.delete_sql(), ())
                .await
                .map_err(|source| fail(RestorePhase::Delete, Some(kind), source))?;
            debug!(entity = %kind, deleted, "cleared table");
        }

        let mut applied = Applied::default();
        for &kind in &self.plan.insertion {
            let spec = table_spec(kind);
            let rows = self.rows.get(&kind).map_or(&[][..], Vec::as_slice);
            insert_rows(conn, spec, rows, self.backup.rows_per_statement(spec.columns.len()))
                .await
                .map_err(|source| fail(RestorePhase::Insert, Some(kind), source))?;
            debug!(entity = %kind, rows = rows.len(), "inserted rows");
            applied.inserted.insert(kind, rows.len() as u64);
        }

        for &kind in &self.plan.insertion {
            let spec = table_spec(kind);
            if !spec.sequence {
                continue;
            }
            let next = resync_sequence(conn, spec)
                .await
                .map_err(|source| fail(RestorePhase::Sequence, Some(kind), source))?;
            applied.sequences.insert(kind, next);
        }

        Ok(applied)
    }
}

fn fail(phase: RestorePhase, entity: Option<EntityKind>, source: libsql::Error) -> BackupError {
    match entity {
        Some(kind) => error!(%phase, entity = %kind, %source, "restore transaction failed"),
        None => error!(%phase, %source, "restore transaction failed"),
    }
    BackupError::transaction(phase, entity, source)
}

/// Batched multi-row inserts with caller-supplied primary keys.
async fn insert_rows(
    conn: &libsql::Connection,
    spec: &TableSpec,
    rows: &[Vec<libsql::Value>],
    per_statement: usize,
) -> Result<(), libsql::Error> {
    for chunk in rows.chunks(per_statement) {
        let params: Vec<libsql::Value> = chunk.iter().flatten().cloned().collect();
        conn.execute(&spec.insert_sql(chunk.len()), params).await?;
    }
    Ok(())
}

/// Point the table's AUTOINCREMENT counter at the highest restored id, or
/// drop it when the table is empty. Returns the new counter value.
async fn resync_sequence(conn: &libsql::Connection, spec: &TableSpec) -> Result<i64, libsql::Error> {
    let max_id = {
        let mut rows = conn.query(&spec.max_id_sql(), ()).await?;
        match rows.next().await? {
            Some(row) => row.get::<i64>(0)?,
            None => 0,
        }
    };

    conn.execute("DELETE FROM sqlite_sequence WHERE name = ?1", [spec.table])
        .await?;
    if max_id > 0 {
        conn.execute(
            "INSERT INTO sqlite_sequence (name, seq) VALUES (?1, ?2)",
            libsql::params![spec.table, max_id],
        )
        .await?;
    }
    Ok(max_id.max(0))
}
