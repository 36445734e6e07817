//! Snapshot exporter.
//!
//! Reads all ten managed tables inside one deferred read transaction, so the
//! document is a single consistent view even while other connections write.

use std::collections::{BTreeMap, HashMap};

use futures::future::try_join_all;
use libsql::TransactionBehavior;
use ludo_core::audit::{AuditAction, AuditEntry};
use ludo_core::entity::EntityKind;
use ludo_core::snapshot::{Row, Snapshot};
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::error::{BackupError, DatabaseError};
use crate::helpers::row_to_json;
use crate::schema::table_spec;
use crate::service::StoreService;

impl StoreService {
    /// Export every managed table as one snapshot document.
    ///
    /// Emits a best-effort `export` audit entry; an audit failure is logged
    /// and does not affect the returned snapshot.
    ///
    /// # Errors
    ///
    /// Returns `BackupError::Export` naming the first table whose read
    /// failed. No partial snapshot is ever returned.
    pub async fn create_snapshot(&self, exported_by: &str) -> Result<Snapshot, BackupError> {
        // The guard is released before `record_audit`, which locks again.
        let database = {
            let lock = self.restore_lock();
            let _shared_conn = if self.db().is_in_memory() {
                Some(lock.lock().await)
            } else {
                None
            };
            self.read_all().await?
        };

        let snapshot = Snapshot::new(exported_by, database);
        info!(
            exported_by,
            rows = snapshot.total_rows(),
            counts = ?snapshot.meta.counts,
            "snapshot exported"
        );

        self.record_audit(AuditEntry::new(
            exported_by,
            AuditAction::Export,
            Some(json!({ "counts": snapshot.meta.counts })),
        ))
        .await;

        Ok(snapshot)
    }

    async fn read_all(&self) -> Result<BTreeMap<EntityKind, Vec<Row>>, BackupError> {
        let conn = self.db().connect().await?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Deferred)
            .await?;

        let reads = EntityKind::ALL.into_iter().map(|kind| read_table(&tx, kind));
        let tables = match try_join_all(reads).await {
            Ok(tables) => tables,
            Err(err) => {
                let _ = tx.rollback().await;
                return Err(err);
            }
        };
        tx.commit().await?;

        let mut database: BTreeMap<EntityKind, Vec<Row>> = tables.into_iter().collect();
        attach_related(&mut database);
        Ok(database)
    }
}

async fn read_table(
    conn: &libsql::Connection,
    kind: EntityKind,
) -> Result<(EntityKind, Vec<Row>), BackupError> {
    let spec = table_spec(kind);
    let fetch = async {
        let mut rows = conn.query(&spec.select_sql(), ()).await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_json(spec, &row)?);
        }
        Ok::<_, DatabaseError>(out)
    };

    let rows = fetch
        .await
        .map_err(|source| BackupError::Export { entity: kind, source })?;
    debug!(entity = %kind, rows = rows.len(), "read entity rows");
    Ok((kind, rows))
}

fn id_of(row: &Row, field: &str) -> Option<i64> {
    row.get(field).and_then(Value::as_i64)
}

/// Group `links` rows by `owner_field`, resolving `target_field` through `targets`.
fn linked(
    links: &[Row],
    owner_field: &str,
    target_field: &str,
    targets: &HashMap<i64, Value>,
) -> HashMap<i64, Vec<Value>> {
    let mut grouped: HashMap<i64, Vec<Value>> = HashMap::new();
    for link in links {
        let (Some(owner), Some(target)) = (id_of(link, owner_field), id_of(link, target_field))
        else {
            continue;
        };
        if let Some(value) = targets.get(&target) {
            grouped.entry(owner).or_default().push(value.clone());
        }
    }
    grouped
}

fn summaries(rows: &[Row], fields: &[&str]) -> HashMap<i64, Value> {
    rows.iter()
        .filter_map(|row| {
            let id = id_of(row, "id")?;
            let summary: Row = fields
                .iter()
                .filter_map(|f| row.get(*f).map(|v| ((*f).to_string(), v.clone())))
                .collect();
            Some((id, Value::Object(summary)))
        })
        .collect()
}

fn attach(rows: Option<&mut Vec<Row>>, key: &str, mut related: HashMap<i64, Vec<Value>>) {
    for row in rows.into_iter().flatten() {
        let values = id_of(row, "id")
            .and_then(|id| related.remove(&id))
            .unwrap_or_default();
        row.insert(key.to_string(), Value::Array(values));
    }
}

/// Add display-only joined data: `users[].roles`, `products[].categories`,
/// and `orders[].items`. Restore ignores these fields.
fn attach_related(database: &mut BTreeMap<EntityKind, Vec<Row>>) {
    let rows = |kind| database.get(&kind).map_or(&[][..], Vec::as_slice);

    let roles = summaries(rows(EntityKind::Roles), &["id", "name"]);
    let categories = summaries(rows(EntityKind::Categories), &["id", "name", "slug"]);
    let user_roles = linked(rows(EntityKind::UserRoles), "userId", "roleId", &roles);
    let product_categories = linked(
        rows(EntityKind::ProductCategories),
        "productId",
        "categoryId",
        &categories,
    );

    let mut order_items: HashMap<i64, Vec<Value>> = HashMap::new();
    for item in rows(EntityKind::OrderItems) {
        if let Some(order) = id_of(item, "orderId") {
            order_items
                .entry(order)
                .or_default()
                .push(Value::Object(item.clone()));
        }
    }

    attach(database.get_mut(&EntityKind::Users), "roles", user_roles);
    attach(
        database.get_mut(&EntityKind::Products),
        "categories",
        product_categories,
    );
    attach(database.get_mut(&EntityKind::Orders), "items", order_items);
}
