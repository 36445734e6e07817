//! Shared fixtures for ludo-db integration tests.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use ludo_core::audit::AuditEntry;
use ludo_core::entity::EntityKind;
use ludo_db::LudoDb;
use ludo_db::error::AuditSinkError;
use ludo_db::repos::audit::AuditSink;
use ludo_db::schema::table_spec;
use ludo_db::service::StoreService;
use serde_json::{Value, json};
use tempfile::TempDir;

pub const TS: &str = "2026-03-01T12:00:00.000Z";

/// In-memory store auditing into its own `audit_log`.
pub async fn memory_service() -> StoreService {
    StoreService::new_local(":memory:").await.unwrap()
}

/// File-backed store in a fresh temp dir. Keep the `TempDir` alive.
pub async fn file_service() -> (TempDir, StoreService) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ludo.db");
    let service = StoreService::new_local(path.to_str().unwrap()).await.unwrap();
    (dir, service)
}

/// A small but complete storefront: every managed table has rows, ids have
/// gaps, and one order has no payment method.
pub async fn seed_storefront(db: &LudoDb) {
    db.conn()
        .execute_batch(&format!(
            "
INSERT INTO roles (id, name, description) VALUES
    (1, 'admin', 'Full access'), (2, 'buyer', NULL), (3, 'support', 'Help desk');
INSERT INTO categories (id, name, slug, description, created_at) VALUES
    (1, 'RPG', 'rpg', NULL, '{TS}'), (2, 'Strategy', 'strategy', 'Think first', '{TS}');
INSERT INTO users (id, email, username, password_hash, is_active, created_at, updated_at) VALUES
    (1, 'ada@example.com', 'ada', 'h1', 1, '{TS}', '{TS}'),
    (2, 'bob@example.com', 'bob', 'h2', 1, '{TS}', '{TS}'),
    (3, 'cy@example.com', 'cy', 'h3', 0, '{TS}', '{TS}'),
    (7, 'dee@example.com', 'dee', 'h4', 1, '{TS}', '{TS}');
INSERT INTO products (id, title, description, price_cents, stock, platform, rating, image_url, is_active, created_at, updated_at) VALUES
    (1, 'Starfall', 'Space RPG', 5999, 10, 'pc', 4.5, NULL, 1, '{TS}', '{TS}'),
    (2, 'Kingdoms', NULL, 2999, 0, 'switch', NULL, 'https://img.example/k.png', 1, '{TS}', '{TS}'),
    (5, 'Retro Pack', NULL, 999, 100, NULL, 3.0, NULL, 0, '{TS}', '{TS}');
INSERT INTO user_roles (user_id, role_id, assigned_at) VALUES
    (1, 1, '{TS}'), (2, 2, '{TS}'), (3, 2, '{TS}'), (7, 3, '{TS}');
INSERT INTO product_categories (product_id, category_id) VALUES (1, 1), (2, 2), (5, 1), (5, 2);
INSERT INTO payment_methods (id, user_id, provider, brand, last4, exp_month, exp_year, is_default, created_at) VALUES
    (1, 2, 'stripe', 'visa', '4242', 12, 2030, 1, '{TS}'),
    (4, 3, 'paypal', NULL, NULL, NULL, NULL, 0, '{TS}');
INSERT INTO orders (id, user_id, payment_method_id, status, total_cents, shipping_address, created_at, updated_at) VALUES
    (1, 2, 1, 'paid', 8998, '1 Main St', '{TS}', '{TS}'),
    (3, 3, NULL, 'pending', 999, NULL, '{TS}', '{TS}');
INSERT INTO order_items (id, order_id, product_id, quantity, unit_price_cents) VALUES
    (1, 1, 1, 1, 5999), (2, 1, 2, 1, 2999), (6, 3, 5, 1, 999);
INSERT INTO user_preferences (id, user_id, theme, language, newsletter, updated_at) VALUES
    (1, 1, 'dark', 'en', 0, '{TS}'), (2, 2, 'light', 'de', 1, '{TS}');
"
        ))
        .await
        .unwrap();
}

/// `roles` ids 1..=roles and `users` ids 1..=users with every user a buyer.
pub async fn seed_roles_and_users(db: &LudoDb, roles: i64, users: i64) {
    for id in 1..=roles {
        db.conn()
            .execute(
                "INSERT INTO roles (id, name) VALUES (?1, ?2)",
                libsql::params![id, format!("role-{id}")],
            )
            .await
            .unwrap();
    }
    for id in 1..=users {
        db.conn()
            .execute(
                "INSERT INTO users (id, email, username, password_hash) VALUES (?1, ?2, ?3, 'x')",
                libsql::params![id, format!("user{id}@example.com"), format!("user{id}")],
            )
            .await
            .unwrap();
        db.conn()
            .execute(
                "INSERT INTO user_roles (user_id, role_id) VALUES (?1, ?2)",
                libsql::params![id, 1 + (id % roles)],
            )
            .await
            .unwrap();
    }
}

/// Every managed table plus their `sqlite_sequence` entries, rendered for
/// exact comparison.
pub async fn dump(db: &LudoDb) -> BTreeMap<String, Vec<Vec<String>>> {
    let mut out = BTreeMap::new();
    for kind in EntityKind::ALL {
        let spec = table_spec(kind);
        out.insert(
            spec.table.to_string(),
            rows_of(db, &spec.select_sql(), spec.columns.len()).await,
        );
    }
    out.insert(
        "sqlite_sequence".to_string(),
        rows_of(db, "SELECT name, seq FROM sqlite_sequence WHERE name != 'audit_log' ORDER BY name", 2).await,
    );
    out
}

async fn rows_of(db: &LudoDb, sql: &str, width: usize) -> Vec<Vec<String>> {
    let mut rows = db.conn().query(sql, ()).await.unwrap();
    let mut out = Vec::new();
    while let Some(row) = rows.next().await.unwrap() {
        let mut values = Vec::with_capacity(width);
        for idx in 0..width {
            values.push(format!("{:?}", row.get_value(i32::try_from(idx).unwrap()).unwrap()));
        }
        out.push(values);
    }
    out
}

/// Ids of a single-column query, in order.
pub async fn ids(db: &LudoDb, sql: &str) -> Vec<i64> {
    let mut rows = db.conn().query(sql, ()).await.unwrap();
    let mut out = Vec::new();
    while let Some(row) = rows.next().await.unwrap() {
        out.push(row.get::<i64>(0).unwrap());
    }
    out
}

/// Full snapshot document: kinds missing from `database` become empty lists.
pub fn document(database: &Value, counts: &Value) -> Vec<u8> {
    let mut doc = json!({
        "timestamp": TS,
        "exportedBy": "fixture",
        "version": "1.0",
        "database": {},
        "meta": { "counts": counts }
    });
    for kind in EntityKind::ALL {
        doc["database"][kind.as_str()] = database
            .get(kind.as_str())
            .cloned()
            .unwrap_or_else(|| json!([]));
    }
    serde_json::to_vec(&doc).unwrap()
}

/// Audit sink that always fails and counts attempts.
#[derive(Default)]
pub struct FailingSink {
    pub attempts: AtomicUsize,
}

#[async_trait]
impl AuditSink for FailingSink {
    async fn record(&self, _entry: &AuditEntry) -> Result<(), AuditSinkError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuditSinkError::Unavailable("audit store offline".into()))
    }
}

pub async fn service_with_failing_audit() -> (StoreService, Arc<FailingSink>) {
    let sink = Arc::new(FailingSink::default());
    let db = LudoDb::open_local(":memory:").await.unwrap();
    let service = StoreService::with_audit_sink(db, sink.clone());
    (service, sink)
}
