//! Table descriptors for the managed entity kinds.
//!
//! Each [`TableSpec`] mirrors a table in `migrations/001_initial.sql`: column
//! order, wire field names, value kinds, and which columns hold foreign keys.
//! Export reads columns in this order and restore binds them in this order.

use ludo_core::entity::EntityKind;

use ColumnKind::{Bool, Integer, Real, Text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
    /// Stored as INTEGER 0/1, exchanged as a JSON boolean.
    Bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// camelCase key in a snapshot row.
    pub field: &'static str,
    /// SQL column name.
    pub name: &'static str,
    pub kind: ColumnKind,
    pub nullable: bool,
    /// Kind this column holds a foreign key into.
    pub references: Option<EntityKind>,
}

const fn col(field: &'static str, name: &'static str, kind: ColumnKind) -> Column {
    Column {
        field,
        name,
        kind,
        nullable: false,
        references: None,
    }
}

impl Column {
    const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    const fn references(mut self, kind: EntityKind) -> Self {
        self.references = Some(kind);
        self
    }
}

#[derive(Debug)]
pub struct TableSpec {
    pub kind: EntityKind,
    pub table: &'static str,
    pub columns: &'static [Column],
    /// Wire field names forming the primary key.
    pub primary_key: &'static [&'static str],
    /// The table owns an AUTOINCREMENT entry in `sqlite_sequence`.
    pub sequence: bool,
}

impl TableSpec {
    #[must_use]
    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }

    #[must_use]
    pub fn is_primary_key(&self, field: &str) -> bool {
        self.primary_key.contains(&field)
    }

    fn column_list(&self) -> String {
        self.columns
            .iter()
            .map(|c| c.name)
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn primary_key_columns(&self) -> Vec<&'static str> {
        self.primary_key
            .iter()
            .filter_map(|field| self.column(field).map(|c| c.name))
            .collect()
    }

    /// `SELECT` of every column, in primary-key order.
    #[must_use]
    pub fn select_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} ORDER BY {}",
            self.column_list(),
            self.table,
            self.primary_key_columns().join(", ")
        )
    }

    /// Multi-row `INSERT` with one placeholder per column per row.
    #[must_use]
    pub fn insert_sql(&self, rows: usize) -> String {
        let tuple = format!("({})", vec!["?"; self.columns.len()].join(", "));
        let values = vec![tuple.as_str(); rows.max(1)].join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES {values}",
            self.table,
            self.column_list()
        )
    }

    #[must_use]
    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {}", self.table)
    }

    /// Highest surrogate id, 0 for an empty table.
    #[must_use]
    pub fn max_id_sql(&self) -> String {
        format!(
            "SELECT COALESCE(MAX({}), 0) FROM {}",
            self.primary_key_columns().join(", "),
            self.table
        )
    }
}

static ROLES: TableSpec = TableSpec {
    kind: EntityKind::Roles,
    table: "roles",
    columns: &[
        col("id", "id", Integer),
        col("name", "name", Text),
        col("description", "description", Text).nullable(),
    ],
    primary_key: &["id"],
    sequence: true,
};

static CATEGORIES: TableSpec = TableSpec {
    kind: EntityKind::Categories,
    table: "categories",
    columns: &[
        col("id", "id", Integer),
        col("name", "name", Text),
        col("slug", "slug", Text),
        col("description", "description", Text).nullable(),
        col("createdAt", "created_at", Text),
    ],
    primary_key: &["id"],
    sequence: true,
};

static USERS: TableSpec = TableSpec {
    kind: EntityKind::Users,
    table: "users",
    columns: &[
        col("id", "id", Integer),
        col("email", "email", Text),
        col("username", "username", Text),
        col("passwordHash", "password_hash", Text),
        col("isActive", "is_active", Bool),
        col("createdAt", "created_at", Text),
        col("updatedAt", "updated_at", Text),
    ],
    primary_key: &["id"],
    sequence: true,
};

static PRODUCTS: TableSpec = TableSpec {
    kind: EntityKind::Products,
    table: "products",
    columns: &[
        col("id", "id", Integer),
        col("title", "title", Text),
        col("description", "description", Text).nullable(),
        col("priceCents", "price_cents", Integer),
        col("stock", "stock", Integer),
        col("platform", "platform", Text).nullable(),
        col("rating", "rating", Real).nullable(),
        col("imageUrl", "image_url", Text).nullable(),
        col("isActive", "is_active", Bool),
        col("createdAt", "created_at", Text),
        col("updatedAt", "updated_at", Text),
    ],
    primary_key: &["id"],
    sequence: true,
};

static USER_ROLES: TableSpec = TableSpec {
    kind: EntityKind::UserRoles,
    table: "user_roles",
    columns: &[
        col("userId", "user_id", Integer).references(EntityKind::Users),
        col("roleId", "role_id", Integer).references(EntityKind::Roles),
        col("assignedAt", "assigned_at", Text),
    ],
    primary_key: &["userId", "roleId"],
    sequence: false,
};

static PRODUCT_CATEGORIES: TableSpec = TableSpec {
    kind: EntityKind::ProductCategories,
    table: "product_categories",
    columns: &[
        col("productId", "product_id", Integer).references(EntityKind::Products),
        col("categoryId", "category_id", Integer).references(EntityKind::Categories),
    ],
    primary_key: &["productId", "categoryId"],
    sequence: false,
};

static PAYMENT_METHODS: TableSpec = TableSpec {
    kind: EntityKind::PaymentMethods,
    table: "payment_methods",
    columns: &[
        col("id", "id", Integer),
        col("userId", "user_id", Integer).references(EntityKind::Users),
        col("provider", "provider", Text),
        col("brand", "brand", Text).nullable(),
        col("last4", "last4", Text).nullable(),
        col("expMonth", "exp_month", Integer).nullable(),
        col("expYear", "exp_year", Integer).nullable(),
        col("isDefault", "is_default", Bool),
        col("createdAt", "created_at", Text),
    ],
    primary_key: &["id"],
    sequence: true,
};

static ORDERS: TableSpec = TableSpec {
    kind: EntityKind::Orders,
    table: "orders",
    columns: &[
        col("id", "id", Integer),
        col("userId", "user_id", Integer).references(EntityKind::Users),
        col("paymentMethodId", "payment_method_id", Integer)
            .nullable()
            .references(EntityKind::PaymentMethods),
        col("status", "status", Text),
        col("totalCents", "total_cents", Integer),
        col("shippingAddress", "shipping_address", Text).nullable(),
        col("createdAt", "created_at", Text),
        col("updatedAt", "updated_at", Text),
    ],
    primary_key: &["id"],
    sequence: true,
};

static ORDER_ITEMS: TableSpec = TableSpec {
    kind: EntityKind::OrderItems,
    table: "order_items",
    columns: &[
        col("id", "id", Integer),
        col("orderId", "order_id", Integer).references(EntityKind::Orders),
        col("productId", "product_id", Integer).references(EntityKind::Products),
        col("quantity", "quantity", Integer),
        col("unitPriceCents", "unit_price_cents", Integer),
    ],
    primary_key: &["id"],
    sequence: true,
};

static USER_PREFERENCES: TableSpec = TableSpec {
    kind: EntityKind::UserPreferences,
    table: "user_preferences",
    columns: &[
        col("id", "id", Integer),
        col("userId", "user_id", Integer).references(EntityKind::Users),
        col("theme", "theme", Text),
        col("language", "language", Text),
        col("newsletter", "newsletter", Bool),
        col("updatedAt", "updated_at", Text),
    ],
    primary_key: &["id"],
    sequence: true,
};

/// Descriptor of the table backing `kind`.
#[must_use]
pub fn table_spec(kind: EntityKind) -> &'static TableSpec {
    match kind {
        EntityKind::Roles => &ROLES,
        EntityKind::Categories => &CATEGORIES,
        EntityKind::Users => &USERS,
        EntityKind::Products => &PRODUCTS,
        EntityKind::UserRoles => &USER_ROLES,
        EntityKind::ProductCategories => &PRODUCT_CATEGORIES,
        EntityKind::Orders => &ORDERS,
        EntityKind::OrderItems => &ORDER_ITEMS,
        EntityKind::PaymentMethods => &PAYMENT_METHODS,
        EntityKind::UserPreferences => &USER_PREFERENCES,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn specs_match_their_kind() {
        for kind in EntityKind::ALL {
            let spec = table_spec(kind);
            assert_eq!(spec.kind, kind);
            for field in spec.primary_key {
                assert!(spec.column(field).is_some(), "{kind}: pk '{field}' not a column");
            }
            assert_eq!(spec.sequence, matches!(spec.primary_key, ["id"]));
        }
    }

    #[test]
    fn foreign_key_columns_match_declared_edges() {
        for kind in EntityKind::ALL {
            let from_columns: BTreeSet<(EntityKind, bool)> = table_spec(kind)
                .columns
                .iter()
                .filter_map(|c| c.references.map(|target| (target, c.nullable)))
                .collect();
            let declared: BTreeSet<(EntityKind, bool)> = kind
                .dependencies()
                .map(|dep| (dep.dependency, dep.optional))
                .collect();
            assert_eq!(from_columns, declared, "{kind}");
        }
    }

    #[test]
    fn select_orders_by_primary_key() {
        assert_eq!(
            table_spec(EntityKind::UserRoles).select_sql(),
            "SELECT user_id, role_id, assigned_at FROM user_roles ORDER BY user_id, role_id"
        );
    }

    #[test]
    fn insert_has_one_tuple_per_row() {
        assert_eq!(
            table_spec(EntityKind::ProductCategories).insert_sql(3),
            "INSERT INTO product_categories (product_id, category_id) VALUES (?, ?), (?, ?), (?, ?)"
        );
    }

    #[test]
    fn max_id_targets_surrogate_key() {
        assert_eq!(
            table_spec(EntityKind::Orders).max_id_sql(),
            "SELECT COALESCE(MAX(id), 0) FROM orders"
        );
    }
}
