//! Managed entity kinds and their declared foreign-key dependencies.
//!
//! Wire names are camelCase (`userRoles`, `orderItems`) and match the keys of the
//! snapshot `database` section. Declaration order is significant: it breaks ties
//! in the topological sort so every ordering derived from it is deterministic.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::graph::{Dependency, DependencyGraph};

/// Declared foreign-key edges between managed kinds (`dependent -> dependency`).
///
/// A new managed kind only needs its outgoing edges listed here; both orderings
/// are derived from this table.
pub const DEPENDENCIES: &[Dependency<EntityKind>] = &[
    Dependency::required(EntityKind::UserRoles, EntityKind::Users),
    Dependency::required(EntityKind::UserRoles, EntityKind::Roles),
    Dependency::required(EntityKind::ProductCategories, EntityKind::Products),
    Dependency::required(EntityKind::ProductCategories, EntityKind::Categories),
    Dependency::required(EntityKind::OrderItems, EntityKind::Orders),
    Dependency::required(EntityKind::OrderItems, EntityKind::Products),
    Dependency::required(EntityKind::Orders, EntityKind::Users),
    Dependency::optional(EntityKind::Orders, EntityKind::PaymentMethods),
    Dependency::required(EntityKind::PaymentMethods, EntityKind::Users),
    Dependency::required(EntityKind::UserPreferences, EntityKind::Users),
];

// ---------------------------------------------------------------------------
// EntityKind
// ---------------------------------------------------------------------------

/// One of the ten record kinds owned by the snapshot subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Roles,
    Categories,
    Users,
    Products,
    UserRoles,
    ProductCategories,
    Orders,
    OrderItems,
    PaymentMethods,
    UserPreferences,
}

impl EntityKind {
    /// Every managed kind, in declaration order.
    pub const ALL: [Self; 10] = [
        Self::Roles,
        Self::Categories,
        Self::Users,
        Self::Products,
        Self::UserRoles,
        Self::ProductCategories,
        Self::Orders,
        Self::OrderItems,
        Self::PaymentMethods,
        Self::UserPreferences,
    ];

    /// Return the wire name used as a key in the snapshot `database` section.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Roles => "roles",
            Self::Categories => "categories",
            Self::Users => "users",
            Self::Products => "products",
            Self::UserRoles => "userRoles",
            Self::ProductCategories => "productCategories",
            Self::Orders => "orders",
            Self::OrderItems => "orderItems",
            Self::PaymentMethods => "paymentMethods",
            Self::UserPreferences => "userPreferences",
        }
    }

    /// Look up a kind by its wire name.
    #[must_use]
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == name)
    }

    /// Outgoing foreign-key edges of this kind.
    pub fn dependencies(self) -> impl Iterator<Item = Dependency<Self>> {
        DEPENDENCIES
            .iter()
            .copied()
            .filter(move |dep| dep.dependent == self)
    }

    /// The dependency graph over all managed kinds.
    #[must_use]
    pub fn graph() -> DependencyGraph<Self> {
        DependencyGraph::new(Self::ALL, Self::ALL.into_iter().flat_map(Self::dependencies))
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_serde() {
        for kind in EntityKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, serde_json::Value::String(kind.as_str().to_string()));
            assert_eq!(EntityKind::from_wire(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn unknown_wire_name() {
        assert_eq!(EntityKind::from_wire("sessions"), None);
        assert_eq!(EntityKind::from_wire("user_roles"), None);
    }

    #[test]
    fn dependencies_originate_from_their_kind() {
        for kind in EntityKind::ALL {
            for dep in kind.dependencies() {
                assert_eq!(dep.dependent, kind);
                assert_ne!(dep.dependency, kind);
            }
        }
    }
}
