//! Entity dependency graph and its topological orderings.
//!
//! A [`Dependency`] names a dependent kind and the kind it holds a foreign
//! key into.
//! The insertion order places every dependency before its dependents; the
//! deletion order is its reverse. Among nodes that become ready at the same
//! time, the one declared first wins, so both orders are stable across runs
//! and platforms.

use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::Debug;
use std::hash::Hash;

use rustworkx_core::connectivity::find_cycle;
use rustworkx_core::dag_algo::lexicographical_topological_sort;
use rustworkx_core::petgraph::graph::{DiGraph, NodeIndex};

use crate::errors::CyclicDependencyError;

/// A declared foreign-key edge: `dependent` references `dependency`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dependency<N> {
    pub dependent: N,
    pub dependency: N,
    /// The referencing column is nullable. Optional edges still constrain ordering.
    pub optional: bool,
}

impl<N> Dependency<N> {
    #[must_use]
    pub const fn required(dependent: N, dependency: N) -> Self {
        Self {
            dependent,
            dependency,
            optional: false,
        }
    }

    #[must_use]
    pub const fn optional(dependent: N, dependency: N) -> Self {
        Self {
            dependent,
            dependency,
            optional: true,
        }
    }
}

/// Both derived orderings, computed together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderPlan<N> {
    /// Parents before children.
    pub insertion: Vec<N>,
    /// Children before parents.
    pub deletion: Vec<N>,
}

/// Declared nodes plus the foreign-key edges between them.
///
/// Backed by a petgraph `DiGraph` whose node indices follow declaration
/// order, with each edge running from the referenced kind to its dependent.
#[derive(Debug, Clone)]
pub struct DependencyGraph<N> {
    dag: DiGraph<N, ()>,
    edges: Vec<Dependency<N>>,
}

impl<N: Copy + Eq + Hash + Debug> DependencyGraph<N> {
    /// Build a graph from nodes in declaration order and a set of edges.
    ///
    /// Duplicate nodes keep their first position. An edge endpoint that was not
    /// declared is appended as a node in order of first appearance.
    pub fn new(
        nodes: impl IntoIterator<Item = N>,
        edges: impl IntoIterator<Item = Dependency<N>>,
    ) -> Self {
        let edges: Vec<Dependency<N>> = edges.into_iter().collect();
        let mut dag = DiGraph::new();
        let mut index: HashMap<N, NodeIndex> = HashMap::new();

        let endpoints = edges.iter().flat_map(|e| [e.dependent, e.dependency]);
        for node in nodes.into_iter().chain(endpoints) {
            index.entry(node).or_insert_with(|| dag.add_node(node));
        }
        for edge in &edges {
            if let (Some(&from), Some(&to)) = (index.get(&edge.dependency), index.get(&edge.dependent)) {
                dag.add_edge(from, to, ());
            }
        }

        Self { dag, edges }
    }

    /// Nodes in declaration order.
    #[must_use]
    pub fn nodes(&self) -> Vec<N> {
        self.dag.node_weights().copied().collect()
    }

    #[must_use]
    pub fn edges(&self) -> &[Dependency<N>] {
        &self.edges
    }

    /// Topological order: a node appears only after every node it depends on.
    ///
    /// # Errors
    ///
    /// Returns `CyclicDependencyError` if the declared edges contain a cycle
    /// (including a node depending on itself).
    pub fn insertion_order(&self) -> Result<Vec<N>, CyclicDependencyError> {
        let Ok(sorted) = lexicographical_topological_sort(
            &self.dag,
            // Zero-padded so string order is declaration order.
            |node| Ok::<String, Infallible>(format!("{:08}", node.index())),
            false,
            None,
        );
        match sorted {
            Some(order) => Ok(order.into_iter().map(|node| self.dag[node]).collect()),
            None => Err(self.cycle_error()),
        }
    }

    /// Reverse topological order: a node appears only after every node that
    /// depends on it.
    ///
    /// # Errors
    ///
    /// Returns `CyclicDependencyError` if the declared edges contain a cycle.
    pub fn deletion_order(&self) -> Result<Vec<N>, CyclicDependencyError> {
        let mut order = self.insertion_order()?;
        order.reverse();
        Ok(order)
    }

    /// Compute both orders at once.
    ///
    /// # Errors
    ///
    /// Returns `CyclicDependencyError` if the declared edges contain a cycle.
    pub fn plan(&self) -> Result<OrderPlan<N>, CyclicDependencyError> {
        let insertion = self.insertion_order()?;
        let mut deletion = insertion.clone();
        deletion.reverse();
        Ok(OrderPlan {
            insertion,
            deletion,
        })
    }

    /// Name the members of the first cycle reachable in declaration order.
    fn cycle_error(&self) -> CyclicDependencyError {
        let cycle = self
            .dag
            .node_indices()
            .map(|start| find_cycle(&self.dag, Some(start)))
            .find(|cycle| !cycle.is_empty())
            .unwrap_or_default();

        let mut members: Vec<NodeIndex> = cycle.into_iter().flat_map(|(a, b)| [a, b]).collect();
        if members.is_empty() {
            members = self.dag.node_indices().collect();
        }
        members.sort_unstable();
        members.dedup();

        CyclicDependencyError {
            cycle: members
                .into_iter()
                .map(|node| format!("{:?}", self.dag[node]))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::entity::EntityKind;

    fn position<N: PartialEq>(order: &[N], node: &N) -> usize {
        order.iter().position(|n| n == node).unwrap()
    }

    #[test]
    fn managed_insertion_order() {
        let order = EntityKind::graph().insertion_order().unwrap();
        assert_eq!(
            order,
            vec![
                EntityKind::Roles,
                EntityKind::Categories,
                EntityKind::Users,
                EntityKind::Products,
                EntityKind::UserRoles,
                EntityKind::ProductCategories,
                EntityKind::PaymentMethods,
                EntityKind::Orders,
                EntityKind::OrderItems,
                EntityKind::UserPreferences,
            ]
        );
    }

    #[test]
    fn managed_deletion_order_is_reverse() {
        let plan = EntityKind::graph().plan().unwrap();
        let mut reversed = plan.insertion.clone();
        reversed.reverse();
        assert_eq!(plan.deletion, reversed);
        assert_eq!(plan.deletion.first(), Some(&EntityKind::UserPreferences));
        assert_eq!(plan.deletion.last(), Some(&EntityKind::Roles));
    }

    #[test]
    fn every_edge_respected() {
        let graph = EntityKind::graph();
        let plan = graph.plan().unwrap();
        assert_eq!(plan.insertion.len(), EntityKind::ALL.len());
        for edge in graph.edges() {
            assert!(
                position(&plan.insertion, &edge.dependency)
                    < position(&plan.insertion, &edge.dependent),
                "{:?} must be inserted before {:?}",
                edge.dependency,
                edge.dependent
            );
            assert!(
                position(&plan.deletion, &edge.dependent)
                    < position(&plan.deletion, &edge.dependency),
                "{:?} must be deleted before {:?}",
                edge.dependent,
                edge.dependency
            );
        }
    }

    #[test]
    fn roles_outlive_user_roles() {
        let plan = EntityKind::graph().plan().unwrap();
        assert!(
            position(&plan.deletion, &EntityKind::UserRoles)
                < position(&plan.deletion, &EntityKind::Roles)
        );
        let user_roles_at = position(&plan.insertion, &EntityKind::UserRoles);
        assert!(position(&plan.insertion, &EntityKind::Users) < user_roles_at);
        assert!(position(&plan.insertion, &EntityKind::Roles) < user_roles_at);
    }

    #[test]
    fn deterministic_across_calls() {
        let first = EntityKind::graph().plan().unwrap();
        for _ in 0..10 {
            assert_eq!(EntityKind::graph().plan().unwrap(), first);
        }
    }

    #[test]
    fn independent_nodes_keep_declaration_order() {
        let graph = DependencyGraph::new(["c", "a", "b"], std::iter::empty::<Dependency<&str>>());
        assert_eq!(graph.insertion_order().unwrap(), vec!["c", "a", "b"]);
        assert_eq!(graph.deletion_order().unwrap(), vec!["b", "a", "c"]);
    }

    #[test]
    fn new_kind_needs_only_its_edges() {
        let mut nodes: Vec<&str> = EntityKind::ALL.iter().map(|k| k.as_str()).collect();
        nodes.insert(0, "reviews");
        let edges = crate::entity::DEPENDENCIES
            .iter()
            .map(|d| Dependency {
                dependent: d.dependent.as_str(),
                dependency: d.dependency.as_str(),
                optional: d.optional,
            })
            .chain([
                Dependency::required("reviews", "users"),
                Dependency::required("reviews", "products"),
            ]);

        let order = DependencyGraph::new(nodes, edges).insertion_order().unwrap();
        assert_eq!(order.len(), 11);
        assert!(position(&order, &"users") < position(&order, &"reviews"));
        assert!(position(&order, &"products") < position(&order, &"reviews"));
    }

    #[test]
    fn undeclared_endpoint_is_appended() {
        let graph = DependencyGraph::new(["a"], [Dependency::required("a", "b")]);
        assert_eq!(graph.nodes(), vec!["a", "b"]);
        assert_eq!(graph.insertion_order().unwrap(), vec!["b", "a"]);
    }

    #[test]
    fn cycle_is_reported() {
        let graph = DependencyGraph::new(
            ["a", "b", "c", "d"],
            [
                Dependency::required("a", "b"),
                Dependency::required("b", "c"),
                Dependency::optional("c", "a"),
                Dependency::required("d", "a"),
            ],
        );
        let err = graph.insertion_order().unwrap_err();
        assert_eq!(err.cycle, vec!["\"a\"", "\"b\"", "\"c\""]);
        assert_eq!(err.to_string(), "cyclic dependency among: \"a\", \"b\", \"c\"");
        assert!(graph.plan().is_err());
        assert!(graph.deletion_order().is_err());
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let graph = DependencyGraph::new(["a"], [Dependency::required("a", "a")]);
        assert!(graph.insertion_order().is_err());
    }
}
