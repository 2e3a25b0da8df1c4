//! Derived per-node state: weights, canonical order and anchored identifiers.
//!
//! Identifiers are assigned `1..=N` along the canonical order and then
//! translated so the anchor node lands on the caller's fixed identifier.
//! The translation keeps identifiers order-isomorphic to the canonical order;
//! the resulting range may include zero or negative values.

use crate::catalog::AttributeCatalog;
use crate::error::CoreError;
use crate::graph::FamilyGraph;
use crate::id::{NodeId, NodeIdx};
use crate::order::canonical_order;
use crate::weight::compute_weights;

/// The node that must receive a fixed identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub key: String,
    pub id: NodeId,
}

impl Anchor {
    pub fn new(key: impl Into<String>, id: i64) -> Self {
        Anchor {
            key: key.into(),
            id: NodeId(id),
        }
    }
}

/// Side table of everything derived from a [`FamilyGraph`] in one build.
#[derive(Debug, Clone)]
pub struct Derivation {
    weights: Vec<u64>,
    order: Vec<NodeIdx>,
    ids: Vec<NodeId>,
}

impl Derivation {
    /// Runs weight computation, canonical ordering and identifier assignment.
    pub fn compute(
        graph: &FamilyGraph,
        catalog: &AttributeCatalog,
        anchor: &Anchor,
    ) -> Result<Self, CoreError> {
        let weights = compute_weights(graph, catalog)?;
        let order = canonical_order(graph, &weights);
        let ids = assign_ids(graph, &order, anchor)?;
        tracing::info!(
            "derived {} nodes; anchor '{}' has id {}",
            graph.len(),
            anchor.key,
            anchor.id
        );
        Ok(Derivation { weights, order, ids })
    }

    pub fn weight(&self, idx: NodeIdx) -> u64 {
        self.weights[idx.index()]
    }

    pub fn id(&self, idx: NodeIdx) -> NodeId {
        self.ids[idx.index()]
    }

    /// Nodes in canonical order, which is also ascending identifier order.
    pub fn ordered(&self) -> &[NodeIdx] {
        &self.order
    }
}

/// Assigns identifiers along `order`, shifted so the anchor gets `anchor.id`.
/// The result is indexed by arena position.
///
/// Fails with [`CoreError::IdOverflow`] when the shifted range does not fit
/// in an `i64`.
pub fn assign_ids(
    graph: &FamilyGraph,
    order: &[NodeIdx],
    anchor: &Anchor,
) -> Result<Vec<NodeId>, CoreError> {
    let anchor_idx = graph
        .lookup(&anchor.key)
        .ok_or_else(|| CoreError::MissingAnchor {
            key: anchor.key.clone(),
        })?;

    let mut ids = vec![NodeId(0); graph.len()];
    for (position, &idx) in order.iter().enumerate() {
        ids[idx.index()] = NodeId(position as i64 + 1);
    }

    let overflow = || CoreError::IdOverflow {
        key: anchor.key.clone(),
        id: anchor.id.0,
    };
    let offset = anchor
        .id
        .0
        .checked_sub(ids[anchor_idx.index()].0)
        .ok_or_else(overflow)?;
    for id in &mut ids {
        id.0 = id.0.checked_add(offset).ok_or_else(overflow)?;
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn family() -> FamilyGraph {
        FamilyGraph::from_pairs(&[
            ("(Gran, 0)", &[("birthdate", "1920")]),
            ("(Mom, 0)", &[("mother", "(Gran, 0)"), ("birthdate", "1950")]),
            ("(Kid, 0)", &[("mother", "(Mom, 0)"), ("birthdate", "1980")]),
        ])
    }

    #[test]
    fn anchor_receives_fixed_id() {
        let graph = family();
        let catalog = AttributeCatalog::standard();
        let derived = Derivation::compute(&graph, &catalog, &Anchor::new("(Kid, 0)", 1_000_000)).unwrap();

        let kid = graph.lookup("(Kid, 0)").unwrap();
        let mom = graph.lookup("(Mom, 0)").unwrap();
        let gran = graph.lookup("(Gran, 0)").unwrap();
        assert_eq!(derived.id(kid), NodeId(1_000_000));
        // Kid weighs 3, Mom 2, Gran 1: Kid is first in canonical order.
        assert_eq!(derived.id(mom), NodeId(1_000_001));
        assert_eq!(derived.id(gran), NodeId(1_000_002));
        assert_eq!(derived.weight(kid), 3);
    }

    #[test]
    fn ids_may_go_non_positive() {
        let graph = family();
        let catalog = AttributeCatalog::standard();
        let derived = Derivation::compute(&graph, &catalog, &Anchor::new("(Gran, 0)", 1)).unwrap();
        let ids: Vec<i64> = derived.ordered().iter().map(|&i| derived.id(i).0).collect();
        assert_eq!(ids, vec![-1, 0, 1]);
    }

    #[test]
    fn ordered_matches_ascending_ids() {
        let graph = family();
        let catalog = AttributeCatalog::standard();
        let derived = Derivation::compute(&graph, &catalog, &Anchor::new("(Mom, 0)", 500)).unwrap();
        let ids: Vec<NodeId> = derived.ordered().iter().map(|&i| derived.id(i)).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn missing_anchor_is_fatal() {
        let graph = family();
        let catalog = AttributeCatalog::standard();
        match Derivation::compute(&graph, &catalog, &Anchor::new("(Nobody, 0)", 1)) {
            Err(CoreError::MissingAnchor { key }) => assert_eq!(key, "(Nobody, 0)"),
            other => panic!("expected MissingAnchor, got {:?}", other),
        }
    }

    #[test]
    fn extreme_anchor_ids_overflow_cleanly() {
        let graph = family();
        let catalog = AttributeCatalog::standard();
        // Kid is first in canonical order, so Mom and Gran land above i64::MAX.
        match Derivation::compute(&graph, &catalog, &Anchor::new("(Kid, 0)", i64::MAX)) {
            Err(CoreError::IdOverflow { key, id }) => {
                assert_eq!(key, "(Kid, 0)");
                assert_eq!(id, i64::MAX);
            }
            other => panic!("expected IdOverflow, got {:?}", other),
        }
        // Gran is last, so everything else lands below i64::MIN.
        assert!(matches!(
            Derivation::compute(&graph, &catalog, &Anchor::new("(Gran, 0)", i64::MIN)),
            Err(CoreError::IdOverflow { .. })
        ));
    }

    #[test]
    fn extreme_anchor_ids_that_fit_are_kept() {
        let graph = family();
        let catalog = AttributeCatalog::standard();
        let derived = Derivation::compute(&graph, &catalog, &Anchor::new("(Gran, 0)", i64::MAX)).unwrap();
        let ids: Vec<i64> = derived.ordered().iter().map(|&i| derived.id(i).0).collect();
        assert_eq!(ids, vec![i64::MAX - 2, i64::MAX - 1, i64::MAX]);
    }

    #[test]
    fn cyclic_graph_fails_before_assignment() {
        let graph = FamilyGraph::from_pairs(&[("a", &[("parent", "b")]), ("b", &[("parent", "a")])]);
        let catalog = AttributeCatalog::standard();
        assert!(matches!(
            Derivation::compute(&graph, &catalog, &Anchor::new("a", 1)),
            Err(CoreError::CyclicAncestry { .. })
        ));
    }
}
