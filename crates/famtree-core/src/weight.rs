//! Ancestry weights.
//!
//! `weight(n) = 1 + Σ weight(p)` over every resolvable parent-link attribute
//! of `n`, plus the weight-only `father?`. The parent relation is loaded into
//! a petgraph `DiGraph` with one child → parent edge per parent attribute,
//! checked for cycles, and the weights are filled in reverse topological
//! order so each parent is final before any of its children reads it.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};

use crate::catalog::AttributeCatalog;
use crate::error::CoreError;
use crate::graph::FamilyGraph;
use crate::id::NodeIdx;

/// Builds the child → parent graph. Node `i` of the result is arena node `i`.
pub fn ancestry_graph(
    graph: &FamilyGraph,
    catalog: &AttributeCatalog,
) -> Result<DiGraph<(), (), u32>, CoreError> {
    let mut ancestry = DiGraph::<(), (), u32>::with_capacity(graph.len(), graph.len());
    for _ in 0..graph.len() {
        ancestry.add_node(());
    }
    for (idx, node) in graph.iter() {
        for parent in graph.parents(idx, catalog) {
            if parent == idx {
                return Err(CoreError::CyclicAncestry {
                    key: node.key().to_string(),
                });
            }
            ancestry.add_edge(idx.into(), parent.into(), ());
        }
    }
    Ok(ancestry)
}

/// Computes the weight of every node, indexed by arena position.
pub fn compute_weights(
    graph: &FamilyGraph,
    catalog: &AttributeCatalog,
) -> Result<Vec<u64>, CoreError> {
    let ancestry = ancestry_graph(graph, catalog)?;
    let order = toposort(&ancestry, None).map_err(|cycle| CoreError::CyclicAncestry {
        key: graph.node(cycle.node_id().into()).key().to_string(),
    })?;

    let mut weights = vec![0u64; graph.len()];
    for &node in order.iter().rev() {
        let weight = ancestry
            .neighbors(node)
            .fold(1u64, |acc, parent: NodeIndex<u32>| {
                acc.saturating_add(weights[parent.index()])
            });
        weights[node.index()] = weight;
    }

    tracing::debug!(
        "computed weights for {} nodes (max {})",
        weights.len(),
        weights.iter().copied().max().unwrap_or(0)
    );
    Ok(weights)
}

/// Weight of a single node; convenience over [`compute_weights`].
pub fn weight_of(
    graph: &FamilyGraph,
    catalog: &AttributeCatalog,
    idx: NodeIdx,
) -> Result<u64, CoreError> {
    Ok(compute_weights(graph, catalog)?[idx.index()])
}
