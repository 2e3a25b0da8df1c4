//! Canonical node order.
//!
//! Nodes are ranked by a derived key compared in plain ascending order:
//!
//! 1. heavier ancestry first;
//! 2. dated nodes before undated ones;
//! 3. earlier birth-date text first (raw lexicographic comparison);
//! 4. smaller display name first;
//! 5. smaller key first.
//!
//! Keys are unique, so the last criterion makes the order strict and the
//! resulting identifiers reproducible across runs.

use std::cmp::Reverse;

use crate::graph::FamilyGraph;
use crate::id::NodeIdx;

/// Ordering key of one node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey<'a> {
    weight: Reverse<u64>,
    undated: bool,
    birthdate: &'a str,
    name: &'a str,
    key: &'a str,
}

impl<'a> SortKey<'a> {
    pub fn of(graph: &'a FamilyGraph, weights: &[u64], idx: NodeIdx) -> Self {
        let node = graph.node(idx);
        let birthdate = node.birthdate();
        SortKey {
            weight: Reverse(weights[idx.index()]),
            undated: birthdate.is_none(),
            birthdate: birthdate.unwrap_or_default(),
            name: node.display_name(),
            key: node.key(),
        }
    }
}

/// Returns every node of `graph` in canonical order.
pub fn canonical_order(graph: &FamilyGraph, weights: &[u64]) -> Vec<NodeIdx> {
    let mut order: Vec<NodeIdx> = graph.iter().map(|(idx, _)| idx).collect();
    order.sort_by_cached_key(|&idx| SortKey::of(graph, weights, idx));
    order
}
