//! ID newtypes for family-tree entities.
//!
//! [`NodeIdx`] is the dense arena position of a node inside a
//! [`FamilyGraph`](crate::graph::FamilyGraph) and doubles as the petgraph
//! index of the ancestry graph. [`NodeId`] is the persisted identifier written
//! to the fact table; it is anchored, possibly negative, and opaque to
//! consumers. [`AttrCode`] is a catalog attribute code.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// Arena position of a node. Only meaningful within one build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeIdx(pub u32);

/// Persisted node identifier (the `node_id` / `link_id` columns).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub i64);

/// Catalog attribute code (the `attr_id` column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AttrCode(pub u32);

impl NodeIdx {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeIdx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AttrCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// Bridge between NodeIdx and petgraph's NodeIndex<u32>.

impl From<NodeIndex<u32>> for NodeIdx {
    fn from(idx: NodeIndex<u32>) -> Self {
        NodeIdx(idx.index() as u32)
    }
}

impl From<NodeIdx> for NodeIndex<u32> {
    fn from(idx: NodeIdx) -> Self {
        NodeIndex::new(idx.index())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_idx_to_node_index_roundtrip() {
        let idx = NodeIndex::<u32>::new(42);
        let node = NodeIdx::from(idx);
        assert_eq!(node.0, 42);

        let back: NodeIndex<u32> = node.into();
        assert_eq!(back.index(), 42);
    }

    #[test]
    fn node_id_display_keeps_sign() {
        assert_eq!(format!("{}", NodeId(-7)), "-7");
        assert_eq!(format!("{}", NodeId(1_000_000)), "1000000");
    }

    #[test]
    fn attr_code_display() {
        assert_eq!(format!("{}", AttrCode(90)), "90");
    }

    #[test]
    fn node_ids_order_numerically() {
        let mut ids = vec![NodeId(3), NodeId(-1), NodeId(0)];
        ids.sort();
        assert_eq!(ids, vec![NodeId(-1), NodeId(0), NodeId(3)]);
    }
}
