//! Core error types for famtree-core.
//!
//! Uses `thiserror` for structured, matchable variants. Every variant here is
//! fatal to a build; the only non-fatal condition (an attribute missing from
//! the catalog) is reported through
//! [`UnknownAttribute`](crate::materialize::UnknownAttribute) instead.

use thiserror::Error;

/// Errors produced while loading or deriving a family graph.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The input source is missing or cannot be parsed.
    #[error("cannot load '{path}': {reason}")]
    Load { path: String, reason: String },

    /// The anchor key does not name any node.
    #[error("anchor node '{key}' not found")]
    MissingAnchor { key: String },

    /// The parent relation contains a cycle through this node.
    #[error("cyclic ancestry through node '{key}'")]
    CyclicAncestry { key: String },

    /// Shifting identifiers onto the anchor id leaves the `i64` range.
    #[error("anchor id {id} for node '{key}' pushes node identifiers out of range")]
    IdOverflow { key: String, id: i64 },

    /// A linking attribute points at a key that is not in the graph.
    #[error("node '{node}' attribute '{attribute}' links to unknown node '{target}'")]
    DanglingLink {
        node: String,
        attribute: String,
        target: String,
    },

    /// A custom attribute catalog is malformed.
    #[error("invalid attribute catalog: {reason}")]
    InvalidCatalog { reason: String },
}
