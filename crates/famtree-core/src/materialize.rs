//! Flattening of node records into entity-attribute-value fact rows.
//!
//! Nodes are visited in identifier order and each node's attributes in
//! catalog-code order. Scalars are stored verbatim. Linking attributes are
//! resolved to the target's identifier and a snapshot of the target's display
//! name. Attributes the catalog does not know (including the derived
//! `child`/`sibling` names) are dropped and reported.

use serde::Serialize;

use crate::catalog::{AttributeCatalog, AttributeDef, AttributeKind};
use crate::derive::Derivation;
use crate::error::CoreError;
use crate::graph::FamilyGraph;
use crate::id::{AttrCode, NodeId};

/// One row of the fact table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct FactRow {
    pub node_id: NodeId,
    pub attr: AttrCode,
    /// Target node for linking and derived attributes; `None` for scalars.
    pub link_id: Option<NodeId>,
    pub text_value: String,
}

impl FactRow {
    pub fn scalar(node_id: NodeId, attr: AttrCode, text_value: impl Into<String>) -> Self {
        FactRow {
            node_id,
            attr,
            link_id: None,
            text_value: text_value.into(),
        }
    }

    pub fn link(node_id: NodeId, attr: AttrCode, link_id: NodeId, text_value: impl Into<String>) -> Self {
        FactRow {
            node_id,
            attr,
            link_id: Some(link_id),
            text_value: text_value.into(),
        }
    }
}

/// A node attribute that had no catalog entry and was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnknownAttribute {
    pub node: String,
    pub attribute: String,
}

/// Result of flattening a whole graph.
#[derive(Debug, Clone, Default)]
pub struct Materialized {
    pub rows: Vec<FactRow>,
    pub unknown: Vec<UnknownAttribute>,
}

/// Flattens every node of `graph` into fact rows.
///
/// Fails with [`CoreError::DanglingLink`] on the first linking attribute whose
/// value is not a node key.
pub fn materialize(
    graph: &FamilyGraph,
    derived: &Derivation,
    catalog: &AttributeCatalog,
) -> Result<Materialized, CoreError> {
    let mut out = Materialized::default();

    for &idx in derived.ordered() {
        let node = graph.node(idx);
        let node_id = derived.id(idx);

        let mut known: Vec<(&AttributeDef, &str)> = Vec::with_capacity(node.attributes().len());
        for (attribute, value) in node.attributes() {
            match catalog.resolve(attribute) {
                Some(def) if def.kind != AttributeKind::Derived => known.push((def, value.as_str())),
                _ => {
                    tracing::warn!("ignoring unknown attribute '{}' on node '{}'", attribute, node.key());
                    out.unknown.push(UnknownAttribute {
                        node: node.key().to_string(),
                        attribute: attribute.clone(),
                    });
                }
            }
        }
        known.sort_by_key(|(def, _)| def.code);

        for (def, value) in known {
            let row = if def.kind.is_linking() {
                let target = graph.lookup(value).ok_or_else(|| CoreError::DanglingLink {
                    node: node.key().to_string(),
                    attribute: def.name.clone(),
                    target: value.to_string(),
                })?;
                FactRow::link(
                    node_id,
                    def.code,
                    derived.id(target),
                    graph.node(target).display_name(),
                )
            } else {
                FactRow::scalar(node_id, def.code, value)
            };
            tracing::debug!(
                "adding {} : {} : {} = {:?}",
                node.key(),
                def.name,
                row.text_value,
                row.link_id
            );
            out.rows.push(row);
        }
    }

    Ok(out)
}
