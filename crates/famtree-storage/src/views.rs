//! Children and siblings views, derived from the fact table by self-joins.
//!
//! Both views read only rows that are already in `nodes_tab`: a node's
//! parents are its parent-link rows, and a node's display name is its name
//! row. Results are written back into `nodes_tab` under the synthetic
//! [`CHILD`] and [`SIBLING`] codes, one row per distinct linked node.
//!
//! Query parameters: `?1` is the node being expanded, `?2` the name code and
//! `?3..` the parent-link codes.

use std::collections::BTreeMap;

use rusqlite::{params, params_from_iter};
use serde::Serialize;

use famtree_core::catalog::{CHILD, NAME, SIBLING};
use famtree_core::{AttrCode, AttributeCatalog, NodeId};

use crate::error::StorageError;
use crate::schema;
use crate::store::FactStore;

/// A derived relation stored back into the fact table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Children,
    Siblings,
}

impl View {
    pub fn code(self) -> AttrCode {
        match self {
            View::Children => CHILD,
            View::Siblings => SIBLING,
        }
    }

    /// Builds the self-join for this view with `parent_count` parent codes.
    pub fn sql(self, parent_count: usize) -> String {
        let parents = (0..parent_count)
            .map(|i| format!("?{}", i + 3))
            .collect::<Vec<_>>()
            .join(", ");
        match self {
            // Every M with a parent row pointing at ?1.
            View::Children => format!(
                "SELECT A.node_id, A.text_value
                   FROM nodes_tab P
                   JOIN nodes_tab A
                     ON A.node_id = P.node_id
                    AND A.attr_id = ?2
                  WHERE P.link_id = ?1
                    AND P.attr_id IN ({parents})"
            ),
            // Every M != ?1 whose parent rows share a link_id with ?1's.
            View::Siblings => format!(
                "SELECT A.node_id, A.text_value
                   FROM nodes_tab P
                   JOIN nodes_tab O
                     ON O.link_id = P.link_id
                    AND O.node_id <> P.node_id
                    AND O.attr_id IN ({parents})
                   JOIN nodes_tab A
                     ON A.node_id = O.node_id
                    AND A.attr_id = ?2
                  WHERE P.node_id = ?1
                    AND P.attr_id IN ({parents})"
            ),
        }
    }
}

/// Row counts written by [`populate_views`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ViewCounts {
    pub children: usize,
    pub siblings: usize,
}

/// Populates the children view, then the siblings view.
pub fn populate_views(store: &mut FactStore, catalog: &AttributeCatalog) -> Result<ViewCounts, StorageError> {
    tracing::info!("adding \"children\" links");
    let children = populate_view(store, catalog, View::Children)?;
    tracing::info!("adding \"siblings\" links");
    let siblings = populate_view(store, catalog, View::Siblings)?;
    Ok(ViewCounts { children, siblings })
}

/// Expands every named node through `view` and appends the results.
/// Returns the number of rows written.
pub fn populate_view(
    store: &mut FactStore,
    catalog: &AttributeCatalog,
    view: View,
) -> Result<usize, StorageError> {
    let nodes = store.named_node_ids()?;
    let parent_codes = catalog.parent_codes();
    let sql = view.sql(parent_codes.len());
    let code = view.code();

    let tx = store.connection_mut().transaction()?;
    let mut written = 0;
    {
        let mut select = tx.prepare_cached(&sql)?;
        let mut insert = tx.prepare_cached(schema::INSERT_FACT)?;
        for node in nodes {
            let mut bound: Vec<i64> = Vec::with_capacity(parent_codes.len() + 2);
            bound.push(node.0);
            bound.push(i64::from(NAME.0));
            bound.extend(parent_codes.iter().map(|c| i64::from(c.0)));

            let mut links: BTreeMap<i64, String> = BTreeMap::new();
            let mut rows = select.query(params_from_iter(bound.iter()))?;
            while let Some(row) = rows.next()? {
                links.insert(row.get(0)?, row.get(1)?);
            }

            for (link_id, text_value) in links {
                tracing::debug!("adding {} : {} = {} : {}", node, text_value, link_id, code);
                insert.execute(params![node.0, code.0, link_id, text_value])?;
                written += 1;
            }
        }
    }
    tx.commit()?;
    Ok(written)
}

/// Reads back the linked identifiers of `node` under `view`, ascending.
pub fn linked(store: &FactStore, node: NodeId, view: View) -> Result<Vec<NodeId>, StorageError> {
    Ok(store
        .facts_for(node, view.code())?
        .into_iter()
        .filter_map(|row| row.link_id)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use famtree_core::FactRow;

    const FATHER: AttrCode = AttrCode(50);
    const MOTHER: AttrCode = AttrCode(51);
    const PARTNER: AttrCode = AttrCode(60);

    /// mom(1) + dad(2) -> kid_a(3), kid_b(4); dad -> half(5) with other(6).
    fn seeded() -> FactStore {
        let mut store = FactStore::in_memory().unwrap();
        store.init_schema("en_US").unwrap();
        let mut rows = Vec::new();
        for (id, name) in [(1, "Mom"), (2, "Dad"), (3, "KidA"), (4, "KidB"), (5, "Half"), (6, "Other")] {
            rows.push(FactRow::scalar(NodeId(id), NAME, name));
        }
        rows.push(FactRow::link(NodeId(1), PARTNER, NodeId(2), "Dad"));
        for kid in [3, 4] {
            rows.push(FactRow::link(NodeId(kid), FATHER, NodeId(2), "Dad"));
            rows.push(FactRow::link(NodeId(kid), MOTHER, NodeId(1), "Mom"));
        }
        rows.push(FactRow::link(NodeId(5), FATHER, NodeId(2), "Dad"));
        rows.push(FactRow::link(NodeId(5), MOTHER, NodeId(6), "Other"));
        store.insert_facts(&rows).unwrap();
        store.create_indexes().unwrap();
        store
    }

    #[test]
    fn children_come_from_parent_rows() {
        let mut store = seeded();
        let catalog = AttributeCatalog::standard();
        populate_view(&mut store, &catalog, View::Children).unwrap();

        assert_eq!(linked(&store, NodeId(2), View::Children).unwrap(), vec![NodeId(3), NodeId(4), NodeId(5)]);
        assert_eq!(linked(&store, NodeId(1), View::Children).unwrap(), vec![NodeId(3), NodeId(4)]);
        assert!(linked(&store, NodeId(3), View::Children).unwrap().is_empty());
    }

    #[test]
    fn child_rows_carry_the_child_name() {
        let mut store = seeded();
        let catalog = AttributeCatalog::standard();
        populate_view(&mut store, &catalog, View::Children).unwrap();
        let rows = store.facts_for(NodeId(6), CHILD).unwrap();
        assert_eq!(rows, vec![FactRow::link(NodeId(6), CHILD, NodeId(5), "Half")]);
    }

    #[test]
    fn partners_are_not_parents() {
        let mut store = seeded();
        let catalog = AttributeCatalog::standard();
        populate_view(&mut store, &catalog, View::Siblings).unwrap();
        // Mom's partner row points at Dad, but Mom has no parents.
        assert!(linked(&store, NodeId(1), View::Siblings).unwrap().is_empty());
    }

    #[test]
    fn siblings_through_two_parents_appear_once() {
        let mut store = seeded();
        let catalog = AttributeCatalog::standard();
        let written = populate_view(&mut store, &catalog, View::Siblings).unwrap();

        assert_eq!(linked(&store, NodeId(3), View::Siblings).unwrap(), vec![NodeId(4), NodeId(5)]);
        assert_eq!(linked(&store, NodeId(4), View::Siblings).unwrap(), vec![NodeId(3), NodeId(5)]);
        assert_eq!(linked(&store, NodeId(5), View::Siblings).unwrap(), vec![NodeId(3), NodeId(4)]);
        assert_eq!(written, 6);
    }

    #[test]
    fn views_ignore_rows_derived_earlier() {
        let mut store = seeded();
        let catalog = AttributeCatalog::standard();
        let counts = populate_views(&mut store, &catalog).unwrap();
        assert_eq!(counts, ViewCounts { children: 6, siblings: 6 });
    }

    #[test]
    fn sql_uses_placeholders_for_every_parent_code() {
        let sql = View::Siblings.sql(3);
        assert_eq!(sql.matches("?3, ?4, ?5").count(), 2);
        assert!(!sql.contains("50"));
    }
}
