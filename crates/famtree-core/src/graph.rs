//! FamilyGraph: the frozen, arena-backed node set a build works on.
//!
//! A [`FamilyGraph`] is built once from a [`RawGraph`] (whatever a
//! [`GraphSource`](crate::source::GraphSource) produced), normalizing the two
//! conventions of hand-authored records on the way in:
//!
//! - a missing or empty `name` is derived from the key, which is written as
//!   `(Display Name, disambiguator)`;
//! - `gender` values starting with `M`/`F` are spelled out.
//!
//! After construction the graph is read-only. Weights, canonical order and
//! identifiers are kept in a separate [`Derivation`](crate::derive::Derivation)
//! so no pass can observe a half-decorated node.

use std::collections::HashMap;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::catalog::AttributeCatalog;
use crate::id::NodeIdx;

/// Attribute name → textual value, in input order.
pub type Record = IndexMap<String, String>;

/// Node key → record, in input order.
pub type RawGraph = IndexMap<String, Record>;

const NAME_ATTR: &str = "name";
const GENDER_ATTR: &str = "gender";
const BIRTHDATE_ATTR: &str = "birthdate";

/// Probable-parent attributes that count toward ancestry weight but have no
/// catalog entry, so they are never exported or joined into the views.
pub const WEIGHT_ONLY_PARENTS: [&str; 1] = ["father?"];

/// A single person record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    key: String,
    attributes: Record,
}

impl Node {
    /// The unique textual key.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn attributes(&self) -> &Record {
        &self.attributes
    }

    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.attributes.get(attribute).map(String::as_str)
    }

    /// The display name; always present after normalization.
    pub fn display_name(&self) -> &str {
        self.get(NAME_ATTR).unwrap_or_default()
    }

    /// The raw birth-date text, if present and non-empty.
    pub fn birthdate(&self) -> Option<&str> {
        self.get(BIRTHDATE_ATTR).filter(|value| !value.is_empty())
    }
}

/// Arena of nodes addressed by [`NodeIdx`], with a key index.
#[derive(Debug, Clone, Default)]
pub struct FamilyGraph {
    nodes: Vec<Node>,
    index: HashMap<String, NodeIdx>,
}

impl FamilyGraph {
    /// Freezes raw records into a graph, normalizing names and genders.
    pub fn from_records(raw: RawGraph) -> Self {
        let mut nodes = Vec::with_capacity(raw.len());
        let mut index = HashMap::with_capacity(raw.len());

        for (key, mut attributes) in raw {
            let has_name = attributes
                .get(NAME_ATTR)
                .is_some_and(|name| !name.is_empty());
            if !has_name {
                attributes.insert(NAME_ATTR.to_string(), display_name_from_key(&key).to_string());
            }
            if let Some(gender) = attributes.get_mut(GENDER_ATTR) {
                *gender = normalize_gender(gender);
            }

            index.insert(key.clone(), NodeIdx(nodes.len() as u32));
            nodes.push(Node { key, attributes });
        }

        FamilyGraph { nodes, index }
    }

    /// Builds a graph from borrowed `(key, [(attribute, value)])` pairs.
    /// Intended for fixtures; goes through the same normalization as
    /// [`from_records`](Self::from_records).
    pub fn from_pairs(nodes: &[(&str, &[(&str, &str)])]) -> Self {
        let raw: RawGraph = nodes
            .iter()
            .map(|(key, attrs)| {
                let record: Record = attrs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect();
                (key.to_string(), record)
            })
            .collect();
        Self::from_records(raw)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` did not come from this graph.
    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.index()]
    }

    /// Resolves a key to its arena position.
    pub fn lookup(&self, key: &str) -> Option<NodeIdx> {
        self.index.get(key).copied()
    }

    /// Iterates nodes in arena (input) order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(pos, node)| (NodeIdx(pos as u32), node))
    }

    /// Resolvable parents of `idx`, one entry per parent-link attribute in
    /// catalog order followed by [`WEIGHT_ONLY_PARENTS`]. A parent named by
    /// two attributes appears twice. Unresolvable keys are skipped.
    pub fn parents(&self, idx: NodeIdx, catalog: &AttributeCatalog) -> SmallVec<[NodeIdx; 4]> {
        let node = self.node(idx);
        catalog
            .parent_names()
            .chain(WEIGHT_ONLY_PARENTS)
            .filter_map(|attribute| node.get(attribute))
            .filter_map(|key| self.lookup(key))
            .collect()
    }
}

/// Extracts the display name from a `(Display Name, disambiguator)` key.
pub fn display_name_from_key(key: &str) -> &str {
    let inner = key.trim_start_matches('(').trim_end_matches(')');
    inner.split(',').next().unwrap_or(inner)
}

/// Spells out `M…`/`F…` genders; other values are kept as written.
pub fn normalize_gender(value: &str) -> String {
    let upper = value.trim().to_uppercase();
    if upper.starts_with('M') {
        "Male".to_string()
    } else if upper.starts_with('F') {
        "Female".to_string()
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::indexmap;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn display_name_from_key_takes_first_field() {
        assert_eq!(display_name_from_key("(Ana Pérez, 1950)"), "Ana Pérez");
        assert_eq!(display_name_from_key("(Solo)"), "Solo");
        assert_eq!(display_name_from_key("plain"), "plain");
        assert_eq!(display_name_from_key("((Nested,x))"), "Nested");
    }

    #[test]
    fn gender_is_spelled_out() {
        assert_eq!(normalize_gender("M"), "Male");
        assert_eq!(normalize_gender("male"), "Male");
        assert_eq!(normalize_gender("f"), "Female");
        assert_eq!(normalize_gender("unknown"), "unknown");
        assert_eq!(normalize_gender(""), "");
    }

    #[test]
    fn missing_or_empty_name_defaults_from_key() {
        let graph = FamilyGraph::from_records(indexmap! {
            "(Ana, 1)".to_string() => record(&[]),
            "(Bo, 2)".to_string() => record(&[("name", "")]),
            "(Cy, 3)".to_string() => record(&[("name", "Cyrus")]),
        });
        let names: Vec<&str> = graph.iter().map(|(_, n)| n.display_name()).collect();
        assert_eq!(names, vec!["Ana", "Bo", "Cyrus"]);
    }

    #[test]
    fn absent_gender_stays_absent() {
        let graph = FamilyGraph::from_records(indexmap! {
            "a".to_string() => record(&[("gender", "F")]),
            "b".to_string() => record(&[]),
        });
        assert_eq!(graph.node(NodeIdx(0)).get("gender"), Some("Female"));
        assert_eq!(graph.node(NodeIdx(1)).get("gender"), None);
    }

    #[test]
    fn empty_birthdate_counts_as_absent() {
        let graph = FamilyGraph::from_records(indexmap! {
            "a".to_string() => record(&[("birthdate", "")]),
            "b".to_string() => record(&[("birthdate", "1901-02-03")]),
        });
        assert_eq!(graph.node(NodeIdx(0)).birthdate(), None);
        assert_eq!(graph.node(NodeIdx(1)).birthdate(), Some("1901-02-03"));
    }

    #[test]
    fn parents_follow_catalog_order_and_skip_unknown_keys() {
        let catalog = AttributeCatalog::standard();
        let graph = FamilyGraph::from_records(indexmap! {
            "mom".to_string() => record(&[]),
            "dad".to_string() => record(&[]),
            "kid".to_string() => record(&[
                ("mother", "mom"),
                ("father", "dad"),
                ("parent?", "nobody"),
                ("partner", "mom"),
            ]),
        });
        let kid = graph.lookup("kid").unwrap();
        let parents: Vec<NodeIdx> = graph.parents(kid, &catalog).into_iter().collect();
        assert_eq!(parents, vec![NodeIdx(1), NodeIdx(0)]);
    }

    #[test]
    fn parent_named_twice_is_listed_twice() {
        let catalog = AttributeCatalog::standard();
        let graph = FamilyGraph::from_records(indexmap! {
            "dad".to_string() => record(&[]),
            "kid".to_string() => record(&[("father", "dad"), ("parent", "dad")]),
        });
        let kid = graph.lookup("kid").unwrap();
        assert_eq!(graph.parents(kid, &catalog).len(), 2);
    }

    #[test]
    fn probable_father_counts_as_a_parent() {
        let catalog = AttributeCatalog::standard();
        assert!(catalog.resolve("father?").is_none());
        let graph = FamilyGraph::from_records(indexmap! {
            "mom".to_string() => record(&[]),
            "dad".to_string() => record(&[]),
            "kid".to_string() => record(&[("father?", "dad"), ("mother", "mom")]),
        });
        let kid = graph.lookup("kid").unwrap();
        let parents: Vec<NodeIdx> = graph.parents(kid, &catalog).into_iter().collect();
        assert_eq!(parents, vec![NodeIdx(0), NodeIdx(1)]);
    }
}
