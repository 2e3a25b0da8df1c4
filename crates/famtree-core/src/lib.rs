//! In-memory derivation pipeline for family-tree exports.
//!
//! Turns a keyed set of hand-authored person records into fact rows ready to
//! be written to the browsing client's entity-attribute-value schema.
//!
//! # Modules
//!
//! - [`source`]: [`GraphSource`] trait and the YAML file reader
//! - [`graph`]: [`FamilyGraph`] arena with input normalization
//! - [`catalog`]: [`AttributeCatalog`] codes, labels and link classification
//! - [`weight`]: ancestry weights with cycle rejection
//! - [`order`]: canonical total order over nodes
//! - [`derive`]: anchored identifier assignment and the [`Derivation`] side table
//! - [`materialize`]: flattening into [`FactRow`]s
//! - [`error`]: [`CoreError`]

pub mod catalog;
pub mod derive;
pub mod error;
pub mod graph;
pub mod id;
pub mod materialize;
pub mod order;
pub mod source;
pub mod weight;

// Re-export commonly used types
pub use catalog::{AttributeCatalog, AttributeDef, AttributeKind};
pub use derive::{Anchor, Derivation};
pub use error::CoreError;
pub use graph::{FamilyGraph, Node, RawGraph, Record};
pub use id::{AttrCode, NodeId, NodeIdx};
pub use materialize::{materialize, FactRow, Materialized, UnknownAttribute};
pub use source::{GraphSource, YamlFileSource};
