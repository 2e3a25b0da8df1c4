//! SQLite export of derived family-tree facts.
//!
//! Writes the browsing client's entity-attribute-value schema: a locale
//! table, the attribute catalog, and a single fact table holding both the
//! natural rows and the derived children and siblings rows.
//!
//! # Architecture
//!
//! [`FactStore`] is the typed wrapper around the connection. [`Exporter`]
//! sequences the build steps as a forward-only state machine, and
//! [`export`] runs the whole pipeline from a [`famtree_core::FamilyGraph`].
//!
//! # Modules
//!
//! - [`error`]: StorageError enum with all failure modes
//! - [`schema`]: SQL schema constants and connection setup
//! - [`store`]: FactStore bulk writes and read-back queries
//! - [`views`]: children and siblings self-joins
//! - [`hash`]: blake3 digest of the fact table
//! - [`exporter`]: ExportState machine and the full export pipeline

pub mod error;
pub mod exporter;
pub mod hash;
pub mod schema;
pub mod store;
pub mod views;

// Re-export key types for ergonomic use.
pub use error::StorageError;
pub use exporter::{
    export, export_from_source, ExportOptions, ExportState, ExportSummary, Exporter,
    DEFAULT_ANCHOR_ID, DEFAULT_LOCALE,
};
pub use hash::fact_digest;
pub use store::FactStore;
pub use views::{View, ViewCounts};
