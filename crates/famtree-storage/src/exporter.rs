//! The export state machine and the one-call [`export`] pipeline.
//!
//! An [`Exporter`] moves strictly forward through [`ExportState`]:
//!
//! ```text
//! Created → SchemaInitialized → AttributesPopulated → NodesPopulated
//!         → IndexesBuilt → ViewsPopulated → Compacted → Closed
//! ```
//!
//! Every step commits before returning and nothing is rolled back. If any
//! step fails the artifact on disk is incomplete and must be deleted; a new
//! build starts again from `Created`. [`export`] removes the previous
//! artifact before it validates the graph, so a rejected input never leaves
//! an older database readable at the output path.

use std::path::{Path, PathBuf};

use serde::Serialize;

use famtree_core::{
    materialize, Anchor, AttributeCatalog, Derivation, FactRow, FamilyGraph, GraphSource,
};

use crate::error::StorageError;
use crate::hash::fact_digest;
use crate::schema;
use crate::store::FactStore;
use crate::views::{populate_views, ViewCounts};

/// Default identifier of the anchor node, shared with the browsing client.
pub const DEFAULT_ANCHOR_ID: i64 = 1_000_000;

/// Default locale row of the metadata table.
pub const DEFAULT_LOCALE: &str = "en_US";

/// Position of an [`Exporter`] in the build sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum ExportState {
    Created,
    SchemaInitialized,
    AttributesPopulated,
    NodesPopulated,
    IndexesBuilt,
    ViewsPopulated,
    Compacted,
    Closed,
}

/// Everything a full export needs besides the graph and catalog.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Artifact path; any existing file is replaced.
    pub output: PathBuf,
    pub anchor: Anchor,
    pub locale: String,
}

impl ExportOptions {
    pub fn new(output: impl Into<PathBuf>, anchor: Anchor) -> Self {
        ExportOptions {
            output: output.into(),
            anchor,
            locale: DEFAULT_LOCALE.to_string(),
        }
    }
}

/// What a successful export wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub output: String,
    pub nodes: usize,
    pub attributes: usize,
    pub natural_rows: usize,
    pub child_rows: usize,
    pub sibling_rows: usize,
    pub unknown_attributes: usize,
    /// blake3 digest of the fact table after the views were added.
    pub digest: String,
}

/// Forward-only writer of one artifact.
pub struct Exporter {
    store: FactStore,
    state: ExportState,
}

impl Exporter {
    /// Replaces any artifact at `path` with an empty database.
    pub fn create(path: &Path) -> Result<Self, StorageError> {
        tracing::info!("creating {}", path.display());
        Ok(Exporter {
            store: FactStore::create(path)?,
            state: ExportState::Created,
        })
    }

    /// Starts an export into an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        Ok(Exporter {
            store: FactStore::in_memory()?,
            state: ExportState::Created,
        })
    }

    pub fn state(&self) -> ExportState {
        self.state
    }

    pub fn store(&self) -> &FactStore {
        &self.store
    }

    fn require_state(&self, expected: ExportState) -> Result<(), StorageError> {
        if self.state != expected {
            return Err(StorageError::InvalidState {
                expected,
                actual: self.state,
            });
        }
        Ok(())
    }

    /// Creates the metadata, catalog and fact tables.
    pub fn init_schema(&mut self, locale: &str) -> Result<(), StorageError> {
        self.require_state(ExportState::Created)?;
        tracing::info!("creating tables");
        self.store.init_schema(locale)?;
        self.state = ExportState::SchemaInitialized;
        Ok(())
    }

    pub fn populate_attributes(&mut self, catalog: &AttributeCatalog) -> Result<usize, StorageError> {
        self.require_state(ExportState::SchemaInitialized)?;
        tracing::info!("populating \"attributes\" table");
        let written = self.store.insert_attributes(catalog)?;
        self.state = ExportState::AttributesPopulated;
        Ok(written)
    }

    pub fn populate_nodes(&mut self, rows: &[FactRow]) -> Result<usize, StorageError> {
        self.require_state(ExportState::AttributesPopulated)?;
        tracing::info!("populating \"nodes\" table");
        let written = self.store.insert_facts(rows)?;
        self.state = ExportState::NodesPopulated;
        Ok(written)
    }

    /// Adds the indexes the view joins rely on.
    pub fn build_indexes(&mut self) -> Result<(), StorageError> {
        self.require_state(ExportState::NodesPopulated)?;
        tracing::info!("creating temporary indexes");
        self.store.create_indexes()?;
        self.state = ExportState::IndexesBuilt;
        Ok(())
    }

    pub fn populate_views(&mut self, catalog: &AttributeCatalog) -> Result<ViewCounts, StorageError> {
        self.require_state(ExportState::IndexesBuilt)?;
        let counts = populate_views(&mut self.store, catalog)?;
        self.state = ExportState::ViewsPopulated;
        Ok(counts)
    }

    /// Drops the temporary indexes and vacuums the file.
    pub fn compact(&mut self) -> Result<(), StorageError> {
        self.require_state(ExportState::ViewsPopulated)?;
        tracing::info!("cleaning up database");
        self.store.drop_indexes()?;
        self.store.vacuum()?;
        self.state = ExportState::Compacted;
        Ok(())
    }

    pub fn close(mut self) -> Result<(), StorageError> {
        self.require_state(ExportState::Compacted)?;
        self.state = ExportState::Closed;
        self.store.close()
    }
}

/// Derives, materializes and writes `graph` to `options.output`.
///
/// Any previous artifact is removed first, so a graph error leaves no file
/// at all. Storage errors leave a partial file behind that the caller must
/// delete.
pub fn export(
    graph: &FamilyGraph,
    catalog: &AttributeCatalog,
    options: &ExportOptions,
) -> Result<ExportSummary, StorageError> {
    schema::remove_artifact(&options.output)?;
    let derived = Derivation::compute(graph, catalog, &options.anchor)?;
    let materialized = materialize(graph, &derived, catalog)?;
    if !materialized.unknown.is_empty() {
        tracing::warn!(
            "{} attribute(s) not in the catalog were skipped",
            materialized.unknown.len()
        );
    }

    let mut exporter = Exporter::create(&options.output)?;
    exporter.init_schema(&options.locale)?;
    let attributes = exporter.populate_attributes(catalog)?;
    let natural_rows = exporter.populate_nodes(&materialized.rows)?;
    exporter.build_indexes()?;
    let counts = exporter.populate_views(catalog)?;
    let digest = fact_digest(&exporter.store().facts()?);
    exporter.compact()?;
    exporter.close()?;

    let summary = ExportSummary {
        output: options.output.display().to_string(),
        nodes: graph.len(),
        attributes,
        natural_rows,
        child_rows: counts.children,
        sibling_rows: counts.siblings,
        unknown_attributes: materialized.unknown.len(),
        digest: digest.to_hex().to_string(),
    };
    tracing::info!(
        "wrote {} rows for {} nodes to {}",
        summary.natural_rows + summary.child_rows + summary.sibling_rows,
        summary.nodes,
        summary.output
    );
    Ok(summary)
}

/// Loads records from `source` and runs [`export`].
pub fn export_from_source(
    source: &dyn GraphSource,
    catalog: &AttributeCatalog,
    options: &ExportOptions,
) -> Result<ExportSummary, StorageError> {
    schema::remove_artifact(&options.output)?;
    tracing::info!("loading family tree data");
    let graph = FamilyGraph::from_records(source.load()?);
    export(&graph, catalog, options)
}
