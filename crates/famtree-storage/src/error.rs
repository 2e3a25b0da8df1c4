//! Storage error types for famtree-storage.
//!
//! [`StorageError`] covers SQLite failures, filesystem failures around the
//! artifact, out-of-order exporter calls, and graph errors surfaced while
//! running a full export.

use famtree_core::CoreError;
use thiserror::Error;

use crate::exporter::ExportState;

/// Errors produced by storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An SQLite call failed.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The artifact path could not be prepared.
    #[error("i/o error on '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An exporter step was called out of order.
    #[error("exporter is in state {actual:?}, expected {expected:?}")]
    InvalidState {
        expected: ExportState,
        actual: ExportState,
    },

    /// Loading or deriving the graph failed.
    #[error(transparent)]
    Graph(#[from] CoreError),
}
