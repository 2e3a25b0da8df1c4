//! SQL schema of the exported artifact.
//!
//! Table and column names are a compatibility contract with the browsing
//! client and must not change. The two indexes exist only while the views are
//! derived; the client builds its own.

use std::path::Path;

use rusqlite::Connection;

use crate::error::StorageError;

/// Locale row required by the client runtime.
pub const CREATE_METADATA: &str = "CREATE TABLE IF NOT EXISTS android_metadata (locale TEXT)";
pub const INSERT_METADATA: &str = "INSERT INTO android_metadata (locale) VALUES (?1)";

/// Attribute catalog.
pub const CREATE_ATTRS: &str = "
    CREATE TABLE attrs_tab (
          attr_id     INTEGER NOT NULL
        , attr_hidden INTEGER NOT NULL DEFAULT 0
        , attr_value  TEXT NOT NULL
    )";

/// Fact table; natural and derived rows share it.
pub const CREATE_NODES: &str = "
    CREATE TABLE nodes_tab (
          node_id     INTEGER NOT NULL
        , attr_id     INTEGER NOT NULL
        , link_id     INTEGER NULL DEFAULT NULL
        , text_value  TEXT NOT NULL
    )";

pub const INSERT_ATTR: &str =
    "INSERT INTO attrs_tab (attr_id, attr_hidden, attr_value) VALUES (?1, ?2, ?3)";

pub const INSERT_FACT: &str =
    "INSERT INTO nodes_tab (node_id, attr_id, link_id, text_value) VALUES (?1, ?2, ?3, ?4)";

pub const CREATE_INDEXES: [&str; 2] = [
    "CREATE UNIQUE INDEX nodes_idx ON nodes_tab (node_id, attr_id, link_id)",
    "CREATE INDEX nodes_idx2 ON nodes_tab (link_id, attr_id)",
];

pub const DROP_INDEXES: [&str; 2] = ["DROP INDEX nodes_idx", "DROP INDEX nodes_idx2"];

/// Deletes any artifact at `path`. A missing file is not an error.
pub fn remove_artifact(path: &Path) -> Result<(), StorageError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            tracing::debug!("removed previous artifact {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(StorageError::Io {
            path: path.display().to_string(),
            source,
        }),
    }
}

/// Deletes any artifact at `path` and opens a fresh database there.
pub fn create_database(path: &Path) -> Result<Connection, StorageError> {
    remove_artifact(path)?;
    let conn = Connection::open(path)?;
    configure(&conn)?;
    Ok(conn)
}

/// Opens an in-memory database (for testing).
pub fn create_in_memory() -> Result<Connection, StorageError> {
    let conn = Connection::open_in_memory()?;
    configure(&conn)?;
    Ok(conn)
}

fn configure(conn: &Connection) -> Result<(), StorageError> {
    // Failed builds are deleted and rerun from scratch.
    conn.pragma_update(None, "synchronous", "OFF")?;
    Ok(())
}

/// Creates the metadata, catalog and fact tables and writes the locale row.
pub fn create_tables(conn: &Connection, locale: &str) -> Result<(), StorageError> {
    conn.execute(CREATE_METADATA, [])?;
    conn.execute(INSERT_METADATA, [locale])?;
    conn.execute(CREATE_ATTRS, [])?;
    conn.execute(CREATE_NODES, [])?;
    Ok(())
}
