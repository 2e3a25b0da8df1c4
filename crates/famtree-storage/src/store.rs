//! [`FactStore`]: typed access to the artifact's tables.
//!
//! Bulk writes run inside one transaction each with cached prepared
//! statements. Reads return rows in insertion (rowid) order unless stated
//! otherwise.

use std::path::Path;

use rusqlite::{params, Connection, Row};

use famtree_core::catalog::NAME;
use famtree_core::{AttrCode, AttributeCatalog, FactRow, NodeId};

use crate::error::StorageError;
use crate::schema;

/// SQLite connection holding one export artifact.
pub struct FactStore {
    conn: Connection,
}

impl FactStore {
    /// Deletes any artifact at `path` and opens a fresh database.
    pub fn create(path: &Path) -> Result<Self, StorageError> {
        let conn = schema::create_database(path)?;
        Ok(FactStore { conn })
    }

    /// Opens an in-memory database (for testing).
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = schema::create_in_memory()?;
        Ok(FactStore { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub(crate) fn connection_mut(&mut self) -> &mut Connection {
        &mut self.conn
    }

    /// Creates all tables and writes the locale row.
    pub fn init_schema(&self, locale: &str) -> Result<(), StorageError> {
        schema::create_tables(&self.conn, locale)
    }

    /// Writes one `attrs_tab` row per catalog entry, in catalog order.
    pub fn insert_attributes(&mut self, catalog: &AttributeCatalog) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(schema::INSERT_ATTR)?;
            for def in catalog.defs() {
                tracing::debug!("adding attribute {} : {}", def.name, def.code);
                stmt.execute(params![def.code.0, def.hidden as i32, def.label])?;
            }
        }
        tx.commit()?;
        Ok(catalog.len())
    }

    /// Appends fact rows in the given order.
    pub fn insert_facts(&mut self, rows: &[FactRow]) -> Result<usize, StorageError> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(schema::INSERT_FACT)?;
            for row in rows {
                stmt.execute(params![
                    row.node_id.0,
                    row.attr.0,
                    row.link_id.map(|id| id.0),
                    row.text_value,
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    pub fn create_indexes(&self) -> Result<(), StorageError> {
        for sql in schema::CREATE_INDEXES {
            self.conn.execute(sql, [])?;
        }
        Ok(())
    }

    pub fn drop_indexes(&self) -> Result<(), StorageError> {
        for sql in schema::DROP_INDEXES {
            self.conn.execute(sql, [])?;
        }
        Ok(())
    }

    /// Rebuilds the database file to reclaim free pages.
    pub fn vacuum(&self) -> Result<(), StorageError> {
        self.conn.execute_batch("VACUUM")?;
        Ok(())
    }

    /// Identifiers of every node that has a name row, ascending.
    pub fn named_node_ids(&self) -> Result<Vec<NodeId>, StorageError> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT node_id FROM nodes_tab WHERE attr_id = ?1 ORDER BY node_id")?;
        let rows = stmt.query_map(params![NAME.0], |row| row.get::<_, i64>(0))?;
        let mut ids = Vec::new();
        for id in rows {
            ids.push(NodeId(id?));
        }
        Ok(ids)
    }

    /// Every fact row in insertion order.
    pub fn facts(&self) -> Result<Vec<FactRow>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT node_id, attr_id, link_id, text_value FROM nodes_tab ORDER BY rowid",
        )?;
        let rows = stmt.query_map([], fact_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Rows of one node and attribute, ordered by `link_id`.
    pub fn facts_for(&self, node: NodeId, attr: AttrCode) -> Result<Vec<FactRow>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT node_id, attr_id, link_id, text_value FROM nodes_tab
             WHERE node_id = ?1 AND attr_id = ?2 ORDER BY link_id",
        )?;
        let rows = stmt.query_map(params![node.0, attr.0], fact_from_row)?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    /// Names of the user-created indexes currently present.
    pub fn index_names(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT name FROM sqlite_master WHERE type = 'index' AND sql IS NOT NULL ORDER BY name",
        )?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
        let mut names = Vec::new();
        for name in rows {
            names.push(name?);
        }
        Ok(names)
    }

    /// Closes the connection, surfacing any error from the final flush.
    pub fn close(self) -> Result<(), StorageError> {
        self.conn.close().map_err(|(_, e)| StorageError::Sqlite(e))
    }
}

fn fact_from_row(row: &Row<'_>) -> rusqlite::Result<FactRow> {
    let node_id: i64 = row.get(0)?;
    let attr: u32 = row.get(1)?;
    let link_id: Option<i64> = row.get(2)?;
    let text_value: String = row.get(3)?;
    Ok(FactRow {
        node_id: NodeId(node_id),
        attr: AttrCode(attr),
        link_id: link_id.map(NodeId),
        text_value,
    })
}
