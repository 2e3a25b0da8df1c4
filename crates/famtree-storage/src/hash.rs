//! Deterministic content digest of the fact table using blake3.
//!
//! The digest covers every column of every row in insertion order, so two
//! builds from identical input produce identical digests. Each field is
//! length- or tag-prefixed to keep row boundaries unambiguous.

use famtree_core::FactRow;

/// Hashes one row into `hasher`.
fn hash_row(hasher: &mut blake3::Hasher, row: &FactRow) {
    hasher.update(&row.node_id.0.to_le_bytes());
    hasher.update(&row.attr.0.to_le_bytes());
    match row.link_id {
        Some(link) => {
            hasher.update(&[1]);
            hasher.update(&link.0.to_le_bytes());
        }
        None => {
            hasher.update(&[0]);
        }
    }
    hasher.update(&(row.text_value.len() as u64).to_le_bytes());
    hasher.update(row.text_value.as_bytes());
}

/// Digest of `rows` in the order given.
pub fn fact_digest(rows: &[FactRow]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    for row in rows {
        hash_row(&mut hasher, row);
    }
    hasher.finalize()
}
