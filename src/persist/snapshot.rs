//! Snapshot codec
//!
//! Serializes the index table as a flat JSON object.

use crate::error::Result;
use crate::index::IndexTable;

/// Encode a table into snapshot bytes
pub fn encode_snapshot(table: &IndexTable) -> Result<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(table)?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// Decode snapshot bytes into a table
///
/// Anything other than a JSON object of non-negative integers is rejected.
pub fn decode_snapshot(bytes: &[u8]) -> Result<IndexTable> {
    Ok(serde_json::from_slice(bytes)?)
}
