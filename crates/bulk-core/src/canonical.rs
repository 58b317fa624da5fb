//! Canonical JSON form used for storage and change detection
//!
//! Canonical means: object keys sorted at every level, two-space pretty
//! printing and a trailing newline. Two documents that differ only in
//! formatting or key order have identical canonical bytes.

use serde_json::{Map, Value};

use bulk_fs::checksum::compute_content_checksum;

use crate::Result;

/// Recursively rebuild a value with sorted object keys.
pub fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::new();
            for (key, inner) in entries {
                sorted.insert(key.clone(), sort_keys(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

/// Serialize a value in canonical form.
pub fn to_canonical(value: &Value) -> Result<Vec<u8>> {
    let mut out = serde_json::to_vec_pretty(&sort_keys(value))?;
    out.push(b'\n');
    Ok(out)
}

/// Parse then re-serialize raw JSON content in canonical form.
pub fn canonicalize(content: &[u8]) -> Result<Vec<u8>> {
    let value: Value = serde_json::from_slice(content)?;
    to_canonical(&value)
}

/// Digest of the canonical form of `content`.
///
/// Content that does not parse as JSON is hashed as-is, so it still
/// compares unequal to any valid baseline.
pub fn content_hash(content: &[u8]) -> String {
    match canonicalize(content) {
        Ok(canonical) => compute_content_checksum(&canonical),
        Err(_) => compute_content_checksum(content),
    }
}
