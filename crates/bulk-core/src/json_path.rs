//! Dotted-path lookup into JSON values

use serde_json::Value;

/// Get a value using a dot-separated path (e.g. `data.items`).
///
/// Numeric segments index into arrays. An empty path selects the value
/// itself.
pub fn select<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = json;

    for part in path.trim().split('.').filter(|p| !p.is_empty()) {
        match current {
            Value::Object(map) => {
                current = map.get(part)?;
            }
            Value::Array(arr) => {
                let index: usize = part.parse().ok()?;
                current = arr.get(index)?;
            }
            _ => return None,
        }
    }

    Some(current)
}
