use serde_json::Value;

/// Find the first value reachable under `key` at any depth, depth-first.
///
/// The payloads this is used on are schema-unstable; the traversal treats
/// them as an opaque tree of objects, arrays and scalars.
pub fn find_by_key<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => {
            if let Some(found) = map.get(key) {
                return Some(found);
            }
            map.values().find_map(|v| find_by_key(v, key))
        }
        Value::Array(items) => items.iter().find_map(|v| find_by_key(v, key)),
        _ => None,
    }
}
