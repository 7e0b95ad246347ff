//! Deep merge for layered YAML configuration.
//!
//! Higher tiers override lower tiers field by field, so a project file can
//! flip one flag on a built-in metadata type without restating the rest of
//! its descriptor. Arrays (such as key field lists) are replaced entirely.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans are replaced entirely
/// - A null overlay keeps the base value (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use sfdx_decomposer::config::deep_merge;
///
/// let base = json!({
///     "metadata": { "profile": { "directory_name": "profiles", "grouped": false } },
///     "key_fields": ["fullName", "name"]
/// });
/// let overlay = json!({
///     "metadata": { "profile": { "grouped": true } },
///     "key_fields": ["fullName"]
/// });
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged["metadata"]["profile"]["directory_name"], "profiles");
/// assert_eq!(merged["metadata"]["profile"]["grouped"], true);
/// assert_eq!(merged["key_fields"], json!(["fullName"]));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Merge multiple values in order, with later values taking precedence.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
