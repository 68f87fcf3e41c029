use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};

/// Random identifier (UUID v4, hyphenated).
#[must_use]
pub fn make_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// JSON with four-space indentation and keys sorted at every level.
#[must_use]
pub fn pretty(value: &Value) -> String {
    let sorted = sort_keys(value);
    let mut out = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    if sorted.serialize(&mut serializer).is_err() {
        return sorted.to_string();
    }
    String::from_utf8(out).unwrap_or_else(|_| sorted.to_string())
}

fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), sort_keys(&map[key]));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}
