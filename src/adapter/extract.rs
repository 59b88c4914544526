//! Path-based value extraction from JSON
//!
//! Paths use dot notation for object keys and brackets for array indexes:
//! `items`, `action.category`, `contents[0]`, `bind_host[1].id`. A bare
//! numeric segment (`contents.0`) is accepted as an index as well.
//!
//! Lookups never fail. A missing key, an out-of-range index, a type mismatch
//! along the way or a JSON `null` all yield the caller's default.

use serde_json::{Map, Value};

/// One step of a path expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Split a path expression into segments.
/// Malformed brackets are kept as part of the key so they simply never match.
pub fn parse_path(path: &str) -> Vec<Segment> {
    let mut segments = Vec::new();

    for part in path.split('.').filter(|p| !p.is_empty()) {
        let (key, mut rest) = match part.find('[') {
            Some(pos) => (&part[..pos], &part[pos..]),
            None => (part, ""),
        };

        if !key.is_empty() {
            match key.parse::<usize>() {
                Ok(idx) if rest.is_empty() => segments.push(Segment::Index(idx)),
                _ => segments.push(Segment::Key(key.to_string())),
            }
        }

        while let Some(stripped) = rest.strip_prefix('[') {
            let Some(end) = stripped.find(']') else {
                segments.push(Segment::Key(rest.to_string()));
                break;
            };
            match stripped[..end].trim().parse::<usize>() {
                Ok(idx) => segments.push(Segment::Index(idx)),
                Err(_) => segments.push(Segment::Key(stripped[..end].to_string())),
            }
            rest = &stripped[end + 1..];
        }
    }

    segments
}

/// Locate the value at `path`. `None` when absent or `null`.
pub fn search<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;

    for segment in parse_path(path) {
        current = match segment {
            Segment::Key(key) => current.get(key.as_str())?,
            Segment::Index(idx) => current.get(idx)?,
        };
    }

    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Clone the value at `path` or return the default
pub fn value_or(doc: &Value, path: &str, default: Value) -> Value {
    search(doc, path).cloned().unwrap_or(default)
}

/// String at `path`; numbers and booleans are rendered as text
pub fn str_or(doc: &Value, path: &str, default: &str) -> String {
    match search(doc, path) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => default.to_string(),
    }
}

/// Optional string at `path`
pub fn opt_str(doc: &Value, path: &str) -> Option<String> {
    match search(doc, path)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Integer at `path`; numeric strings are accepted
pub fn i64_or(doc: &Value, path: &str, default: i64) -> i64 {
    opt_i64(doc, path).unwrap_or(default)
}

/// Optional integer at `path`
pub fn opt_i64(doc: &Value, path: &str) -> Option<i64> {
    match search(doc, path)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Boolean at `path`; `"true"`/`"false"` strings are accepted
pub fn bool_or(doc: &Value, path: &str, default: bool) -> bool {
    match search(doc, path) {
        Some(Value::Bool(b)) => *b,
        Some(Value::String(s)) => s.parse().unwrap_or(default),
        _ => default,
    }
}

/// Array at `path`, empty when absent. A single object becomes one item.
pub fn list_or_empty(doc: &Value, path: &str) -> Vec<Value> {
    match search(doc, path) {
        Some(Value::Array(items)) => items.clone(),
        Some(obj @ Value::Object(_)) => vec![obj.clone()],
        _ => Vec::new(),
    }
}

/// Array of strings at `path`, skipping non-scalar entries
pub fn string_list(doc: &Value, path: &str) -> Vec<String> {
    match search(doc, path) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        Some(Value::String(s)) => vec![s.clone()],
        _ => Vec::new(),
    }
}

/// Project one field out of every object of the array at `path`
pub fn pluck_strings(doc: &Value, path: &str, field: &str) -> Vec<String> {
    list_or_empty(doc, path)
        .iter()
        .filter_map(|item| opt_str(item, field))
        .collect()
}

/// Re-wrap the single object at `path` into a one-element list so it fits a
/// repeatable nested block. `build` maps the object into the block shape.
/// An absent object yields an empty list.
pub fn wrap_object<F>(doc: &Value, path: &str, build: F) -> Vec<Value>
where
    F: FnOnce(&Value) -> Map<String, Value>,
{
    match search(doc, path) {
        Some(obj @ Value::Object(_)) => vec![Value::Object(build(obj))],
        _ => Vec::new(),
    }
}

/// Convert epoch milliseconds at `path` into an RFC 3339 UTC timestamp
pub fn timestamp_ms_rfc3339(doc: &Value, path: &str) -> Option<String> {
    let millis = opt_i64(doc, path)?;
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
}

/// `Some(v)` as a JSON value, `None` as `null`
pub fn or_null<T: Into<Value>>(value: Option<T>) -> Value {
    value.map(Into::into).unwrap_or(Value::Null)
}
