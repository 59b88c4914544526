//! Client-side filters for list reads
//!
//! Some list endpoints cannot filter by every attribute a data source
//! exposes, so the fetched items are narrowed locally.

use super::extract::search;
use serde_json::Value;

/// Equality filter on an item path. A filter without a value matches all.
#[derive(Debug, Clone)]
pub struct ResourceFilter {
    pub path: String,
    pub value: Option<String>,
}

impl ResourceFilter {
    pub fn new(path: &str, value: Option<impl ToString>) -> Self {
        Self {
            path: path.to_string(),
            value: value.map(|v| v.to_string()).filter(|v| !v.is_empty()),
        }
    }

    /// Scalars are compared by their text form so `1` matches `"1"`
    pub fn matches(&self, item: &Value) -> bool {
        let Some(wanted) = self.value.as_deref() else {
            return true;
        };

        match search(item, &self.path) {
            Some(Value::String(s)) => s == wanted,
            Some(Value::Number(n)) => n.to_string() == wanted,
            Some(Value::Bool(b)) => b.to_string() == wanted,
            _ => false,
        }
    }
}

/// Keep the items matching every filter, preserving order
pub fn apply_filters(items: Vec<Value>, filters: &[ResourceFilter]) -> Vec<Value> {
    if filters.iter().all(|f| f.value.is_none()) {
        return items;
    }

    items
        .into_iter()
        .filter(|item| filters.iter().all(|f| f.matches(item)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn items() -> Vec<Value> {
        vec![
            json!({"id": "a", "status": 1, "name": "first"}),
            json!({"id": "b", "status": 0, "name": "second"}),
            json!({"id": "c", "status": 1}),
        ]
    }

    #[test]
    fn test_empty_filters_return_all() {
        let filters = [ResourceFilter::new("id", None::<String>)];
        assert_eq!(apply_filters(items(), &filters).len(), 3);
        assert_eq!(apply_filters(items(), &[]).len(), 3);
    }

    #[test]
    fn test_number_matches_text_form() {
        let filters = [ResourceFilter::new("status", Some(1))];
        let result = apply_filters(items(), &filters);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0]["id"], "a");
        assert_eq!(result[1]["id"], "c");
    }

    #[test]
    fn test_filters_combine_and_missing_field_never_matches() {
        let filters = [
            ResourceFilter::new("status", Some(1)),
            ResourceFilter::new("name", Some("first")),
        ];
        let result = apply_filters(items(), &filters);
        assert_eq!(result, vec![json!({"id": "a", "status": 1, "name": "first"})]);
    }

    #[test]
    fn test_empty_string_value_is_no_filter() {
        let filter = ResourceFilter::new("id", Some(""));
        assert!(filter.value.is_none());
        assert!(filter.matches(&json!({})));
    }
}
