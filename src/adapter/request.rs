//! Request descriptors
//!
//! A [`RequestDescriptor`] is a path template, its placeholder values and
//! the optional query parameters of one API call. It is resolved against
//! the client endpoint right before the call and then discarded.

use crate::error::{Result, WafError};
use reqwest::Method;

/// Description of a single API call
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path_template: String,
    path_params: Vec<(String, String)>,
    query: Vec<(String, String)>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path_template: &str) -> Self {
        Self {
            method,
            path_template: path_template.to_string(),
            path_params: Vec::new(),
            query: Vec::new(),
        }
    }

    pub fn get(path_template: &str) -> Self {
        Self::new(Method::GET, path_template)
    }

    pub fn post(path_template: &str) -> Self {
        Self::new(Method::POST, path_template)
    }

    /// Substitute `{name}` in the path template
    pub fn path_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path_params.push((name.to_string(), value.into()));
        self
    }

    /// Add a query parameter if it has a non-empty value.
    /// Setting the same key twice replaces the earlier value.
    pub fn query<V: ToString>(mut self, key: &str, value: Option<V>) -> Self {
        let Some(value) = value.map(|v| v.to_string()) else {
            return self;
        };
        if value.is_empty() {
            return self;
        }

        if let Some(existing) = self.query.iter_mut().find(|(k, _)| k == key) {
            existing.1 = value;
        } else {
            self.query.push((key.to_string(), value));
        }
        self
    }

    /// Set the query parameter unconditionally
    pub fn set_query(self, key: &str, value: impl ToString) -> Self {
        self.query(key, Some(value))
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    /// Resolved path (placeholders substituted, escaped) with query string
    pub fn path_and_query(&self, project_id: &str) -> Result<String> {
        let mut path = self.path_template.replace("{project_id}", &urlencoding::encode(project_id));

        for (name, value) in &self.path_params {
            if value.is_empty() {
                return Err(WafError::invalid_request(format!(
                    "path parameter '{}' must not be empty",
                    name
                )));
            }
            path = path.replace(&format!("{{{}}}", name), &urlencoding::encode(value));
        }

        if let Some(start) = path.find('{') {
            let end = path[start..].find('}').map(|e| start + e + 1).unwrap_or(path.len());
            return Err(WafError::invalid_request(format!(
                "unresolved placeholder {} in '{}'",
                &path[start..end],
                self.path_template
            )));
        }

        Ok(format!("{}{}", path, build_query_string(&self.query)))
    }

    /// Fully resolved URL against an endpoint
    pub fn url(&self, endpoint: &str, project_id: &str) -> Result<String> {
        Ok(format!(
            "{}{}",
            endpoint.trim_end_matches('/'),
            self.path_and_query(project_id)?
        ))
    }
}

/// Build `?k=v&k2=v2` with escaped keys and values, empty when no pairs
pub fn build_query_string(pairs: &[(String, String)]) -> String {
    if pairs.is_empty() {
        return String::new();
    }

    let parts: Vec<String> = pairs
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect();

    format!("?{}", parts.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn test_resolves_placeholders() {
        let req = RequestDescriptor::post("/v1/{project_id}/waf/policy/{policy_id}/antitamper/{rule_id}/refresh")
            .path_param("policy_id", "p1")
            .path_param("rule_id", "r1");

        assert_eq!(
            req.url("https://waf.example.com/", PROJECT).unwrap(),
            format!("https://waf.example.com/v1/{}/waf/policy/p1/antitamper/r1/refresh", PROJECT)
        );
        assert_eq!(req.method, Method::POST);
    }

    #[test]
    fn test_unresolved_placeholder_is_an_error() {
        let req = RequestDescriptor::get("/v1/{project_id}/waf/policy/{policy_id}/antitamper");
        let err = req.path_and_query(PROJECT).unwrap_err();
        assert!(err.to_string().contains("{policy_id}"));
    }

    #[test]
    fn test_empty_path_param_is_an_error() {
        let req = RequestDescriptor::get("/v1/{project_id}/waf/policy/{policy_id}")
            .path_param("policy_id", "");
        assert!(matches!(req.path_and_query(PROJECT), Err(WafError::InvalidRequest(_))));
    }

    #[test]
    fn test_optional_query_params() {
        let req = RequestDescriptor::get("/v1/{project_id}/waf/certificate")
            .query("name", Some("my cert&co"))
            .query::<&str>("host", None)
            .query("enterprise_project_id", Some(""))
            .query("exp_status", Some(1));

        assert_eq!(
            req.path_and_query(PROJECT).unwrap(),
            format!("/v1/{}/waf/certificate?name=my%20cert%26co&exp_status=1", PROJECT)
        );
    }

    #[test]
    fn test_query_key_replaced_not_duplicated() {
        let req = RequestDescriptor::get("/x")
            .set_query("offset", 0)
            .set_query("offset", 20);
        assert_eq!(req.query_pairs().len(), 1);
        assert_eq!(req.path_and_query(PROJECT).unwrap(), "/x?offset=20");
    }

    #[test]
    fn test_path_values_are_escaped() {
        let req = RequestDescriptor::get("/v1/{project_id}/waf/policy/{policy_id}")
            .path_param("policy_id", "a/b");
        assert_eq!(
            req.path_and_query(PROJECT).unwrap(),
            format!("/v1/{}/waf/policy/a%2Fb", PROJECT)
        );
    }
}
