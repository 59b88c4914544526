//! WAF Client
//!
//! Main client for interacting with the WAF API, combining authentication,
//! HTTP transport and endpoint resolution. A client is built once from the
//! provider configuration and handed to every data source and resource.

use super::auth::{validate_region, Credentials};
use super::http::WafHttpClient;
use crate::config::Config;
use crate::error::{Result, WafError};
use reqwest::Method;
use serde_json::Value;
use url::Url;

/// Default bound on the number of pages a list read may request
pub const DEFAULT_MAX_PAGES: usize = 1000;

/// Placeholder substituted with the region in endpoint templates
pub const REGION_PLACEHOLDER: &str = "{region}";

/// Public endpoint template of the WAF service
pub const DEFAULT_ENDPOINT_TEMPLATE: &str = "https://waf.{region}.myhuaweicloud.com";

/// Main WAF client
#[derive(Clone, Debug)]
pub struct WafClient {
    pub credentials: Credentials,
    pub http: WafHttpClient,
    /// Service endpoint without trailing slash, e.g. `https://waf.cn-north-4.myhuaweicloud.com`
    pub endpoint: String,
    pub project_id: String,
    pub region: String,
    /// Provider-level enterprise project, used when a data source sets none
    pub enterprise_project_id: Option<String>,
    pub max_pages: usize,
    /// Endpoint with a `{region}` placeholder; `None` pins `endpoint` for every region
    endpoint_template: Option<String>,
}

impl WafClient {
    /// Create a new WAF client from the provider configuration
    pub fn new(config: &Config) -> Result<Self> {
        let region = config
            .region
            .clone()
            .filter(|r| !r.is_empty())
            .ok_or_else(|| WafError::client_config("no region configured. Set HW_REGION_NAME or use --region"))?;

        let project_id = config
            .project_id
            .clone()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| WafError::client_config("no project configured. Set HW_PROJECT_ID or use --project-id"))?;

        let endpoint = config
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_ENDPOINT_TEMPLATE);

        let credentials = Credentials::from_token(config.auth_token.clone().unwrap_or_default())?;

        Ok(Self::with_credentials(credentials, endpoint, &project_id, &region)?
            .with_enterprise_project(config.enterprise_project_id.clone())
            .with_max_pages(config.max_pages.unwrap_or(DEFAULT_MAX_PAGES)))
    }

    /// Create a client against an endpoint. A `{region}` placeholder in the
    /// endpoint is substituted now and again for every other region.
    pub fn with_credentials(
        credentials: Credentials,
        endpoint: &str,
        project_id: &str,
        region: &str,
    ) -> Result<Self> {
        if !validate_region(region) {
            return Err(WafError::client_config(format!("invalid region name '{}'", region)));
        }

        let endpoint_template = endpoint
            .contains(REGION_PLACEHOLDER)
            .then(|| endpoint.trim_end_matches('/').to_string());
        let endpoint = resolve_endpoint(endpoint, region)?;

        let http = WafHttpClient::new()?;

        Ok(Self {
            credentials,
            http,
            endpoint,
            project_id: project_id.to_string(),
            region: region.to_string(),
            enterprise_project_id: None,
            max_pages: DEFAULT_MAX_PAGES,
            endpoint_template,
        })
    }

    pub fn with_enterprise_project(mut self, enterprise_project_id: Option<String>) -> Self {
        self.enterprise_project_id = enterprise_project_id.filter(|e| !e.is_empty());
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages.max(1);
        self
    }

    /// Get the current access token
    pub fn get_token(&self) -> Result<String> {
        self.credentials.get_token()
    }

    /// Make a request with the given method
    pub async fn request(&self, method: Method, url: &str) -> Result<Value> {
        let token = self.get_token()?;
        self.http.request(method, url, &token).await
    }

    /// Enterprise project for a call: explicit value first, then provider level
    pub fn enterprise_project_for(&self, explicit: Option<&str>) -> Option<String> {
        explicit
            .filter(|e| !e.is_empty())
            .map(|e| e.to_string())
            .or_else(|| self.enterprise_project_id.clone())
    }

    /// Region for a call: explicit value first, then provider level
    pub fn region_for(&self, explicit: Option<&str>) -> String {
        explicit
            .filter(|r| !r.is_empty())
            .map(|r| r.to_string())
            .unwrap_or_else(|| self.region.clone())
    }

    /// Client targeting another region. A templated endpoint follows the
    /// region; a fixed one is kept as-is. Region names are validated before
    /// they can reach the request URL.
    pub fn for_region(&self, region: &str) -> Result<Self> {
        if region.is_empty() || region == self.region {
            return Ok(self.clone());
        }
        if !validate_region(region) {
            return Err(WafError::field("region", format!("invalid region name '{}'", region)));
        }

        let mut client = self.clone();
        if let Some(template) = &self.endpoint_template {
            client.endpoint = resolve_endpoint(template, region)?;
        }
        client.region = region.to_string();
        Ok(client)
    }
}

/// Substitute the region and check the result is an http(s) URL
fn resolve_endpoint(endpoint: &str, region: &str) -> Result<String> {
    let resolved = endpoint.replace(REGION_PLACEHOLDER, region);
    let parsed = Url::parse(&resolved)
        .map_err(|e| WafError::client_config(format!("invalid endpoint '{}': {}", resolved, e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(WafError::client_config(format!(
            "invalid endpoint '{}': scheme must be http or https",
            resolved
        )));
    }
    Ok(resolved.trim_end_matches('/').to_string())
}

/// Format a WAF API error for display. The API's own error code and
/// message are kept after the summary.
/// Security: Sanitizes error messages to avoid leaking sensitive API details
pub fn format_waf_error(error: &WafError) -> String {
    let summary = match error.status() {
        Some(401) => "Authentication failed. Check HW_AUTH_TOKEN.",
        Some(403) => "Permission denied. Check the IAM policies of the token user.",
        Some(404) => "Resource not found.",
        Some(429) => "Rate limit exceeded. Please try again later.",
        Some(400) => "Invalid request. Check your parameters.",
        Some(500) | Some(502) | Some(503) => "WAF service temporarily unavailable. Please try again.",
        _ => return sanitize_message(&error.to_string()),
    };

    match error.api_detail() {
        Some(detail) => sanitize_message(&format!("{} {}", summary, detail)),
        None => summary.to_string(),
    }
}

/// Truncate long error messages and remove control characters
fn sanitize_message(message: &str) -> String {
    let sanitized = message
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .take(240)
        .collect::<String>();

    if sanitized.chars().count() < message.chars().count() {
        format!("{}...", sanitized)
    } else {
        sanitized
    }
}
