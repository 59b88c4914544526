//! HTTP utilities for WAF REST API calls

use super::auth::AUTH_HEADER;
use crate::error::{Result, WafError};
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder};
use serde_json::Value;
use std::time::Duration;

/// Content type sent with every request
pub const JSON_CONTENT_TYPE: &str = "application/json;charset=UTF-8";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Default HTTP timeout for API requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(60);

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control(), "")
}

/// Pull `error_code` / `error_msg` out of an error body.
/// Some services nest them under an `error` object with `code` / `message`.
fn parse_api_error(status: u16, body: &str) -> WafError {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    let field = |flat: &str, nested: &str| -> Option<String> {
        let doc = parsed.as_ref()?;
        doc.get(flat)
            .or_else(|| doc.get("error").and_then(|e| e.get(nested)))
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
    };

    WafError::Api {
        status,
        code: field("error_code", "code"),
        message: field("error_msg", "message"),
    }
}

/// HTTP client wrapper for WAF API calls
#[derive(Clone, Debug)]
pub struct WafHttpClient {
    client: Client,
}

impl WafHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("waf-provider/", env!("CARGO_PKG_VERSION")))
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| WafError::client_config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Make a request with an arbitrary method
    pub async fn request(
        &self,
        method: Method,
        url: &str,
        token: &str,
    ) -> Result<Value> {
        tracing::debug!("{} {}", method, url);

        let request = self.client.request(method, url);
        self.send(request, token).await
    }

    async fn send(&self, request: RequestBuilder, token: &str) -> Result<Value> {
        let response = request
            .header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .header(AUTH_HEADER, token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            // Security: Only log sanitized/truncated error body to avoid leaking sensitive data
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(parse_api_error(status.as_u16(), &body));
        }

        // Handle empty response
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&body)?)
    }
}
