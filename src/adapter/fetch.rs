//! Single-call fetch

use super::request::RequestDescriptor;
use crate::cloud::client::WafClient;
use crate::error::Result;
use serde_json::Value;

/// Resolve `request` against the client endpoint, issue it and return the
/// parsed JSON body (`null` for an empty body).
///
/// Transport and API failures are reported as
/// `error retrieving {operation}: ...`; parse failures pass through as-is.
pub async fn fetch(client: &WafClient, request: &RequestDescriptor, operation: &str) -> Result<Value> {
    let url = request.url(&client.endpoint, &client.project_id)?;

    client
        .request(request.method.clone(), &url)
        .await
        .map_err(|e| e.retrieving(operation))
}
