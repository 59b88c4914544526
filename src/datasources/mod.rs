//! WAF data sources
//!
//! Read-only queries. Each module declares a schema, builds its request
//! from the inputs, fetches (all pages of) the response and flattens the
//! JSON into typed records before writing them to the state.

pub mod certificate;
pub mod ip_reputation_rules;
pub mod policies;
pub mod source_ips;
pub mod web_tamper_rules;

use crate::cloud::client::WafClient;
use crate::error::{MultiError, Result};
use crate::schema::{Field, FieldType};
use crate::state::ResourceData;
use serde_json::Value;

/// Inputs every data source accepts
pub(crate) fn common_fields() -> Vec<Field> {
    vec![
        Field::optional_computed("region", FieldType::String)
            .describe("Region to query. Defaults to the provider region."),
        Field::optional("enterprise_project_id", FieldType::String)
            .describe("Enterprise project to query. Defaults to the provider-level value."),
    ]
}

/// Client for the region this read targets
///
/// Required inputs are checked first, so a read with missing inputs or a
/// malformed region fails before any request is sent.
pub(crate) fn regional_client(client: &WafClient, data: &ResourceData) -> Result<WafClient> {
    data.check_required()?;
    client.for_region(&client.region_for(data.get_str("region")))
}

/// Enterprise project of this read (input first, provider second)
pub(crate) fn enterprise_project(client: &WafClient, data: &ResourceData) -> Option<String> {
    client.enterprise_project_for(data.get_str("enterprise_project_id"))
}

/// Write every field, reporting all assignment failures at once
pub(crate) fn set_fields(data: &mut ResourceData, fields: Vec<(&str, Value)>) -> Result<()> {
    let mut errs = MultiError::new();
    for (name, value) in fields {
        errs.push(data.set(name, value));
    }
    errs.into_result()
}
