//! `waf_rule_web_tamper_protection_refresh` - refresh the cached copy of a
//! tamper-protected page
//!
//! The refresh is one-shot: create sends the request and records the rule id
//! the API answers with. There is nothing to read back, change or undo, so
//! read, update and delete leave the state as it is. Any change to the
//! targeted rule plans a replacement, which issues a new refresh.

use crate::adapter::extract::opt_str;
use crate::adapter::{fetch, RequestDescriptor};
use crate::cloud::client::WafClient;
use crate::error::{Result, WafError};
use crate::schema::{Field, FieldType, PlanAction, Schema};
use crate::state::ResourceData;
use serde_json::Value;

pub const NAME: &str = "waf_rule_web_tamper_protection_refresh";

const REFRESH_PATH: &str = "/v1/{project_id}/waf/policy/{policy_id}/antitamper/{rule_id}/refresh";

pub fn schema() -> Schema {
    Schema::new(vec![
        Field::optional_computed("region", FieldType::String).force_new(),
        Field::required("policy_id", FieldType::String)
            .force_new()
            .describe("Policy the rule belongs to."),
        Field::required("rule_id", FieldType::String)
            .force_new()
            .describe("Web tamper protection rule to refresh."),
        Field::optional("enterprise_project_id", FieldType::String).force_new(),
    ])
}

/// Issue the refresh and record the returned rule id as the resource id
pub async fn create(client: &WafClient, data: &mut ResourceData) -> Result<()> {
    if let Some(id) = data.id() {
        return Err(WafError::AlreadyApplied(id.to_string()));
    }
    data.check_required()?;

    let client = client.for_region(&client.region_for(data.get_str("region")))?;
    let policy_id = data.get_str("policy_id").unwrap_or_default().to_string();
    let rule_id = data.get_str("rule_id").unwrap_or_default().to_string();

    let request = RequestDescriptor::post(REFRESH_PATH)
        .path_param("policy_id", policy_id.as_str())
        .path_param("rule_id", rule_id.as_str())
        .query(
            "enterprise_project_id",
            client.enterprise_project_for(data.get_str("enterprise_project_id")),
        );

    let body = fetch(&client, &request, "WAF web tamper protection cache refresh").await?;
    let id = refreshed_id(&body)?;

    tracing::info!(
        "refreshed web tamper protection cache: policy={}, rule={}",
        policy_id,
        rule_id
    );
    data.set_id(id);
    data.set("region", Value::String(client.region.clone()))
}

pub async fn read(_client: &WafClient, _data: &mut ResourceData) -> Result<()> {
    Ok(())
}

pub async fn update(_client: &WafClient, _data: &mut ResourceData) -> Result<()> {
    Ok(())
}

pub async fn delete(_client: &WafClient, _data: &mut ResourceData) -> Result<()> {
    Ok(())
}

/// What moving from `old` to `new` inputs means for an applied refresh
pub fn plan(old: &ResourceData, new: &ResourceData) -> PlanAction {
    schema().plan_change(&old.inputs(), &new.inputs())
}

fn refreshed_id(body: &Value) -> Result<String> {
    opt_str(body, "id")
        .filter(|id| !id.is_empty())
        .ok_or_else(|| WafError::MissingField("id".to_string()))
}
