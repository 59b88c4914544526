//! `waf_rules_web_tamper_protection` - list web tamper protection rules of a policy

use super::{common_fields, enterprise_project, regional_client, set_fields};
use crate::adapter::extract::{opt_i64, opt_str};
use crate::adapter::{apply_filters, fetch_all, RequestDescriptor, ResourceFilter};
use crate::cloud::client::WafClient;
use crate::error::Result;
use crate::schema::{Field, FieldType, Schema};
use crate::state::{set_synthetic_id, IdGenerator, ResourceData};
use serde_json::{json, Value};

pub const NAME: &str = "waf_rules_web_tamper_protection";

const LIST_PATH: &str = "/v1/{project_id}/waf/policy/{policy_id}/antitamper";

/// One web tamper protection rule
#[derive(Debug, Clone, PartialEq)]
pub struct TamperRule {
    pub id: Option<String>,
    pub policy_id: Option<String>,
    pub domain: Option<String>,
    pub path: Option<String>,
    pub description: Option<String>,
    pub status: Option<i64>,
}

impl From<&Value> for TamperRule {
    fn from(value: &Value) -> Self {
        Self {
            id: opt_str(value, "id"),
            policy_id: opt_str(value, "policyid"),
            domain: opt_str(value, "hostname"),
            path: opt_str(value, "url"),
            description: opt_str(value, "description"),
            status: opt_i64(value, "status"),
        }
    }
}

impl TamperRule {
    fn to_block(&self) -> Value {
        json!({
            "id": self.id,
            "policy_id": self.policy_id,
            "domain": self.domain,
            "path": self.path,
            "description": self.description,
            "status": self.status,
        })
    }
}

pub fn schema() -> Schema {
    let mut fields = common_fields();
    fields.extend([
        Field::required("policy_id", FieldType::String),
        Field::optional("rule_id", FieldType::String),
        Field::optional("status", FieldType::Int).describe("0: disabled, 1: enabled."),
        Field::computed(
            "rules",
            FieldType::blocks(vec![
                Field::computed("id", FieldType::String),
                Field::computed("policy_id", FieldType::String),
                Field::computed("domain", FieldType::String),
                Field::computed("path", FieldType::String),
                Field::computed("description", FieldType::String),
                Field::computed("status", FieldType::Int),
            ]),
        ),
    ]);
    Schema::new(fields)
}

pub async fn read(client: &WafClient, ids: &dyn IdGenerator, data: &mut ResourceData) -> Result<()> {
    let client = regional_client(client, data)?;

    let request = RequestDescriptor::get(LIST_PATH)
        .path_param("policy_id", data.get_str("policy_id").unwrap_or_default())
        .query("enterprise_project_id", enterprise_project(&client, data));

    let items = fetch_all(&client, &request, "items", "WAF web tamper protection rules").await?;
    let filters = [
        ResourceFilter::new("id", data.get_str("rule_id")),
        ResourceFilter::new("status", data.get_i64("status")),
    ];
    let rules = flatten_rules(&apply_filters(items, &filters));

    set_synthetic_id(data, ids)?;
    set_fields(
        data,
        vec![
            ("region", Value::String(client.region.clone())),
            ("rules", Value::Array(rules)),
        ],
    )
}

pub fn flatten_rules(items: &[Value]) -> Vec<Value> {
    items.iter().map(|item| TamperRule::from(item).to_block()).collect()
}
