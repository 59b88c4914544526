//! `waf_policies` - list protection policies

use super::{common_fields, enterprise_project, regional_client, set_fields};
use crate::adapter::extract::{bool_or, opt_i64, opt_str, pluck_strings};
use crate::adapter::{fetch_all, RequestDescriptor};
use crate::cloud::client::WafClient;
use crate::error::Result;
use crate::schema::{Field, FieldType, Schema};
use crate::state::{set_synthetic_id, IdGenerator, ResourceData};
use serde_json::{json, Value};

pub const NAME: &str = "waf_policies";

const LIST_PATH: &str = "/v1/{project_id}/waf/policy";

/// One protection policy
#[derive(Debug, Clone, PartialEq)]
pub struct Policy {
    pub id: Option<String>,
    pub name: Option<String>,
    pub protection_mode: Option<String>,
    pub level: Option<i64>,
    pub full_detection: bool,
    pub deep_inspection: bool,
    pub bind_hosts: Vec<String>,
}

impl From<&Value> for Policy {
    fn from(value: &Value) -> Self {
        Self {
            id: opt_str(value, "id"),
            name: opt_str(value, "name"),
            protection_mode: opt_str(value, "action.category"),
            level: opt_i64(value, "level"),
            full_detection: bool_or(value, "full_detection", false),
            deep_inspection: bool_or(value, "options.deep_decode", false),
            bind_hosts: pluck_strings(value, "bind_host", "id"),
        }
    }
}

impl Policy {
    fn to_block(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "protection_mode": self.protection_mode,
            "level": self.level,
            "full_detection": self.full_detection,
            "deep_inspection": self.deep_inspection,
            "bind_hosts": self.bind_hosts,
        })
    }
}

pub fn schema() -> Schema {
    let mut fields = common_fields();
    fields.extend([
        Field::optional("name", FieldType::String).describe("Policy name to match."),
        Field::computed(
            "policies",
            FieldType::blocks(vec![
                Field::computed("id", FieldType::String),
                Field::computed("name", FieldType::String),
                Field::computed("protection_mode", FieldType::String)
                    .describe("log (detect only) or block."),
                Field::computed("level", FieldType::Int)
                    .describe("1: loose, 2: medium, 3: strict."),
                Field::computed("full_detection", FieldType::Bool),
                Field::computed("deep_inspection", FieldType::Bool),
                Field::computed("bind_hosts", FieldType::list(FieldType::String)),
            ]),
        ),
    ]);
    Schema::new(fields)
}

pub async fn read(client: &WafClient, ids: &dyn IdGenerator, data: &mut ResourceData) -> Result<()> {
    let client = regional_client(client, data)?;

    let request = RequestDescriptor::get(LIST_PATH)
        .query("name", data.get_str("name"))
        .query("enterprise_project_id", enterprise_project(&client, data));

    let items = fetch_all(&client, &request, "items", "WAF policies").await?;
    let policies = flatten_policies(&items);

    set_synthetic_id(data, ids)?;
    set_fields(
        data,
        vec![
            ("region", Value::String(client.region.clone())),
            ("policies", Value::Array(policies)),
        ],
    )
}

pub fn flatten_policies(items: &[Value]) -> Vec<Value> {
    items.iter().map(|item| Policy::from(item).to_block()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_policy() {
        let items = vec![json!({
            "id": "p1",
            "name": "policy_1",
            "level": 2,
            "full_detection": false,
            "action": {"category": "log"},
            "options": {"deep_decode": true, "webattack": true},
            "bind_host": [{"id": "h1", "hostname": "www.example.com"}],
            "timestamp": 1704067200000i64
        })];

        let flattened = flatten_policies(&items);
        assert_eq!(
            flattened[0],
            json!({
                "id": "p1",
                "name": "policy_1",
                "protection_mode": "log",
                "level": 2,
                "full_detection": false,
                "deep_inspection": true,
                "bind_hosts": ["h1"],
            })
        );
        assert!(schema().field("policies").unwrap().kind.check(&Value::Array(flattened)).is_ok());
    }

    #[test]
    fn test_sparse_policy_uses_defaults() {
        let flattened = flatten_policies(&[json!({"id": "p2"})]);
        assert_eq!(flattened[0]["protection_mode"], Value::Null);
        assert_eq!(flattened[0]["full_detection"], json!(false));
        assert_eq!(flattened[0]["bind_hosts"], json!([]));
    }
}
