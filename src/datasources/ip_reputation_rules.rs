//! `waf_rules_ip_reputation` - list threat intelligence (IP reputation) rules
//!
//! The API returns `ip_reputation_map` and `action` as single objects; both
//! are exposed as one-element nested blocks.

use super::{common_fields, enterprise_project, regional_client, set_fields};
use crate::adapter::extract::{opt_i64, opt_str, string_list, value_or, wrap_object};
use crate::adapter::{apply_filters, fetch_all, RequestDescriptor, ResourceFilter};
use crate::cloud::client::WafClient;
use crate::error::Result;
use crate::schema::{Field, FieldType, Schema};
use crate::state::{set_synthetic_id, IdGenerator, ResourceData};
use serde_json::{json, Map, Value};

pub const NAME: &str = "waf_rules_ip_reputation";

const LIST_PATH: &str = "/v1/{project_id}/waf/policy/{policy_id}/ip-reputation";

/// One IP reputation rule
#[derive(Debug, Clone, PartialEq)]
pub struct ReputationRule {
    pub id: Option<String>,
    pub policy_id: Option<String>,
    pub name: Option<String>,
    pub rule_type: Option<String>,
    pub description: Option<String>,
    pub status: Option<i64>,
    /// Zero or one `{type, values}` block
    pub ip_reputation_map: Vec<Value>,
    /// Zero or one `{category}` block
    pub action: Vec<Value>,
}

impl From<&Value> for ReputationRule {
    fn from(value: &Value) -> Self {
        Self {
            id: opt_str(value, "id"),
            policy_id: opt_str(value, "policyid"),
            name: opt_str(value, "name"),
            rule_type: opt_str(value, "type"),
            description: opt_str(value, "description"),
            status: opt_i64(value, "status"),
            ip_reputation_map: flatten_reputation_map(value),
            action: wrap_object(value, "action", |obj| {
                let mut block = Map::new();
                block.insert("category".to_string(), value_or(obj, "category", Value::Null));
                block
            }),
        }
    }
}

impl ReputationRule {
    fn to_block(&self) -> Value {
        json!({
            "id": self.id,
            "policy_id": self.policy_id,
            "name": self.name,
            "type": self.rule_type,
            "description": self.description,
            "status": self.status,
            "ip_reputation_map": self.ip_reputation_map,
            "action": self.action,
        })
    }
}

/// `{"idc": ["Dr.Peng", "Aliyun"]}` becomes `[{"type": "idc", "values": [...]}]`.
/// The map carries a single reputation type; if the API ever sends more,
/// the first key wins.
fn flatten_reputation_map(rule: &Value) -> Vec<Value> {
    wrap_object(rule, "ip_reputation_map", |obj| {
        let mut block = Map::new();
        let key = obj.as_object().and_then(|m| m.keys().next().cloned());
        let values = key.as_deref().map(|k| string_list(obj, k)).unwrap_or_default();

        block.insert("type".to_string(), key.map(Value::String).unwrap_or(Value::Null));
        block.insert("values".to_string(), json!(values));
        block
    })
}

pub fn schema() -> Schema {
    let mut fields = common_fields();
    fields.extend([
        Field::required("policy_id", FieldType::String),
        Field::optional("rule_id", FieldType::String),
        Field::optional("name", FieldType::String),
        Field::optional("status", FieldType::Int).describe("0: disabled, 1: enabled."),
        Field::computed(
            "rules",
            FieldType::blocks(vec![
                Field::computed("id", FieldType::String),
                Field::computed("policy_id", FieldType::String),
                Field::computed("name", FieldType::String),
                Field::computed("type", FieldType::String),
                Field::computed("description", FieldType::String),
                Field::computed("status", FieldType::Int),
                Field::computed(
                    "ip_reputation_map",
                    FieldType::blocks(vec![
                        Field::computed("type", FieldType::String),
                        Field::computed("values", FieldType::list(FieldType::String)),
                    ]),
                ),
                Field::computed(
                    "action",
                    FieldType::blocks(vec![Field::computed("category", FieldType::String)]),
                ),
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

    let items = fetch_all(&client, &request, "items", "WAF IP reputation rules").await?;
    let filters = [
        ResourceFilter::new("id", data.get_str("rule_id")),
        ResourceFilter::new("name", data.get_str("name")),
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
    items
        .iter()
        .map(|item| ReputationRule::from(item).to_block())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reputation_map_is_wrapped_in_one_block() {
        let rules = flatten_rules(&[json!({
            "id": "r1",
            "policyid": "p1",
            "name": "block idc",
            "type": "idc",
            "status": 1,
            "ip_reputation_map": {"idc": ["Dr.Peng", "Aliyun"]},
            "action": {"category": "block"}
        })]);

        assert_eq!(
            rules[0]["ip_reputation_map"],
            json!([{"type": "idc", "values": ["Dr.Peng", "Aliyun"]}])
        );
        assert_eq!(rules[0]["action"], json!([{"category": "block"}]));
        assert!(schema().field("rules").unwrap().kind.check(&Value::Array(rules)).is_ok());
    }

    #[test]
    fn test_absent_nested_objects_become_empty_blocks() {
        let rules = flatten_rules(&[json!({"id": "r2"})]);
        assert_eq!(rules[0]["ip_reputation_map"], json!([]));
        assert_eq!(rules[0]["action"], json!([]));
        assert_eq!(rules[0]["name"], Value::Null);
    }

    #[test]
    fn test_empty_reputation_map() {
        let rules = flatten_rules(&[json!({"id": "r3", "ip_reputation_map": {}})]);
        assert_eq!(
            rules[0]["ip_reputation_map"],
            json!([{"type": null, "values": []}])
        );
    }
}
