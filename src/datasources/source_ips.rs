//! `waf_source_ips` - back-to-source address ranges of the WAF

use super::{common_fields, enterprise_project, regional_client, set_fields};
use crate::adapter::extract::{list_or_empty, string_list, timestamp_ms_rfc3339};
use crate::adapter::{fetch, RequestDescriptor};
use crate::cloud::client::WafClient;
use crate::error::Result;
use crate::schema::{Field, FieldType, Schema};
use crate::state::{set_synthetic_id, IdGenerator, ResourceData};
use serde_json::{json, Value};

pub const NAME: &str = "waf_source_ips";

const LIST_PATH: &str = "/v1/{project_id}/waf/config/source-ip";

/// One published set of source addresses
#[derive(Debug, Clone, PartialEq)]
pub struct SourceIp {
    pub ips: Vec<String>,
    pub update_time: Option<String>,
}

impl From<&Value> for SourceIp {
    fn from(value: &Value) -> Self {
        Self {
            ips: string_list(value, "ips"),
            update_time: timestamp_ms_rfc3339(value, "update_time"),
        }
    }
}

pub fn schema() -> Schema {
    let mut fields = common_fields();
    fields.push(Field::computed(
        "source_ips",
        FieldType::blocks(vec![
            Field::computed("ips", FieldType::list(FieldType::String)),
            Field::computed("update_time", FieldType::String),
        ]),
    ));
    Schema::new(fields)
}

pub async fn read(client: &WafClient, ids: &dyn IdGenerator, data: &mut ResourceData) -> Result<()> {
    let client = regional_client(client, data)?;

    let request = RequestDescriptor::get(LIST_PATH)
        .query("enterprise_project_id", enterprise_project(&client, data));

    let body = fetch(&client, &request, "WAF source IPs").await?;
    let source_ips = flatten_source_ips(&body);

    set_synthetic_id(data, ids)?;
    set_fields(
        data,
        vec![
            ("region", Value::String(client.region.clone())),
            ("source_ips", Value::Array(source_ips)),
        ],
    )
}

pub fn flatten_source_ips(body: &Value) -> Vec<Value> {
    list_or_empty(body, "source_ip")
        .iter()
        .map(SourceIp::from)
        .map(|s| json!({"ips": s.ips, "update_time": s.update_time}))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_source_ips() {
        let body = json!({
            "source_ip": [
                {"ips": ["1.1.1.0/24", "2.2.2.0/24"], "update_time": 1704067200000i64},
                {"ips": []}
            ]
        });

        let flattened = flatten_source_ips(&body);
        assert_eq!(
            flattened,
            vec![
                json!({"ips": ["1.1.1.0/24", "2.2.2.0/24"], "update_time": "2024-01-01T00:00:00Z"}),
                json!({"ips": [], "update_time": null}),
            ]
        );
        assert!(schema().field("source_ips").unwrap().kind.check(&Value::Array(flattened)).is_ok());
    }

    #[test]
    fn test_empty_body() {
        assert!(flatten_source_ips(&json!({})).is_empty());
    }

    #[test]
    fn test_schema_has_no_required_inputs() {
        assert_eq!(schema().required_fields().count(), 0);
    }
}
