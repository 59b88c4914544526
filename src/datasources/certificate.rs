//! `waf_certificate` - look up one certificate by name

use super::{common_fields, enterprise_project, regional_client, set_fields};
use crate::adapter::extract::{list_or_empty, opt_str, timestamp_ms_rfc3339, or_null};
use crate::adapter::{fetch, RequestDescriptor};
use crate::cloud::client::WafClient;
use crate::error::{Result, WafError};
use crate::schema::{Field, FieldType, Schema};
use crate::state::ResourceData;
use serde_json::Value;

pub const NAME: &str = "waf_certificate";

const LIST_PATH: &str = "/v1/{project_id}/waf/certificate";

/// A certificate as exposed by the data source
#[derive(Debug, Clone, PartialEq)]
pub struct Certificate {
    pub id: String,
    pub name: Option<String>,
    pub expiration: Option<String>,
    pub created_at: Option<String>,
}

impl From<&Value> for Certificate {
    fn from(value: &Value) -> Self {
        Self {
            id: opt_str(value, "id").unwrap_or_default(),
            name: opt_str(value, "name"),
            expiration: timestamp_ms_rfc3339(value, "expire_time"),
            created_at: timestamp_ms_rfc3339(value, "timestamp"),
        }
    }
}

pub fn schema() -> Schema {
    let mut fields = common_fields();
    fields.extend([
        Field::required("name", FieldType::String).describe("Certificate name to match."),
        Field::optional("expire_status", FieldType::Int)
            .describe("0: not expired, 1: expired, 2: expiring within a month."),
        Field::computed("expiration", FieldType::String),
        Field::computed("created_at", FieldType::String),
    ]);
    Schema::new(fields)
}

pub async fn read(client: &WafClient, data: &mut ResourceData) -> Result<()> {
    let client = regional_client(client, data)?;

    let request = RequestDescriptor::get(LIST_PATH)
        .query("name", data.get_str("name"))
        .query("exp_status", data.get_i64("expire_status"))
        .query("enterprise_project_id", enterprise_project(&client, data));

    let body = fetch(&client, &request, "WAF certificate").await?;
    let certificate = first_certificate(&body)?;

    write_certificate(data, &client.region, certificate)
}

/// Store the certificate; the id is only set once every field is written
fn write_certificate(data: &mut ResourceData, region: &str, certificate: Certificate) -> Result<()> {
    set_fields(
        data,
        vec![
            ("region", Value::String(region.to_string())),
            ("name", or_null(certificate.name)),
            ("expiration", or_null(certificate.expiration)),
            ("created_at", or_null(certificate.created_at)),
        ],
    )?;
    data.set_id(certificate.id);
    Ok(())
}

/// The first certificate of a list response; no items is an error
pub fn first_certificate(body: &Value) -> Result<Certificate> {
    let items = list_or_empty(body, "items");
    let first = items.first().ok_or(WafError::NoResults)?;

    let certificate = Certificate::from(first);
    if certificate.id.is_empty() {
        return Err(WafError::MissingField("items[0].id".to_string()));
    }
    if items.len() > 1 {
        tracing::debug!("{} certificates matched, using the first", items.len());
    }
    Ok(certificate)
}
