//! Provider - name based lookup and dispatch
//!
//! The registry lists every data source and resource with its schema; the
//! [`Provider`] routes an operation on a name to the module implementing it.

use crate::cloud::client::WafClient;
use crate::datasources::{certificate, ip_reputation_rules, policies, source_ips, web_tamper_rules};
use crate::error::{Result, WafError};
use crate::resources::tamper_refresh;
use crate::schema::Schema;
use crate::state::{IdGenerator, ResourceData, UuidGenerator};

/// Registered data source or resource
#[derive(Debug, Clone, Copy)]
pub struct Definition {
    pub name: &'static str,
    pub description: &'static str,
    pub schema: fn() -> Schema,
}

const DATA_SOURCES: &[Definition] = &[
    Definition {
        name: certificate::NAME,
        description: "Look up a certificate by name",
        schema: certificate::schema,
    },
    Definition {
        name: policies::NAME,
        description: "List protection policies",
        schema: policies::schema,
    },
    Definition {
        name: web_tamper_rules::NAME,
        description: "List web tamper protection rules of a policy",
        schema: web_tamper_rules::schema,
    },
    Definition {
        name: ip_reputation_rules::NAME,
        description: "List IP reputation rules of a policy",
        schema: ip_reputation_rules::schema,
    },
    Definition {
        name: source_ips::NAME,
        description: "List WAF back-to-source IP ranges",
        schema: source_ips::schema,
    },
];

const RESOURCES: &[Definition] = &[Definition {
    name: tamper_refresh::NAME,
    description: "Refresh the cache of a web tamper protection rule",
    schema: tamper_refresh::schema,
}];

/// All registered data sources
pub fn data_sources() -> &'static [Definition] {
    DATA_SOURCES
}

/// All registered resources
pub fn resources() -> &'static [Definition] {
    RESOURCES
}

/// Get a data source definition by name
pub fn get_data_source(name: &str) -> Option<&'static Definition> {
    DATA_SOURCES.iter().find(|d| d.name == name)
}

/// Get a resource definition by name
pub fn get_resource(name: &str) -> Option<&'static Definition> {
    RESOURCES.iter().find(|d| d.name == name)
}

pub fn data_source_schema(name: &str) -> Result<Schema> {
    get_data_source(name)
        .map(|d| (d.schema)())
        .ok_or_else(|| WafError::UnknownDataSource(name.to_string()))
}

pub fn resource_schema(name: &str) -> Result<Schema> {
    get_resource(name)
        .map(|d| (d.schema)())
        .ok_or_else(|| WafError::UnknownResource(name.to_string()))
}

/// Configured client plus the id source for synthetic ids
pub struct Provider {
    client: WafClient,
    ids: Box<dyn IdGenerator>,
}

impl Provider {
    pub fn new(client: WafClient) -> Self {
        Self {
            client,
            ids: Box::new(UuidGenerator),
        }
    }

    pub fn with_id_generator(mut self, ids: Box<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Run the data source `name`, reading inputs from and writing results to `data`
    pub async fn read_data_source(&self, name: &str, data: &mut ResourceData) -> Result<()> {
        tracing::debug!("read_data_source: {}", name);
        let ids = self.ids.as_ref();

        match name {
            certificate::NAME => certificate::read(&self.client, data).await,
            policies::NAME => policies::read(&self.client, ids, data).await,
            web_tamper_rules::NAME => web_tamper_rules::read(&self.client, ids, data).await,
            ip_reputation_rules::NAME => ip_reputation_rules::read(&self.client, ids, data).await,
            source_ips::NAME => source_ips::read(&self.client, ids, data).await,
            _ => Err(WafError::UnknownDataSource(name.to_string())),
        }
    }

    pub async fn create_resource(&self, name: &str, data: &mut ResourceData) -> Result<()> {
        tracing::debug!("create_resource: {}", name);
        match name {
            tamper_refresh::NAME => tamper_refresh::create(&self.client, data).await,
            _ => Err(WafError::UnknownResource(name.to_string())),
        }
    }

    pub async fn read_resource(&self, name: &str, data: &mut ResourceData) -> Result<()> {
        match name {
            tamper_refresh::NAME => tamper_refresh::read(&self.client, data).await,
            _ => Err(WafError::UnknownResource(name.to_string())),
        }
    }

    pub async fn update_resource(&self, name: &str, data: &mut ResourceData) -> Result<()> {
        match name {
            tamper_refresh::NAME => tamper_refresh::update(&self.client, data).await,
            _ => Err(WafError::UnknownResource(name.to_string())),
        }
    }

    pub async fn delete_resource(&self, name: &str, data: &mut ResourceData) -> Result<()> {
        match name {
            tamper_refresh::NAME => tamper_refresh::delete(&self.client, data).await,
            _ => Err(WafError::UnknownResource(name.to_string())),
        }
    }
}
