//! Huawei Cloud WAF data sources and actions
//!
//! Each data source declares a [`schema::Schema`], turns its inputs into a
//! REST request, follows offset pagination where the API pages, and flattens
//! the JSON response into a [`state::ResourceData`]. The
//! [`provider::Provider`] dispatches operations by name.

pub mod adapter;
pub mod cloud;
pub mod config;
pub mod datasources;
pub mod error;
pub mod provider;
pub mod resources;
pub mod schema;
pub mod state;

/// Version injected at compile time via WAF_PROVIDER_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("WAF_PROVIDER_VERSION") {
    Some(v) => v,
    None => "dev",
};
