//! Cloud API interaction module
//!
//! This module provides the core functionality for talking to the WAF
//! service: authentication, the HTTP client and endpoint resolution.
//!
//! # Module Structure
//!
//! - [`auth`] - IAM token credentials
//! - [`client`] - Main WAF client handed to every operation
//! - [`http`] - HTTP utilities for REST API calls
//!
//! # Example
//!
//! ```ignore
//! use reqwest::Method;
//! use waf_provider::cloud::client::WafClient;
//! use waf_provider::config::Config;
//!
//! async fn example() -> waf_provider::error::Result<()> {
//!     let client = WafClient::new(&Config::load())?;
//!     let url = format!("{}/v1/{}/waf/policy", client.endpoint, client.project_id);
//!     let policies = client.request(Method::GET, &url).await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod http;
