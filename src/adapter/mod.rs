//! Fetch-and-flatten adapter
//!
//! Every data source follows the same path: build a request descriptor from
//! its inputs, fetch one response (or every page of a list), pull fields out
//! of the JSON by path expression and hand them to the state.
//!
//! # Architecture
//!
//! - [`request`] - Path templates, placeholder substitution and query strings
//! - [`fetch`] - Issues one call and parses the JSON body
//! - [`paginate`] - Offset pagination until an empty page
//! - [`extract`] - Path expressions with get-with-default accessors
//! - [`filter`] - Client-side equality filters for list reads
//!
//! # Example
//!
//! ```ignore
//! use waf_provider::adapter::{fetch_all, RequestDescriptor};
//!
//! async fn policies(client: &WafClient) -> waf_provider::error::Result<Vec<Value>> {
//!     let request = RequestDescriptor::get("/v1/{project_id}/waf/policy")
//!         .query("name", Some("default"));
//!     fetch_all(client, &request, "items", "WAF policies").await
//! }
//! ```

pub mod extract;
pub mod fetch;
pub mod filter;
pub mod paginate;
pub mod request;

pub use fetch::fetch;
pub use filter::{apply_filters, ResourceFilter};
pub use paginate::{fetch_all, paginate_offset};
pub use request::RequestDescriptor;
