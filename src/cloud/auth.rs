//! Cloud Authentication
//!
//! Handles IAM token authentication. Requests carry the token in the
//! `X-Auth-Token` header; request signing with access keys is left to
//! the surrounding SDK.

use crate::error::{Result, WafError};
use std::fmt;
use std::sync::Arc;

/// Header used to present the IAM token
pub const AUTH_HEADER: &str = "X-Auth-Token";

/// Credentials holder shared by every request of a client
#[derive(Clone)]
pub struct Credentials {
    token: Arc<str>,
}

impl Credentials {
    /// Credentials from a fixed IAM token
    ///
    /// Fails immediately when the token is empty so that a misconfigured
    /// provider is reported before any request is attempted.
    pub fn from_token(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(WafError::client_config(
                "no IAM token configured. Set HW_AUTH_TOKEN or 'auth_token' in the config file",
            ));
        }
        Ok(Self { token: token.into() })
    }

    /// Get a token for the next API call
    pub fn get_token(&self) -> Result<String> {
        Ok(self.token.to_string())
    }
}

// Never expose the token through Debug output or logs
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<REDACTED>")
            .finish()
    }
}

/// Validate a project ID: 32 lowercase hexadecimal characters
pub fn validate_project_id(project: &str) -> bool {
    project.len() == 32
        && project
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}

/// Validate a region name such as `cn-north-4` or `ap-southeast-1`
pub fn validate_region(region: &str) -> bool {
    !region.is_empty()
        && !region.starts_with('-')
        && !region.ends_with('-')
        && region
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
