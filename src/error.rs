//! Error types
//!
//! Every failure the adapter can produce is a [`WafError`]. Field assignment
//! failures are collected in a [`MultiError`] so a single read reports every
//! problem at once.

use std::fmt;
use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, WafError>;

/// Errors raised by the WAF provider core
#[derive(Error, Debug)]
pub enum WafError {
    /// The client could not be constructed (credentials, endpoint, TLS)
    #[error("error creating WAF client: {0}")]
    ClientConfig(String),

    /// The request never produced a response
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status
    #[error("API request failed: {status}{}", format_api_detail(.code, .message))]
    Api {
        status: u16,
        code: Option<String>,
        message: Option<String>,
    },

    /// Operation context for transport and API failures
    #[error("error retrieving {operation}: {source}")]
    Retrieve {
        operation: String,
        #[source]
        source: Box<WafError>,
    },

    /// The response body was not valid JSON
    #[error("{0}")]
    Parse(#[from] serde_json::Error),

    /// A singleton lookup matched nothing
    #[error("Your query returned no results. Please change your search criteria and try again.")]
    NoResults,

    /// A synthetic identifier could not be produced
    #[error("unable to generate ID: {0}")]
    IdGeneration(String),

    /// A value did not fit the declared schema
    #[error("error setting '{field}': {reason}")]
    FieldAssignment { field: String, reason: String },

    /// The request descriptor could not be resolved into a URL
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// A field the caller depends on was absent from the response
    #[error("unable to find '{0}' in the API response")]
    MissingField(String),

    /// Pagination exceeded the configured page bound
    #[error("pagination aborted after {pages} pages (offset {offset}); the API kept returning items")]
    PaginationLimit { pages: usize, offset: usize },

    #[error("unknown data source: {0}")]
    UnknownDataSource(String),

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// The action has already been applied for this resource instance
    #[error("resource {0} has already been applied")]
    AlreadyApplied(String),

    #[error("{0}")]
    Multiple(MultiError),
}

fn format_api_detail(code: &Option<String>, message: &Option<String>) -> String {
    match (code, message) {
        (Some(code), Some(message)) => format!(" ({}: {})", code, message),
        (Some(code), None) => format!(" ({})", code),
        (None, Some(message)) => format!(" ({})", message),
        (None, None) => String::new(),
    }
}

impl WafError {
    /// Create a client configuration error
    pub fn client_config(msg: impl Into<String>) -> Self {
        Self::ClientConfig(msg.into())
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::InvalidRequest(msg.into())
    }

    /// Create a field assignment error
    pub fn field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::FieldAssignment {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Attach the name of the operation being performed
    pub fn retrieving(self, operation: impl Into<String>) -> Self {
        match self {
            err @ (Self::Transport(_) | Self::Api { .. }) => Self::Retrieve {
                operation: operation.into(),
                source: Box::new(err),
            },
            other => other,
        }
    }

    /// `(code: message)` reported by the API, if any
    pub fn api_detail(&self) -> Option<String> {
        match self {
            Self::Api { code, message, .. } => {
                let detail = format_api_detail(code, message);
                (!detail.is_empty()).then(|| detail.trim_start().to_string())
            }
            Self::Retrieve { source, .. } => source.api_detail(),
            _ => None,
        }
    }

    /// HTTP status of the underlying API failure, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Retrieve { source, .. } => source.status(),
            Self::Transport(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

/// Aggregates independent failures so they are reported together
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<WafError>,
}

impl MultiError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the error of a fallible step, if any
    pub fn push(&mut self, result: Result<()>) {
        if let Err(err) = result {
            self.errors.push(err);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[WafError] {
        &self.errors
    }

    /// Collapse into a single result: zero errors is success, one is
    /// returned as-is, more are wrapped in [`WafError::Multiple`]
    pub fn into_result(mut self) -> Result<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(WafError::Multiple(self)),
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} errors occurred:", self.errors.len())?;
        for err in &self.errors {
            writeln!(f, "\t* {}", err)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multi_error_empty_is_ok() {
        let errs = MultiError::new();
        assert!(errs.into_result().is_ok());
    }

    #[test]
    fn test_multi_error_single_passes_through() {
        let mut errs = MultiError::new();
        errs.push(Ok(()));
        errs.push(Err(WafError::field("name", "expected string")));

        let err = errs.into_result().unwrap_err();
        assert!(matches!(err, WafError::FieldAssignment { .. }));
    }

    #[test]
    fn test_multi_error_collects_all() {
        let mut errs = MultiError::new();
        errs.push(Err(WafError::field("name", "expected string")));
        errs.push(Err(WafError::field("level", "expected int")));

        let err = errs.into_result().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("2 errors occurred"));
        assert!(msg.contains("'name'"));
        assert!(msg.contains("'level'"));
    }

    #[test]
    fn test_retrieving_wraps_api_errors_only() {
        let err = WafError::Api {
            status: 404,
            code: Some("WAF.00014002".to_string()),
            message: Some("resource not found".to_string()),
        }
        .retrieving("WAF certificate");

        assert_eq!(err.status(), Some(404));
        assert_eq!(
            err.to_string(),
            "error retrieving WAF certificate: API request failed: 404 (WAF.00014002: resource not found)"
        );

        let untouched = WafError::NoResults.retrieving("WAF certificate");
        assert!(matches!(untouched, WafError::NoResults));
    }
}
