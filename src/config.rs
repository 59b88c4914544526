//! Configuration Management
//!
//! Provider settings come from three layers, later ones winning:
//! the config file, the environment, then command line flags.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Region name, e.g. `cn-north-4`
    #[serde(default)]
    pub region: Option<String>,
    /// Project ID of the region
    #[serde(default)]
    pub project_id: Option<String>,
    /// IAM token
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,
    /// Provider-level enterprise project
    #[serde(default)]
    pub enterprise_project_id: Option<String>,
    /// Endpoint override, e.g. for a private deployment
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Upper bound on pages fetched by a list read
    #[serde(default)]
    pub max_pages: Option<usize>,
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("waf-provider").join("config.json"))
    }

    /// Load configuration from disk and apply environment overrides
    pub fn load() -> Self {
        let mut config = Self::config_path()
            .map(|path| Self::load_file(&path))
            .unwrap_or_default();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load a config file, falling back to defaults when absent or unreadable
    pub fn load_file(path: &std::path::Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed config file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Apply environment overrides through the given lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(region) = non_empty("HW_REGION_NAME") {
            if crate::cloud::auth::validate_region(&region) {
                self.region = Some(region);
            } else {
                tracing::warn!("Invalid region name in HW_REGION_NAME");
            }
        }
        if let Some(project) = non_empty("HW_PROJECT_ID") {
            if crate::cloud::auth::validate_project_id(&project) {
                self.project_id = Some(project);
            } else {
                tracing::warn!("Invalid project ID format in HW_PROJECT_ID");
            }
        }
        if let Some(token) = non_empty("HW_AUTH_TOKEN") {
            self.auth_token = Some(token);
        }
        if let Some(eps) = non_empty("HW_ENTERPRISE_PROJECT_ID") {
            self.enterprise_project_id = Some(eps);
        }
        if let Some(endpoint) = non_empty("HW_WAF_ENDPOINT") {
            self.endpoint = Some(endpoint);
        }
        if let Some(max_pages) = non_empty("HW_WAF_MAX_PAGES") {
            match max_pages.parse() {
                Ok(n) => self.max_pages = Some(n),
                Err(_) => tracing::warn!("Ignoring non-numeric HW_WAF_MAX_PAGES"),
            }
        }
    }

    /// Save configuration to disk (the token is never written)
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::config_path() else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, content).with_context(|| format!("Failed to write {:?}", path))?;

        Ok(())
    }

    /// Set region and save
    pub fn set_region(&mut self, region: &str) -> Result<()> {
        if !crate::cloud::auth::validate_region(region) {
            anyhow::bail!("invalid region name '{}'", region);
        }
        self.region = Some(region.to_string());
        self.save()
    }

    /// Set project and save
    pub fn set_project(&mut self, project_id: &str) -> Result<()> {
        if !crate::cloud::auth::validate_project_id(project_id) {
            anyhow::bail!("invalid project ID '{}'", project_id);
        }
        self.project_id = Some(project_id.to_string());
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides_file_values() {
        let mut config = Config {
            region: Some("cn-north-1".to_string()),
            max_pages: Some(10),
            ..Default::default()
        };
        let env: HashMap<&str, &str> = [
            ("HW_REGION_NAME", "cn-north-4"),
            ("HW_PROJECT_ID", "0123456789abcdef0123456789abcdef"),
            ("HW_AUTH_TOKEN", "tok"),
            ("HW_WAF_MAX_PAGES", "50"),
        ]
        .into_iter()
        .collect();

        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.region.as_deref(), Some("cn-north-4"));
        assert_eq!(
            config.project_id.as_deref(),
            Some("0123456789abcdef0123456789abcdef")
        );
        assert_eq!(config.auth_token.as_deref(), Some("tok"));
        assert_eq!(config.max_pages, Some(50));
    }

    #[test]
    fn test_invalid_env_values_are_ignored() {
        let mut config = Config::default();
        let env: HashMap<&str, &str> = [
            ("HW_PROJECT_ID", "not-a-project"),
            ("HW_WAF_MAX_PAGES", "many"),
            ("HW_ENTERPRISE_PROJECT_ID", "   "),
        ]
        .into_iter()
        .collect();

        config.apply_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_token_is_not_serialized() {
        let config = Config {
            auth_token: Some("secret".to_string()),
            region: Some("cn-north-4".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret"));
        assert!(json.contains("cn-north-4"));
    }

    #[test]
    fn test_set_rejects_malformed_values() {
        let mut config = Config::default();
        assert!(config.set_region("evil.com/x#").is_err());
        assert!(config.set_project("../project").is_err());
        assert_eq!(config.region, None);
        assert_eq!(config.project_id, None);
    }

    #[test]
    fn test_load_file_missing_returns_default() {
        let config = Config::load_file(std::path::Path::new("/nonexistent/waf-provider.json"));
        assert_eq!(config, Config::default());
    }
}
