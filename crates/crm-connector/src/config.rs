//! CRM connector configuration

use std::path::Path;

use leadbridge_infra_common::config::{load_config, LogSection, RegistryConfig, ServiceConfig};
use leadbridge_infra_common::errors::ErrorExt;
use leadbridge_infra_common::{Error, Result};
use serde::{Deserialize, Serialize};

/// EspoCRM endpoint and credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmSettings {
    /// Base URL without the `/api/v1/` suffix
    pub base_url: String,
    pub api_key: String,
}

impl Default for CrmSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            api_key: String::new(),
        }
    }
}

/// Top-level configuration of the `crm-connector` binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrmConnectorConfig {
    pub service: ServiceConfig,
    pub registry: RegistryConfig,
    pub crm: CrmSettings,
    pub log: LogSection,
}

impl Default for CrmConnectorConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::new("crm_connector", 9103),
            registry: RegistryConfig::default(),
            crm: CrmSettings::default(),
            log: LogSection::default(),
        }
    }
}

impl CrmConnectorConfig {
    /// Environment variable prefix, e.g. `CRM_CONNECTOR__CRM__API_KEY`
    pub const ENV_PREFIX: &'static str = "CRM_CONNECTOR";

    /// Load from the optional TOML file and the environment, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self =
            load_config(path, Self::ENV_PREFIX).with_context("crm_connector", "load_config")?;
        config.validate().with_context("crm_connector", "validate_config")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.crm.api_key.trim().is_empty() {
            return Err(Error::Config("crm.api_key is required".to_string()));
        }
        if !(self.crm.base_url.starts_with("http://") || self.crm.base_url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "crm.base_url must be an http(s) URL, got '{}'",
                self.crm.base_url
            )));
        }
        self.service.bind_addr()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CrmConnectorConfig::default();
        assert_eq!(config.service.name, "crm_connector");
        assert_eq!(config.service.port, 9103);
        assert!(config.registry.url.is_none());
    }

    #[test]
    fn test_api_key_required() {
        let mut config = CrmConnectorConfig::default();
        assert!(matches!(config.validate(), Err(Error::Config(_))));

        config.crm.api_key = "secret".into();
        assert!(config.validate().is_ok());

        config.crm.base_url = "crm.local".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_env() {
        std::env::set_var("CRM_CONNECTOR__CRM__API_KEY", "from-env");
        std::env::set_var("CRM_CONNECTOR__CRM__BASE_URL", "http://10.0.0.5:8080");
        let config = CrmConnectorConfig::load(None);
        std::env::remove_var("CRM_CONNECTOR__CRM__API_KEY");
        std::env::remove_var("CRM_CONNECTOR__CRM__BASE_URL");

        let config = config.unwrap();
        assert_eq!(config.crm.api_key, "from-env");
        assert_eq!(config.crm.base_url, "http://10.0.0.5:8080");
        assert_eq!(config.service.port, 9103);
    }
}
