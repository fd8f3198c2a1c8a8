//! Call orchestrator configuration

use std::path::Path;

use leadbridge_infra_common::config::{load_config, LogSection, RegistryConfig, ServiceConfig};
use leadbridge_infra_common::errors::ErrorExt;
use leadbridge_infra_common::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::gating::StatusFailurePolicy;

/// Telephony endpoint and gating behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelephonySettings {
    /// The endpoint's single command URL
    pub url: String,
    pub status_failure_policy: StatusFailurePolicy,
    /// Serialize check-then-act in process; only valid for a sole caller
    pub serialize_calls: bool,
}

impl Default for TelephonySettings {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:8801/call".to_string(),
            status_failure_policy: StatusFailurePolicy::FailOpen,
            serialize_calls: false,
        }
    }
}

/// Top-level configuration of the `call-orchestrator` binary
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CallOrchestratorConfig {
    pub service: ServiceConfig,
    pub registry: RegistryConfig,
    pub telephony: TelephonySettings,
    pub log: LogSection,
}

impl Default for CallOrchestratorConfig {
    fn default() -> Self {
        Self {
            service: ServiceConfig::new("call_orchestrator", 9104),
            registry: RegistryConfig::default(),
            telephony: TelephonySettings::default(),
            log: LogSection::default(),
        }
    }
}

impl CallOrchestratorConfig {
    /// Environment variable prefix, e.g. `CALL_ORCHESTRATOR__TELEPHONY__URL`
    pub const ENV_PREFIX: &'static str = "CALL_ORCHESTRATOR";

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self =
            load_config(path, Self::ENV_PREFIX).with_context("call_orchestrator", "load_config")?;
        config.validate().with_context("call_orchestrator", "validate_config")?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let url = &self.telephony.url;
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::Config(format!(
                "telephony.url must be an http(s) URL, got '{}'",
                url
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
    fn test_defaults_are_valid() {
        let config = CallOrchestratorConfig::default();
        assert_eq!(config.service.name, "call_orchestrator");
        assert_eq!(config.service.port, 9104);
        assert_eq!(config.telephony.status_failure_policy, StatusFailurePolicy::FailOpen);
        assert!(!config.telephony.serialize_calls);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_from_env() {
        std::env::set_var("CALL_ORCHESTRATOR__TELEPHONY__STATUS_FAILURE_POLICY", "fail_closed");
        std::env::set_var("CALL_ORCHESTRATOR__TELEPHONY__SERIALIZE_CALLS", "true");
        let config = CallOrchestratorConfig::load(None);
        std::env::remove_var("CALL_ORCHESTRATOR__TELEPHONY__STATUS_FAILURE_POLICY");
        std::env::remove_var("CALL_ORCHESTRATOR__TELEPHONY__SERIALIZE_CALLS");

        let config = config.unwrap();
        assert_eq!(config.telephony.status_failure_policy, StatusFailurePolicy::FailClosed);
        assert!(config.telephony.serialize_calls);
    }

    #[test]
    fn test_rejects_non_http_url() {
        let mut config = CallOrchestratorConfig::default();
        config.telephony.url = "192.168.1.105:8801/call".into();
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_load_reports_failing_step() {
        use std::io::Write;

        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[telephony]\nurl = \"telephony.local/call\"").unwrap();

        match CallOrchestratorConfig::load(Some(file.path())) {
            Err(Error::Config(msg)) => {
                assert!(msg.contains("telephony.url"));
                assert!(msg.contains("component 'call_orchestrator'"));
                assert!(msg.contains("operation 'validate_config'"));
            }
            other => panic!("expected a config error, got {other:?}"),
        }
    }
}
