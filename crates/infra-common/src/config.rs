//! Layered configuration loading
//!
//! Sources, lowest priority first: the `Default` values of the target type, an optional TOML
//! file, then environment variables named `<PREFIX>__<SECTION>__<KEY>` (for example
//! `CRM_CONNECTOR__CRM__API_KEY`).

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ::config::{Config, Environment, File, FileFormat};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::types::{Error, Result};
use crate::logging::{parse_log_level, FileLogConfig, LoggingConfig};

/// Load a configuration of type `T` from the optional file and the environment
pub fn load_config<T: DeserializeOwned>(path: Option<&Path>, env_prefix: &str) -> Result<T> {
    let mut builder = Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
    }

    builder = builder.add_source(
        Environment::with_prefix(env_prefix)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let cfg = builder.build()?;
    Ok(cfg.try_deserialize()?)
}

/// Where a service listens for bus calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Name the service registers under
    pub name: String,
    pub host: String,
    pub port: u16,
}

impl ServiceConfig {
    pub fn new(name: impl Into<String>, port: u16) -> Self {
        Self {
            name: name.into(),
            host: "127.0.0.1".to_string(),
            port,
        }
    }

    /// Socket address to bind the bus server to
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address {}:{}: {}", self.host, self.port, e)))
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new("leadbridge", 9100)
    }
}

/// Service registry settings; registration is skipped when no URL is configured
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub url: Option<String>,
}

/// Logging section shared by the service configurations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSection {
    /// Level name: trace, debug, info, warn, error
    pub level: String,
    /// JSON lines on the console
    pub json: bool,
    /// Directory for the rotating log file; no file sink when unset
    pub directory: Option<PathBuf>,
    /// Rotated files to keep
    pub max_files: usize,
}

impl Default for LogSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
            max_files: 5,
        }
    }
}

impl LogSection {
    /// Turn this section into a [`LoggingConfig`] for `app_name`
    pub fn to_logging_config(&self, app_name: &str) -> Result<LoggingConfig> {
        let mut config = LoggingConfig::new(parse_log_level(&self.level)?, app_name);
        if self.json {
            config = config.with_json();
        }
        if let Some(dir) = &self.directory {
            let mut file = FileLogConfig::new(dir, app_name);
            file.max_files = self.max_files;
            config = config.with_file(file);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[derive(Debug, Deserialize, Default)]
    #[serde(default)]
    struct TestConfig {
        service: ServiceConfig,
        registry: RegistryConfig,
        log: LogSection,
    }

    #[test]
    fn test_defaults_without_sources() {
        let cfg: TestConfig = load_config(None, "LB_TEST_DEFAULTS").unwrap();
        assert_eq!(cfg.service.port, 9100);
        assert!(cfg.registry.url.is_none());
        assert_eq!(cfg.log.level, "info");
    }

    #[test]
    fn test_file_then_env_override() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[service]\nname = \"crm_connector\"\nport = 9103\n\n[registry]\nurl = \"http://127.0.0.1:9000\""
        )
        .unwrap();

        std::env::set_var("LB_TEST_LAYERED__SERVICE__PORT", "9200");
        let cfg: TestConfig = load_config(Some(file.path()), "LB_TEST_LAYERED").unwrap();
        std::env::remove_var("LB_TEST_LAYERED__SERVICE__PORT");

        assert_eq!(cfg.service.name, "crm_connector");
        assert_eq!(cfg.service.port, 9200);
        assert_eq!(cfg.service.host, "127.0.0.1");
        assert_eq!(cfg.registry.url.as_deref(), Some("http://127.0.0.1:9000"));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let res: Result<TestConfig> =
            load_config(Some(Path::new("/nonexistent/leadbridge.toml")), "LB_TEST_MISSING");
        assert!(matches!(res, Err(Error::Config(_))));
    }

    #[test]
    fn test_bind_addr() {
        let svc = ServiceConfig::new("call_orchestrator", 9104);
        assert_eq!(svc.bind_addr().unwrap().to_string(), "127.0.0.1:9104");

        let bad = ServiceConfig {
            host: "not a host".into(),
            ..svc
        };
        assert!(bad.bind_addr().is_err());
    }

    #[test]
    fn test_log_section_to_logging_config() {
        let section = LogSection {
            level: "debug".into(),
            directory: Some(PathBuf::from("/var/log/leadbridge")),
            max_files: 3,
            ..Default::default()
        };
        let cfg = section.to_logging_config("crm_connector").unwrap();
        assert_eq!(cfg.level, tracing::Level::DEBUG);
        let file = cfg.file.unwrap();
        assert_eq!(file.prefix, "crm_connector");
        assert_eq!(file.max_files, 3);

        let bad = LogSection {
            level: "chatty".into(),
            ..Default::default()
        };
        assert!(bad.to_logging_config("x").is_err());
    }
}
