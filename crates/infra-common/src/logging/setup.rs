use crate::errors::types::{Error, Result};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Rotating log file settings
#[derive(Debug, Clone)]
pub struct FileLogConfig {
    /// Directory the log files are written to
    pub directory: PathBuf,
    /// File name prefix, usually the service name
    pub prefix: String,
    /// Number of rotated files to keep
    pub max_files: usize,
}

impl FileLogConfig {
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        FileLogConfig {
            directory: directory.into(),
            prefix: prefix.into(),
            max_files: 5,
        }
    }
}

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// The log level to use
    pub level: Level,
    /// Whether to enable JSON formatting on the console
    pub json: bool,
    /// Whether to include file and line information
    pub file_info: bool,
    /// Whether to log spans
    pub log_spans: bool,
    /// Application name to include in logs
    pub app_name: String,
    /// Optional rotating file sink in addition to the console
    pub file: Option<FileLogConfig>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: Level::INFO,
            json: false,
            file_info: false,
            log_spans: false,
            app_name: "leadbridge".to_string(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Create a new logging configuration
    pub fn new(level: Level, app_name: impl Into<String>) -> Self {
        LoggingConfig {
            level,
            app_name: app_name.into(),
            ..Default::default()
        }
    }

    /// Enable JSON formatting
    pub fn with_json(mut self) -> Self {
        self.json = true;
        self
    }

    /// Enable file and line information in logs
    pub fn with_file_info(mut self) -> Self {
        self.file_info = true;
        self
    }

    /// Enable span logging
    pub fn with_spans(mut self) -> Self {
        self.log_spans = true;
        self
    }

    /// Also write logs to a rotating file
    pub fn with_file(mut self, file: FileLogConfig) -> Self {
        self.file = Some(file);
        self
    }
}

/// Keeps the background file writer alive; dropping it flushes pending lines.
#[must_use = "dropping the guard stops the file writer"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Set up the logging system with the provided configuration.
///
/// Installs a global subscriber, so it can succeed only once per process. A second call
/// returns [`Error::Config`].
pub fn setup_logging(config: LoggingConfig) -> Result<LoggingGuard> {
    let filter = EnvFilter::from_default_env()
        .add_directive(LevelFilter::from_level(config.level).into());

    let span_events = || {
        if config.log_spans {
            FmtSpan::ACTIVE
        } else {
            FmtSpan::NONE
        }
    };

    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    let console = fmt::layer()
        .with_span_events(span_events())
        .with_file(config.file_info)
        .with_line_number(config.file_info);
    if config.json {
        layers.push(console.json().boxed());
    } else {
        layers.push(console.boxed());
    }

    let mut file_guard = None;
    if let Some(file) = &config.file {
        let (writer, guard) = tracing_appender::non_blocking(file_appender(file)?);
        layers.push(
            fmt::layer()
                .with_ansi(false)
                .with_writer(writer)
                .with_span_events(span_events())
                .boxed(),
        );
        file_guard = Some(guard);
    }

    tracing_subscriber::registry()
        .with(layers)
        .with(filter)
        .try_init()
        .map_err(|e| Error::Config(format!("Logging already initialized: {}", e)))?;

    Ok(LoggingGuard { _file: file_guard })
}

/// Build the rotating appender for a file sink
pub(crate) fn file_appender(file: &FileLogConfig) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(file.prefix.clone())
        .filename_suffix("log")
        .max_log_files(file.max_files.max(1))
        .build(&file.directory)
        .map_err(|e| {
            Error::Config(format!(
                "Cannot open log directory {}: {}",
                file.directory.display(),
                e
            ))
        })
}

/// Parse a log level from a string
pub fn parse_log_level(level: &str) -> Result<Level> {
    Level::from_str(level).map_err(|_| Error::Config(format!("Invalid log level: {}", level)))
}

/// Log a welcome message with version info
pub fn log_welcome(app_name: &str, version: &str) {
    tracing::info!("🚀 Starting {} v{}", app_name, version);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("debug").unwrap(), Level::DEBUG);
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert!(matches!(parse_log_level("loud"), Err(Error::Config(_))));
    }

    #[test]
    fn test_builder_methods() {
        let config = LoggingConfig::new(Level::DEBUG, "crm_connector")
            .with_json()
            .with_spans()
            .with_file(FileLogConfig::new("/tmp/logs", "crm_connector"));
        assert!(config.json);
        assert!(config.log_spans);
        assert!(!config.file_info);
        assert_eq!(config.app_name, "crm_connector");
        assert_eq!(config.file.as_ref().map(|f| f.max_files), Some(5));
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("logs");
        let appender = file_appender(&FileLogConfig::new(&target, "call_orchestrator"));
        assert!(appender.is_ok());
        assert!(target.is_dir());
    }
}
