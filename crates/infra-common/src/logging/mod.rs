//! Logging setup and structured log contexts

pub mod context;
pub mod setup;

pub use context::LogContext;
pub use setup::{log_welcome, parse_log_level, setup_logging, FileLogConfig, LoggingConfig, LoggingGuard};
