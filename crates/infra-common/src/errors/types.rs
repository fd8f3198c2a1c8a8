use thiserror::Error;

/// Result alias used throughout infra-common
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the shared infrastructure
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Filesystem or socket failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport failure while talking to another service
    #[error("Transport error: {0}")]
    Transport(String),

    /// Service registry rejected or could not be reached
    #[error("Registry error: {0}")]
    Registry(String),

    /// Any other error, already rendered with its context
    #[error("{0}")]
    Custom(String),
}

impl From<::config::ConfigError> for Error {
    fn from(value: ::config::ConfigError) -> Self {
        Error::Config(value.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::Transport(value.to_string())
    }
}
