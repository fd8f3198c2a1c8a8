//! Error types for telephony operations

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelephonyError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Endpoint answered with a non-2xx status
    #[error("Telephony endpoint returned HTTP {0}")]
    Status(u16),

    #[error("Malformed telephony response: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, TelephonyError>;
