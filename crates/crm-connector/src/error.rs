//! Error types for CRM operations

use thiserror::Error;

/// Failures talking to the CRM.
///
/// Expected outcomes such as "no contact with this phone" are not errors; see
/// [`ContactLookup`](crate::types::ContactLookup).
#[derive(Debug, Error)]
pub enum CrmError {
    /// The CRM answered with anything but 200
    #[error("Wrong request, status code {status}, reason: {reason}")]
    Status { status: u16, reason: String },

    #[error("Empty response content")]
    EmptyBody,

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Body was not the JSON shape we expected
    #[error("Malformed CRM response: {0}")]
    Decode(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, CrmError>;
