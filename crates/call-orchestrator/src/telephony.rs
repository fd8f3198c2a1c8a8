//! Telephony endpoint client
//!
//! The endpoint is a single URL accepting POSTed JSON commands:
//!
//! ```text
//! {"action": "get_status"}                  -> {"status": "idle" | <anything else>}
//! {"action": "call", "number": "501112233"} -> endpoint-defined JSON
//! ```

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::error::{Result, TelephonyError};

/// Status reported by the telephony endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelephonyStatus {
    /// Reported status as text; non-string values are kept in their JSON form
    pub status: String,
}

fn idle_status() -> String {
    TelephonyStatus::IDLE.to_string()
}

impl TelephonyStatus {
    pub const IDLE: &'static str = "idle";

    pub fn idle() -> Self {
        Self { status: idle_status() }
    }

    pub fn is_idle(&self) -> bool {
        self.status == Self::IDLE
    }

    /// Read a `get_status` reply.
    ///
    /// A missing `status` key means idle. Only the exact string `"idle"` is idle; `null`,
    /// numbers and objects are reported statuses like any other.
    pub fn from_body(body: &Value) -> Result<Self> {
        let object = body
            .as_object()
            .ok_or_else(|| TelephonyError::Decode(format!("expected a JSON object, got {}", body)))?;

        let status = match object.get("status") {
            None => idle_status(),
            Some(Value::String(status)) => status.clone(),
            Some(other) => other.to_string(),
        };
        Ok(Self { status })
    }
}

/// Commands the orchestrator sends to the telephony endpoint
#[async_trait]
pub trait TelephonyApi: Send + Sync {
    async fn get_status(&self) -> Result<TelephonyStatus>;

    /// Dial `number`; returns whatever the endpoint answered
    async fn place_call(&self, number: &str) -> Result<Value>;
}

/// [`TelephonyApi`] over the endpoint's HTTP interface
#[derive(Debug, Clone)]
pub struct HttpTelephonyClient {
    url: String,
    http: Client,
}

impl HttpTelephonyClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, Client::new())
    }

    pub fn with_client(url: impl Into<String>, http: Client) -> Self {
        Self { url: url.into(), http }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn post(&self, command: &Value) -> Result<reqwest::Response> {
        debug!("Telephony command {} -> {}", command, self.url);
        let response = self.http.post(&self.url).json(command).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TelephonyError::Status(status.as_u16()));
        }
        Ok(response)
    }
}

#[async_trait]
impl TelephonyApi for HttpTelephonyClient {
    async fn get_status(&self) -> Result<TelephonyStatus> {
        let response = self.post(&json!({"action": "get_status"})).await?;
        let body = response.bytes().await?;
        let body: Value =
            serde_json::from_slice(&body).map_err(|e| TelephonyError::Decode(e.to_string()))?;
        TelephonyStatus::from_body(&body)
    }

    async fn place_call(&self, number: &str) -> Result<Value> {
        let response = self
            .post(&json!({"action": "call", "number": number}))
            .await?;
        let body = response.bytes().await?;
        // A 2xx means the call was accepted, whatever the body looks like
        Ok(serde_json::from_slice(&body).unwrap_or(Value::Null))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_defaults_to_idle() {
        let status = TelephonyStatus::from_body(&json!({})).unwrap();
        assert!(status.is_idle());

        let busy = TelephonyStatus::from_body(&json!({"status": "in_call"})).unwrap();
        assert!(!busy.is_idle());
        assert_eq!(TelephonyStatus::idle().status, "idle");
    }

    #[test]
    fn test_non_string_status_is_not_idle() {
        for body in [
            json!({"status": null}),
            json!({"status": 1}),
            json!({"status": {"state": "in_call"}}),
        ] {
            let status = TelephonyStatus::from_body(&body).unwrap();
            assert!(!status.is_idle(), "{} read as idle", body);
        }

        let null = TelephonyStatus::from_body(&json!({"status": null})).unwrap();
        assert_eq!(null.status, "null");
    }

    #[test]
    fn test_non_object_reply_is_a_decode_error() {
        let err = TelephonyStatus::from_body(&json!(["idle"])).unwrap_err();
        assert!(matches!(err, TelephonyError::Decode(_)));
    }
}
