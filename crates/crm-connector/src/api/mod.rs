//! Raw EspoCRM REST transport

pub mod query;

use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde_json::Value;
use tracing::{error, info};

use crate::error::{CrmError, Result};
pub use query::{encode_query, where_query, WhereClause};

/// Path prefix of every EspoCRM API resource
pub const URL_PATH: &str = "/api/v1/";

/// Header carrying the static API key
pub const API_KEY_HEADER: &str = "X-Api-Key";

/// Header EspoCRM uses to explain a rejected request
pub const STATUS_REASON_HEADER: &str = "X-Status-Reason";

/// Thin request layer over the EspoCRM REST API
#[derive(Debug, Clone)]
pub struct EspoApi {
    base_url: String,
    api_key: String,
    http: Client,
}

impl EspoApi {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, Client::new())
    }

    /// Use a preconfigured HTTP client (proxies, TLS roots, timeouts)
    pub fn with_client(base_url: impl Into<String>, api_key: impl Into<String>, http: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            http,
        }
    }

    /// Full URL of `action`, e.g. `Contact` or `Lead/abc123`
    pub fn normalize_url(&self, action: &str) -> String {
        format!("{}{}{}", self.base_url, URL_PATH, action)
    }

    /// Send one request and return the decoded JSON body.
    ///
    /// POST, PUT and PATCH carry `params` as a JSON body; every other method sends them as a
    /// nested query string. Anything but a non-empty 200 response is a [`CrmError`].
    pub async fn request(&self, method: Method, action: &str, params: &Value) -> Result<Value> {
        let url = self.normalize_url(action);
        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(API_KEY_HEADER, &self.api_key);

        if method == Method::POST || method == Method::PUT || method == Method::PATCH {
            builder = builder.json(params);
        } else {
            builder = builder.query(&encode_query(params));
        }

        info!("Sending {} request to {} with params {}", method, url, params);

        let response = builder.send().await?;
        let status = response.status();

        if status != StatusCode::OK {
            let reason = parse_reason(response.headers());
            error!("Request failed: {}, Reason: {}", status.as_u16(), reason);
            return Err(CrmError::Status {
                status: status.as_u16(),
                reason,
            });
        }

        let body = response.bytes().await?;
        if body.is_empty() {
            error!("Empty response content");
            return Err(CrmError::EmptyBody);
        }

        serde_json::from_slice(&body).map_err(|e| CrmError::Decode(e.to_string()))
    }
}

/// Reason EspoCRM gave for a failure, `"Unknown Error"` when it gave none
pub fn parse_reason(headers: &HeaderMap) -> String {
    headers
        .get(STATUS_REASON_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| "Unknown Error".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_normalize_url() {
        let api = EspoApi::new("http://crm.local:8080/", "key");
        assert_eq!(api.normalize_url("Contact"), "http://crm.local:8080/api/v1/Contact");
    }

    #[test]
    fn test_parse_reason() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_reason(&headers), "Unknown Error");

        headers.insert(STATUS_REASON_HEADER, HeaderValue::from_static("Duplicate record"));
        assert_eq!(parse_reason(&headers), "Duplicate record");
    }
}
