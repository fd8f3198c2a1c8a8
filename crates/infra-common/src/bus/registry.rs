use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::context::{ErrorContext, ErrorExt};
use crate::errors::types::{Error, Result};

/// What a service announces to the registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptor {
    pub name: String,
    pub host: String,
    pub port: u16,
    /// Names of the bus methods the service serves
    pub methods: Vec<String>,
}

/// Client for the service registry
#[derive(Debug, Clone)]
pub struct Registry {
    url: String,
    http: reqwest::Client,
}

impl Registry {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Announce `descriptor` with `POST {url}/register`
    pub async fn register(&self, descriptor: &ServiceDescriptor) -> Result<()> {
        let ctx = ErrorContext::new("registry", "register").with_details(self.url.as_str());

        let response = self
            .http
            .post(format!("{}/register", self.url))
            .json(descriptor)
            .send()
            .await
            .map_err(Error::from)
            .context(ctx.clone())?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Registry(format!(
                "registration of {} rejected with HTTP {}",
                descriptor.name, status
            ))
            .in_context(&ctx));
        }

        info!(
            "📇 Registered {} at {}:{} with methods [{}]",
            descriptor.name,
            descriptor.host,
            descriptor.port,
            descriptor.methods.join(", ")
        );
        Ok(())
    }
}

/// Register with the registry at `url` when one is configured.
///
/// Failures are logged and swallowed: the service keeps serving direct calls.
pub async fn register_if_configured(url: Option<&str>, descriptor: &ServiceDescriptor) {
    let Some(url) = url else {
        info!("No registry configured, {} will not be announced", descriptor.name);
        return;
    };

    if let Err(e) = Registry::new(url).register(descriptor).await {
        warn!("⚠️ Could not register {} with {}: {}", descriptor.name, url, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn descriptor() -> ServiceDescriptor {
        ServiceDescriptor {
            name: "call_orchestrator".into(),
            host: "127.0.0.1".into(),
            port: 9104,
            methods: vec!["start_call".into()],
        }
    }

    #[tokio::test]
    async fn test_register_posts_descriptor() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .and(body_json(json!({
                "name": "call_orchestrator",
                "host": "127.0.0.1",
                "port": 9104,
                "methods": ["start_call"]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let registry = Registry::new(format!("{}/", server.uri()));
        registry.register(&descriptor()).await.unwrap();
    }

    #[tokio::test]
    async fn test_register_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/register"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = Registry::new(server.uri()).register(&descriptor()).await.unwrap_err();
        match err {
            Error::Registry(msg) => {
                assert!(msg.contains("503"));
                assert!(msg.contains("operation 'register'"));
                assert!(msg.contains(&server.uri()));
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // swallowed, not propagated
        register_if_configured(Some(&server.uri()), &descriptor()).await;
        register_if_configured(None, &descriptor()).await;
    }

    #[tokio::test]
    async fn test_unreachable_registry_is_a_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let err = Registry::new(url).register(&descriptor()).await.unwrap_err();
        match err {
            Error::Transport(msg) => assert!(msg.contains("component 'registry'")),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
