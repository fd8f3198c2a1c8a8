use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tracing::{debug, info, warn};

use super::registry::ServiceDescriptor;
use crate::errors::types::Result;

/// A remotely invocable operation.
///
/// Handlers never fail at the bus level: failures are reported inside the returned mapping.
#[async_trait]
pub trait BusMethod: Send + Sync {
    async fn call(&self, params: Value) -> Value;
}

struct BusState {
    name: String,
    methods: HashMap<String, Arc<dyn BusMethod>>,
}

/// HTTP server routing `POST /rpc/{method}` to registered methods
pub struct BusServer {
    name: String,
    addr: SocketAddr,
    methods: HashMap<String, Arc<dyn BusMethod>>,
}

impl BusServer {
    pub fn new(name: impl Into<String>, addr: SocketAddr) -> Self {
        Self {
            name: name.into(),
            addr,
            methods: HashMap::new(),
        }
    }

    /// Register `method` under `name`, replacing any previous handler with that name
    pub fn register_method(&mut self, name: impl Into<String>, method: Arc<dyn BusMethod>) {
        let name = name.into();
        debug!("Registering bus method {} on {}", name, self.name);
        self.methods.insert(name, method);
    }

    /// Registered method names, sorted
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.methods.keys().cloned().collect();
        names.sort();
        names
    }

    /// Descriptor announcing this server to the registry
    pub fn descriptor(&self) -> ServiceDescriptor {
        ServiceDescriptor {
            name: self.name.clone(),
            host: self.addr.ip().to_string(),
            port: self.addr.port(),
            methods: self.method_names(),
        }
    }

    pub fn router(&self) -> Router {
        let state = Arc::new(BusState {
            name: self.name.clone(),
            methods: self.methods.clone(),
        });

        Router::new()
            .route("/rpc/:method", post(handle_call))
            .route("/health", get(handle_health))
            .with_state(state)
    }

    /// Bind the configured address and serve until the process exits
    pub async fn serve(self) -> Result<()> {
        let listener = TcpListener::bind(self.addr).await?;
        self.serve_with_listener(listener, std::future::pending()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_with_listener<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let local = listener.local_addr()?;
        info!("✅ {} bus server listening on {} ({})", self.name, local, self.method_names().join(", "));
        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;
        info!("🛑 {} bus server stopped", self.name);
        Ok(())
    }
}

async fn handle_call(
    State(state): State<Arc<BusState>>,
    Path(method): Path<String>,
    body: Bytes,
) -> (StatusCode, Json<Value>) {
    let Some(handler) = state.methods.get(&method) else {
        warn!("{}: unknown method {}", state.name, method);
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"status": "error", "message": format!("unknown method: {}", method)})),
        );
    };

    let params = if body.is_empty() {
        json!({})
    } else {
        match serde_json::from_slice::<Value>(&body) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"status": "error", "message": "arguments must be a JSON object"})),
                )
            }
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"status": "error", "message": format!("invalid JSON: {}", e)})),
                )
            }
        }
    };

    debug!("{}: dispatching {}", state.name, method);
    (StatusCode::OK, Json(handler.call(params).await))
}

async fn handle_health(State(state): State<Arc<BusState>>) -> Json<Value> {
    let mut methods: Vec<&String> = state.methods.keys().collect();
    methods.sort();
    Json(json!({"status": "ok", "service": state.name, "methods": methods}))
}
