//! Bus wiring for the call orchestrator

use std::sync::Arc;

use async_trait::async_trait;
use leadbridge_infra_common::bus::BusMethod;
use serde_json::Value;
use tracing::debug;

use crate::gating::CallGatingOrchestrator;

/// Bus method name served by the orchestrator
pub const START_CALL: &str = "start_call";

/// `start_call`: `{result: <event>}` in, nothing out. The outcome is only logged.
pub struct StartCallMethod {
    orchestrator: Arc<CallGatingOrchestrator>,
}

impl StartCallMethod {
    pub fn new(orchestrator: Arc<CallGatingOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl BusMethod for StartCallMethod {
    async fn call(&self, params: Value) -> Value {
        let outcome = self.orchestrator.start_call(&params).await;
        debug!("start_call finished: {:?}", outcome);
        Value::Null
    }
}
