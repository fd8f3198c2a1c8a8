//! Bus wiring for the CRM connector

use std::sync::Arc;

use async_trait::async_trait;
use leadbridge_infra_common::bus::BusMethod;
use serde_json::Value;

use crate::upsert::LeadUpsertOrchestrator;

/// Bus method name served by the connector
pub const PUSH_TO_CRM: &str = "push_to_crm";

/// `push_to_crm`: `{firstName, lastName, phoneNumber}` in, `OperationResult` out
pub struct PushToCrmMethod {
    orchestrator: Arc<LeadUpsertOrchestrator>,
}

impl PushToCrmMethod {
    pub fn new(orchestrator: Arc<LeadUpsertOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

#[async_trait]
impl BusMethod for PushToCrmMethod {
    async fn call(&self, params: Value) -> Value {
        self.orchestrator.push_to_crm(&params).await.to_value()
    }
}
