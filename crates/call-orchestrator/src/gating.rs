//! Call gating against the shared telephony endpoint

use std::sync::Arc;

use leadbridge_infra_common::logging::LogContext;
use leadbridge_infra_common::{flatten, FlattenedEvent};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn, Instrument, Level};

use crate::request::CallRequest;
use crate::telephony::{TelephonyApi, TelephonyStatus};

/// What to do when the status query itself fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFailurePolicy {
    /// Treat the endpoint as idle and dial
    #[default]
    FailOpen,
    /// Skip the call
    FailClosed,
}

/// How one `start_call` ended
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    /// The endpoint accepted the call
    Placed { number: String, response: Value },
    /// Event is not call-worthy; nothing was sent to the endpoint
    MissingFields(Vec<&'static str>),
    /// A call is already in progress
    Busy { status: String },
    /// Status query failed under [`StatusFailurePolicy::FailClosed`]
    StatusUnavailable,
    PlacementFailed { number: String, reason: String },
}

/// Decides whether an event results in an outbound call
pub struct CallGatingOrchestrator {
    telephony: Arc<dyn TelephonyApi>,
    policy: StatusFailurePolicy,
    gate: Option<Mutex<()>>,
    log: LogContext,
}

impl CallGatingOrchestrator {
    pub fn new(telephony: Arc<dyn TelephonyApi>, log: LogContext) -> Self {
        Self {
            telephony,
            policy: StatusFailurePolicy::default(),
            gate: None,
            log,
        }
    }

    pub fn with_policy(mut self, policy: StatusFailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Run status check and placement under one in-process lock.
    ///
    /// Only sound when this process is the sole caller of the telephony endpoint.
    pub fn with_serialized_calls(mut self, enabled: bool) -> Self {
        self.gate = enabled.then(|| Mutex::new(()));
        self
    }

    /// Bus entry point: the event is read from the `result` argument
    pub async fn start_call(&self, params: &Value) -> CallOutcome {
        let span = self.log.for_operation("start_call").span(Level::INFO);
        async move {
            let event = match params.get("result") {
                Some(result) => flatten(result),
                None => FlattenedEvent::default(),
            };
            self.handle_event(&event).await
        }
        .instrument(span)
        .await
    }

    /// Gate and, if allowed, place a call for an already flattened event
    pub async fn handle_event(&self, event: &FlattenedEvent) -> CallOutcome {
        for (path, value) in event.iter() {
            debug!("{} = {}", path, value);
        }

        let request = match CallRequest::from_event(event) {
            Ok(request) => request,
            Err(missing) => {
                warn!("Not enough data to start a call: {}", missing);
                return CallOutcome::MissingFields(missing.0);
            }
        };

        info!(
            "lead_id={}, created_by_id={}, number={}",
            request.lead_id, request.created_by_id, request.phone_number
        );

        let _serialized = match &self.gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        };

        let status = match self.telephony.get_status().await {
            Ok(status) => status,
            Err(e) => {
                error!("Failed to get call status: {}", e);
                match self.policy {
                    StatusFailurePolicy::FailOpen => {
                        warn!("Status unknown, proceeding as idle");
                        TelephonyStatus::idle()
                    }
                    StatusFailurePolicy::FailClosed => {
                        warn!("Status unknown, not starting a call");
                        return CallOutcome::StatusUnavailable;
                    }
                }
            }
        };

        info!("Current call status: {}", status.status);

        if !status.is_idle() {
            info!("A call is already active, not starting a new one");
            return CallOutcome::Busy {
                status: status.status,
            };
        }

        let number = request.dial_number();
        match self.telephony.place_call(&number).await {
            Ok(response) => {
                info!("📞 Call placed to {} for lead {}", number, request.lead_id);
                CallOutcome::Placed { number, response }
            }
            Err(e) => {
                error!("Call to {} was not placed: {}", number, e);
                CallOutcome::PlacementFailed {
                    number,
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Result, TelephonyError};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    /// Endpoint that turns busy once a call is placed
    #[derive(Default)]
    struct StatefulEndpoint {
        active: AtomicBool,
        status_fails: bool,
        placed: AtomicUsize,
    }

    #[async_trait]
    impl TelephonyApi for StatefulEndpoint {
        async fn get_status(&self) -> Result<TelephonyStatus> {
            if self.status_fails {
                return Err(TelephonyError::Status(502));
            }
            let active = self.active.load(Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok(TelephonyStatus {
                status: if active { "in_call".into() } else { "idle".into() },
            })
        }

        async fn place_call(&self, number: &str) -> Result<Value> {
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.store(true, Ordering::SeqCst);
            self.placed.fetch_add(1, Ordering::SeqCst);
            Ok(json!({"number": number}))
        }
    }

    fn params() -> Value {
        json!({"result": {"crm_result": {"lead": {"lead": {
            "id": "l1", "phoneNumber": "+380501112233", "createdById": "u1"
        }}}}})
    }

    #[tokio::test]
    async fn test_places_call_when_idle() {
        let endpoint = Arc::new(StatefulEndpoint::default());
        let orchestrator = CallGatingOrchestrator::new(endpoint.clone(), LogContext::new("test"));

        let outcome = orchestrator.start_call(&params()).await;
        assert_eq!(
            outcome,
            CallOutcome::Placed {
                number: "501112233".into(),
                response: json!({"number": "501112233"}),
            }
        );
        assert_eq!(endpoint.placed.load(Ordering::SeqCst), 1);

        let second = orchestrator.start_call(&params()).await;
        assert_eq!(second, CallOutcome::Busy { status: "in_call".into() });
    }

    #[tokio::test]
    async fn test_missing_result_argument() {
        let endpoint = Arc::new(StatefulEndpoint::default());
        let orchestrator = CallGatingOrchestrator::new(endpoint.clone(), LogContext::new("test"));

        let outcome = orchestrator.start_call(&json!({})).await;
        assert_eq!(
            outcome,
            CallOutcome::MissingFields(vec!["leadId", "phoneNumber", "createdById"])
        );
        assert_eq!(endpoint.placed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_failure_policies() {
        let endpoint = Arc::new(StatefulEndpoint {
            status_fails: true,
            ..Default::default()
        });

        let open = CallGatingOrchestrator::new(endpoint.clone(), LogContext::new("test"));
        assert!(matches!(open.start_call(&params()).await, CallOutcome::Placed { .. }));

        let closed = CallGatingOrchestrator::new(endpoint.clone(), LogContext::new("test"))
            .with_policy(StatusFailurePolicy::FailClosed);
        assert_eq!(closed.start_call(&params()).await, CallOutcome::StatusUnavailable);

        assert_eq!(endpoint.placed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_serialized_calls_place_only_one() {
        let endpoint = Arc::new(StatefulEndpoint::default());
        let orchestrator = Arc::new(
            CallGatingOrchestrator::new(endpoint.clone(), LogContext::new("test"))
                .with_serialized_calls(true),
        );

        let a = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.start_call(&params()).await }
        });
        let b = tokio::spawn({
            let orchestrator = orchestrator.clone();
            async move { orchestrator.start_call(&params()).await }
        });

        let outcomes = [a.await.unwrap(), b.await.unwrap()];
        let placed = outcomes
            .iter()
            .filter(|o| matches!(o, CallOutcome::Placed { .. }))
            .count();
        assert_eq!(placed, 1);
        assert_eq!(endpoint.placed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_policy_config_names() {
        let policy: StatusFailurePolicy = serde_json::from_value(json!("fail_closed")).unwrap();
        assert_eq!(policy, StatusFailurePolicy::FailClosed);
        assert_eq!(StatusFailurePolicy::default(), StatusFailurePolicy::FailOpen);
    }
}
