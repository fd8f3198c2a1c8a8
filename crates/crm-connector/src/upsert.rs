//! Lead upsert workflow behind `push_to_crm`
//!
//! Contacts are find-or-create, keyed by exact phone number; an existing contact is never
//! updated. A new lead is created on every push, whether or not the contact already existed.

use std::sync::Arc;

use leadbridge_infra_common::logging::LogContext;
use serde_json::Value;
use tracing::{error, info, Instrument, Level};

use crate::client::CrmApi;
use crate::error::{CrmError, Result};
use crate::types::{ContactLookup, NewLead, OperationResult, UpsertOutcome};

/// Arguments of a `push_to_crm` call
#[derive(Debug, Clone, PartialEq)]
pub struct PushRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

impl PushRequest {
    /// Read `firstName`, `lastName` and `phoneNumber` from the bus arguments.
    ///
    /// Missing names become empty strings; a missing or empty phone number is rejected
    /// because contacts are keyed by it.
    pub fn from_params(params: &Value) -> Result<Self> {
        let phone_number = text_arg(params, "phoneNumber")
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| CrmError::InvalidInput("phoneNumber is required".to_string()))?;

        Ok(Self {
            first_name: text_arg(params, "firstName").unwrap_or_default(),
            last_name: text_arg(params, "lastName").unwrap_or_default(),
            phone_number,
        })
    }
}

fn text_arg(params: &Value, key: &str) -> Option<String> {
    match params.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Runs the contact find-or-create and lead creation against a [`CrmApi`]
pub struct LeadUpsertOrchestrator {
    crm: Arc<dyn CrmApi>,
    log: LogContext,
}

impl LeadUpsertOrchestrator {
    pub fn new(crm: Arc<dyn CrmApi>, log: LogContext) -> Self {
        Self { crm, log }
    }

    /// Find or create the contact for `phone_number`, then always create a new lead
    pub async fn upsert(
        &self,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
    ) -> Result<UpsertOutcome> {
        let lead = NewLead::new(first_name, last_name, phone_number);

        match self.crm.find_contact_by_phone(phone_number).await? {
            ContactLookup::NotFound => {
                info!("No contact for {}, creating one", phone_number);
                let contact = self
                    .crm
                    .create_contact(first_name, last_name, phone_number)
                    .await?;
                let lead = self.crm.create_lead(lead).await?;
                Ok(UpsertOutcome::Created { contact, lead })
            }
            ContactLookup::Found { contact, total } => {
                info!(
                    "Reusing contact {} ({} match(es)) for {}",
                    contact.id, total, phone_number
                );
                let lead = self.crm.create_lead(lead).await?;
                Ok(UpsertOutcome::Existing { contact, lead })
            }
        }
    }

    /// Bus entry point: never fails, errors come back as `{status: "error", message}`
    pub async fn push_to_crm(&self, params: &Value) -> OperationResult {
        let span = self.log.for_operation("push_to_crm").span(Level::INFO);
        async move {
            let request = match PushRequest::from_params(params) {
                Ok(request) => request,
                Err(e) => {
                    error!("Rejected push: {}", e);
                    return OperationResult::error(e.to_string());
                }
            };

            info!(
                "Pushing lead to CRM: {} {}, {}",
                request.first_name, request.last_name, request.phone_number
            );

            match self
                .upsert(&request.first_name, &request.last_name, &request.phone_number)
                .await
            {
                Ok(outcome) => {
                    info!(
                        "CRM push result: {} (contact {}, lead {})",
                        outcome.status(),
                        outcome.contact().id,
                        outcome.lead().id
                    );
                    OperationResult::Pushed { crm_result: outcome }
                }
                Err(e) => {
                    error!("Error pushing to CRM: {}", e);
                    OperationResult::error(e.to_string())
                }
            }
        }
        .instrument(span)
        .await
    }
}
