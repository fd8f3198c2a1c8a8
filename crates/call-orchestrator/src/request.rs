//! Extraction of call parameters from a flattened event

use leadbridge_infra_common::FlattenedEvent;
use thiserror::Error;

/// Lead-shaped paths are probed first, contact-shaped paths second
pub const LEAD_ID_PATHS: &[&str] = &["crm_result.lead.lead.id", "crm_result.contact.id"];
pub const PHONE_NUMBER_PATHS: &[&str] = &[
    "crm_result.lead.lead.phoneNumber",
    "crm_result.contact.phoneNumber",
];
pub const CREATED_BY_ID_PATHS: &[&str] = &[
    "crm_result.lead.lead.createdById",
    "crm_result.contact.createdById",
];

/// Digits kept when dialing: the fixed-width local part of the number
pub const LOCAL_NUMBER_LEN: usize = 9;

/// Fields a call-worthy event must carry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallRequest {
    pub lead_id: String,
    pub phone_number: String,
    pub created_by_id: String,
}

/// Names of the required fields absent from an event
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing {}", .0.join(", "))]
pub struct MissingFields(pub Vec<&'static str>);

impl CallRequest {
    /// Resolve every field through its aliases; all three are required
    pub fn from_event(event: &FlattenedEvent) -> std::result::Result<Self, MissingFields> {
        let lead_id = event.first_present_string(LEAD_ID_PATHS);
        let phone_number = event.first_present_string(PHONE_NUMBER_PATHS);
        let created_by_id = event.first_present_string(CREATED_BY_ID_PATHS);

        match (lead_id, phone_number, created_by_id) {
            (Some(lead_id), Some(phone_number), Some(created_by_id)) => Ok(Self {
                lead_id,
                phone_number,
                created_by_id,
            }),
            (lead_id, phone_number, created_by_id) => {
                let mut missing = Vec::new();
                if lead_id.is_none() {
                    missing.push("leadId");
                }
                if phone_number.is_none() {
                    missing.push("phoneNumber");
                }
                if created_by_id.is_none() {
                    missing.push("createdById");
                }
                Err(MissingFields(missing))
            }
        }
    }

    /// Number as sent to the telephony endpoint
    pub fn dial_number(&self) -> String {
        normalize_number(&self.phone_number)
    }
}

/// Keep the last [`LOCAL_NUMBER_LEN`] characters of `number`
pub fn normalize_number(number: &str) -> String {
    let count = number.chars().count();
    number
        .chars()
        .skip(count.saturating_sub(LOCAL_NUMBER_LEN))
        .collect()
}
