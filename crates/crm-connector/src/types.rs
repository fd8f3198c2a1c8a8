//! CRM records and workflow outcomes

use serde::{Deserialize, Serialize, Serializer};
use serde_json::{json, Map, Value};

/// Contact as stored in the CRM.
///
/// Attributes without a typed field are kept in `extra` and written back out unchanged. Unset
/// typed attributes are written as `null`, the way the CRM reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactRecord {
    pub id: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub created_by_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Lead as stored in the CRM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub created_by_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of a lead-create request. `name` is the base the timestamped name is built from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

impl NewLead {
    pub fn new(first_name: &str, last_name: &str, phone_number: &str) -> Self {
        Self {
            name: None,
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            phone_number: phone_number.to_string(),
        }
    }
}

/// Result of looking a contact up by phone number
#[derive(Debug, Clone, PartialEq)]
pub enum ContactLookup {
    /// First matching contact and the total number of matches
    Found { contact: ContactRecord, total: u64 },
    NotFound,
}

/// Outcome of the contact find-or-create plus lead creation
#[derive(Debug, Clone, PartialEq)]
pub enum UpsertOutcome {
    /// No contact matched; one was created
    Created { contact: ContactRecord, lead: LeadRecord },
    /// An existing contact was reused untouched
    Existing { contact: ContactRecord, lead: LeadRecord },
}

impl UpsertOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            UpsertOutcome::Created { .. } => "created",
            UpsertOutcome::Existing { .. } => "success",
        }
    }

    pub fn lead(&self) -> &LeadRecord {
        match self {
            UpsertOutcome::Created { lead, .. } | UpsertOutcome::Existing { lead, .. } => lead,
        }
    }

    pub fn contact(&self) -> &ContactRecord {
        match self {
            UpsertOutcome::Created { contact, .. } | UpsertOutcome::Existing { contact, .. } => contact,
        }
    }

    /// Wire shape consumed downstream by `start_call`.
    ///
    /// The lead always sits at `lead.lead`; the contact sits at `contact.contact` when it was
    /// created and directly at `contact` when it already existed.
    pub fn to_payload(&self) -> Value {
        match self {
            UpsertOutcome::Created { contact, lead } => json!({
                "status": self.status(),
                "contact": {"status": "success", "contact": contact},
                "lead": {"status": "success", "lead": lead},
            }),
            UpsertOutcome::Existing { contact, lead } => json!({
                "status": self.status(),
                "contact": contact,
                "lead": {"status": "success", "lead": lead},
            }),
        }
    }
}

impl Serialize for UpsertOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_payload().serialize(serializer)
    }
}

/// What `push_to_crm` hands back over the bus. Failures are data, never faults.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum OperationResult {
    Pushed { crm_result: UpsertOutcome },
    Error { message: String },
}

impl OperationResult {
    pub fn error(message: impl Into<String>) -> Self {
        OperationResult::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, OperationResult::Error { .. })
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self)
            .unwrap_or_else(|e| json!({"status": "error", "message": e.to_string()}))
    }
}
