//! CRM client seam and its EspoCRM implementation

use async_trait::async_trait;
use reqwest::Method;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, info};

use crate::api::{where_query, EspoApi, WhereClause};
use crate::error::{CrmError, Result};
use crate::naming::{LeadNamer, DEFAULT_LEAD_NAME};
use crate::types::{ContactLookup, ContactRecord, LeadRecord, NewLead};

/// Operations the lead workflow needs from a CRM
#[async_trait]
pub trait CrmApi: Send + Sync {
    /// Exact-match lookup on the contact's phone number
    async fn find_contact_by_phone(&self, phone_number: &str) -> Result<ContactLookup>;

    async fn create_contact(
        &self,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
    ) -> Result<ContactRecord>;

    /// Create a lead; its name is always made unique with a creation timestamp
    async fn create_lead(&self, lead: NewLead) -> Result<LeadRecord>;
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default)]
    total: u64,
    #[serde(default = "Vec::new")]
    list: Vec<T>,
}

fn decode<T: serde::de::DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| CrmError::Decode(format!("{}: {}", what, e)))
}

/// [`CrmApi`] backed by the EspoCRM REST API
pub struct EspoCrmClient {
    api: EspoApi,
    namer: LeadNamer,
}

impl EspoCrmClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::from_api(EspoApi::new(base_url, api_key))
    }

    pub fn from_api(api: EspoApi) -> Self {
        Self {
            api,
            namer: LeadNamer::new(),
        }
    }
}

#[async_trait]
impl CrmApi for EspoCrmClient {
    async fn find_contact_by_phone(&self, phone_number: &str) -> Result<ContactLookup> {
        let query = where_query(&[WhereClause::equals("phoneNumber", phone_number)]);
        let body = self
            .api
            .request(Method::GET, "Contact", &query)
            .await
            .map_err(|e| {
                error!("Error fetching contact: {}", e);
                e
            })?;

        let response: ListResponse<ContactRecord> = decode(body, "contact list")?;
        info!("Found {} contact(s) for phone {}", response.total, phone_number);

        if response.total == 0 {
            return Ok(ContactLookup::NotFound);
        }

        match response.list.into_iter().next() {
            Some(contact) => Ok(ContactLookup::Found {
                contact,
                total: response.total,
            }),
            None => Err(CrmError::Decode(format!(
                "contact list reports {} match(es) but carries none",
                response.total
            ))),
        }
    }

    async fn create_contact(
        &self,
        first_name: &str,
        last_name: &str,
        phone_number: &str,
    ) -> Result<ContactRecord> {
        let payload = json!({
            "name": format!("{} {}", first_name, last_name),
            "firstName": first_name,
            "lastName": last_name,
            "phoneNumber": phone_number,
        });

        let body = self
            .api
            .request(Method::POST, "Contact", &payload)
            .await
            .map_err(|e| {
                error!("Failed to create contact: {}", e);
                e
            })?;

        let contact: ContactRecord = decode(body, "created contact")?;
        info!("Contact created: {}", contact.id);
        Ok(contact)
    }

    async fn create_lead(&self, mut lead: NewLead) -> Result<LeadRecord> {
        let base = lead.name.as_deref().unwrap_or(DEFAULT_LEAD_NAME);
        lead.name = Some(self.namer.next_name(base));

        let payload = serde_json::to_value(&lead).map_err(|e| CrmError::InvalidInput(e.to_string()))?;
        let body = self
            .api
            .request(Method::POST, "Lead", &payload)
            .await
            .map_err(|e| {
                error!("Failed to create lead: {}", e);
                e
            })?;

        let created: LeadRecord = decode(body, "created lead")?;
        info!(
            "Lead created: {} ({})",
            created.id,
            created.name.as_deref().unwrap_or("unnamed")
        );
        Ok(created)
    }
}
