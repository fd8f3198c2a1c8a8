//! # CRM Connector
//!
//! Pushes an inbound lead into EspoCRM.
//!
//! Contacts are identity records deduplicated by phone number: an existing contact is reused
//! as-is, a missing one is created. Leads are interaction records: every push creates a new
//! lead whose name carries a creation timestamp, so repeated pushes for the same person never
//! collide.
//!
//! The crate is layered as:
//!
//! - [`api`]: the raw EspoCRM REST transport (`/api/v1/`, `X-Api-Key`, nested query encoding)
//! - [`client`]: the [`CrmApi`] seam and its EspoCRM implementation
//! - [`upsert`]: the find-or-create workflow behind the `push_to_crm` bus operation
//! - [`service`]: the bus method wiring

pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod naming;
pub mod service;
pub mod types;
pub mod upsert;

pub use client::{CrmApi, EspoCrmClient};
pub use config::CrmConnectorConfig;
pub use error::{CrmError, Result};
pub use naming::LeadNamer;
pub use service::PushToCrmMethod;
pub use types::{ContactLookup, ContactRecord, LeadRecord, NewLead, OperationResult, UpsertOutcome};
pub use upsert::LeadUpsertOrchestrator;
