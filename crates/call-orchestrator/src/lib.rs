//! # Call Orchestrator
//!
//! Turns a "lead pushed to CRM" event into an outbound call, but only while the shared
//! telephony endpoint reports that no call is in progress.
//!
//! ## Gating
//!
//! The telephony endpoint is the only source of truth for "is a call active". Each
//! `start_call` reads its status once and places a call only on `idle`. The read and the
//! placement are two separate requests, so two events arriving together can both observe
//! `idle` and both dial. Enable `serialize_calls` to run the whole check-then-act sequence
//! under an in-process lock; that closes the window only when this process is the endpoint's
//! sole caller.
//!
//! When the status query itself fails the default [`StatusFailurePolicy::FailOpen`] treats the
//! endpoint as idle and dials anyway; [`StatusFailurePolicy::FailClosed`] skips the call.

pub mod config;
pub mod error;
pub mod gating;
pub mod request;
pub mod service;
pub mod telephony;

pub use config::CallOrchestratorConfig;
pub use error::{Result, TelephonyError};
pub use gating::{CallGatingOrchestrator, CallOutcome, StatusFailurePolicy};
pub use request::{normalize_number, CallRequest, MissingFields};
pub use service::StartCallMethod;
pub use telephony::{HttpTelephonyClient, TelephonyApi, TelephonyStatus};
