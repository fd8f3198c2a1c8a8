//! # Infra-Common - Shared plumbing for the leadbridge services
//!
//! This crate holds the pieces every leadbridge service needs but none of them owns:
//!
//! - [`errors`]: the common error type and error-context helpers
//! - [`logging`]: tracing subscriber setup (console + rotating file) and log contexts
//! - [`config`]: layered configuration loading (defaults, TOML file, environment)
//! - [`payload`]: flattening of nested event payloads into path-keyed scalars
//! - [`bus`]: the request/response service bus surface and the registry client
//!
//! The CRM connector and the call orchestrator build on top of these.

pub mod bus;
pub mod config;
pub mod errors;
pub mod logging;
pub mod payload;

pub use errors::types::{Error, Result};
pub use payload::{flatten, FlattenedEvent};
