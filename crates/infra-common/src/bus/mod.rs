//! Service bus surface
//!
//! Services expose named operations that other services invoke remotely. A call carries a
//! mapping of named arguments and returns a mapping. [`BusServer`] serves registered
//! [`BusMethod`]s over HTTP; [`Registry`] announces the service to the discovery registry.

pub mod registry;
pub mod server;

pub use registry::{register_if_configured, Registry, ServiceDescriptor};
pub use server::{BusMethod, BusServer};
