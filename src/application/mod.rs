//! Application Layer
//!
//! Use cases orchestrating the domain, ports and infrastructure.

pub mod dispatcher;
pub mod registry_service;

pub use dispatcher::{DispatchConfig, DispatchError, Dispatcher};
pub use registry_service::{PruneReport, RegistryError, RegistryService};
