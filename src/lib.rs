//! translate-pool Library
//!
//! This module exposes the translate-pool components for use in integration
//! tests and as a library.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

// Re-export commonly used types
pub use adapters::inbound::{build_router, ApiServer, ApiState};
pub use application::{DispatchConfig, DispatchError, Dispatcher, RegistryService};
pub use config::{load_config, Config};
pub use domain::entities::{EndpointRecord, EndpointStatus};
pub use domain::ports::{EndpointStore, TranslationUpstream};
pub use infrastructure::{FailureTracker, PoolCache, Prober};
