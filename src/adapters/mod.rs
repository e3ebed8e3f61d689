//! Adapters
//!
//! Inbound (HTTP) and outbound (store, upstream client) implementations.

pub mod inbound;
pub mod outbound;
