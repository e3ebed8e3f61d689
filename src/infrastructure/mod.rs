//! Infrastructure Layer
//!
//! In-memory pool state, probing and process lifecycle.

pub mod failure_tracker;
pub mod pool_cache;
pub mod prober;
pub mod shutdown;

pub use failure_tracker::FailureTracker;
pub use pool_cache::PoolCache;
pub use prober::{ProbeConfig, Prober};
pub use shutdown::{shutdown_signal, ShutdownController};
