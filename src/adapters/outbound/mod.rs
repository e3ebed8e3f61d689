mod memory_endpoint_store;
mod reqwest_upstream;
mod sqlite_endpoint_store;

pub use memory_endpoint_store::MemoryEndpointStore;
pub use reqwest_upstream::ReqwestUpstream;
pub use sqlite_endpoint_store::SqliteEndpointStore;
