mod endpoint_store;
mod translation_upstream;

pub use endpoint_store::{EndpointMap, EndpointStore, StoreError};
pub use translation_upstream::{TranslationUpstream, UpstreamError};
