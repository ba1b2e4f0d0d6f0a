//! Underlying engine clients.
//!
//! Each engine family exposes its own native request and response types.
//! The v5 family is incompatible with the v6 family, which also serves v7
//! engines. The dispatcher in [`crate::wrapper`] is the only code that knows
//! about both.

pub mod bulk;
pub mod http;
pub mod search;
pub mod v5;
pub mod v6;

pub use bulk::{
    BulkBuffer, BulkProcessor, BulkProcessorConfig, BulkResponse, BulkSender, BulkableRequest,
};
pub use http::HttpEngineClient;
pub use search::{
    MultiSearchRequest, MultiSearchResult, SearchClient, SearchHit, SearchHits, SearchResult,
    SearchSource, TotalHits,
};
