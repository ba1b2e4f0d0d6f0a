//! # Elasticsearch Wrapper
//!
//! One stable client interface over Elasticsearch 5, 6 and 7 for the span
//! storage backend. Index management, bulk span writes and trace searches go
//! through [`EsClient`]; [`ClientWrapper`] routes each call to the engine
//! family it was constructed for.

pub mod engine;
pub mod errors;
pub mod interfaces;
pub mod types;
pub mod wrapper;

pub use errors::{EngineError, WrapperError};
pub use interfaces::{
    EsClient, IndexService, IndicesCreateService, IndicesExistsService, MultiSearchService,
    SearchService,
};
pub use types::{EsVersion, IndicesCreateResult};
pub use wrapper::ClientWrapper;
