//! Capability interfaces exposed to the storage backend.
//!
//! Span writers, readers and index management depend on these traits only,
//! never on the engine version behind them.

mod es_client;

pub use es_client::{
    EsClient, IndexService, IndicesCreateService, IndicesExistsService, MultiSearchService,
    SearchService,
};
