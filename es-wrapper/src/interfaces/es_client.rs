//! Version-neutral client and capability traits.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::engine::search::{MultiSearchResult, SearchResult, SearchSource};
use crate::errors::WrapperError;
use crate::types::{EsVersion, IndicesCreateResult};

/// Checks whether an index exists.
#[async_trait]
pub trait IndicesExistsService: Send + Sync {
    async fn send(&self) -> Result<bool, WrapperError>;
}

/// Creates an index.
#[async_trait]
pub trait IndicesCreateService: Send + Sync {
    /// Set the settings and mappings body. The last call wins.
    fn body(self, mapping: &str) -> Self
    where
        Self: Sized;

    async fn send(&self) -> Result<IndicesCreateResult, WrapperError>;
}

/// Queues a document for bulk indexing.
pub trait IndexService: Send + Sync {
    fn index(self, index: &str) -> Self
    where
        Self: Sized;

    fn doc_type(self, doc_type: &str) -> Self
    where
        Self: Sized;

    fn id(self, id: &str) -> Self
    where
        Self: Sized;

    fn body_json<T: Serialize>(self, body: &T) -> Self
    where
        Self: Sized;

    /// Push the configured document into the bulk buffer.
    ///
    /// Never waits on the network. A request the buffer refuses is logged
    /// and dropped.
    fn add(&self);
}

/// Builds and executes a single search.
#[async_trait]
pub trait SearchService: Send + Sync {
    fn doc_type(self, doc_type: &str) -> Self
    where
        Self: Sized;

    fn size(self, size: usize) -> Self
    where
        Self: Sized;

    fn aggregation(self, name: &str, aggregation: Value) -> Self
    where
        Self: Sized;

    fn ignore_unavailable(self, ignore_unavailable: bool) -> Self
    where
        Self: Sized;

    fn query(self, query: Value) -> Self
    where
        Self: Sized;

    async fn send(&self) -> Result<SearchResult, WrapperError>;
}

/// Builds and executes a batch of searches.
#[async_trait]
pub trait MultiSearchService: Send + Sync {
    fn add(self, requests: Vec<SearchSource>) -> Self
    where
        Self: Sized;

    fn index(self, indices: &[&str]) -> Self
    where
        Self: Sized;

    async fn send(&self) -> Result<MultiSearchResult, WrapperError>;
}

/// Version-neutral entry point to an Elasticsearch cluster.
///
/// Capability constructors perform no I/O; requests are issued only by the
/// returned service's `send` or `add`.
///
/// # Thread Safety
///
/// Implementations are shared between concurrent callers. The services they
/// return are plain values meant for a single call site.
#[async_trait]
pub trait EsClient: Send + Sync {
    type IndicesExists<'a>: IndicesExistsService
    where
        Self: 'a;
    type IndicesCreate<'a>: IndicesCreateService
    where
        Self: 'a;
    type Index<'a>: IndexService
    where
        Self: 'a;
    type Search<'a>: SearchService
    where
        Self: 'a;
    type MultiSearch<'a>: MultiSearchService
    where
        Self: 'a;

    /// Major version of the engine this client talks to.
    fn version(&self) -> EsVersion;

    fn index_exists(&self, index: &str) -> Self::IndicesExists<'_>;

    fn create_index(&self, index: &str) -> Self::IndicesCreate<'_>;

    fn index(&self) -> Self::Index<'_>;

    fn search(&self, indices: &[&str]) -> Self::Search<'_>;

    fn multi_search(&self) -> Self::MultiSearch<'_>;

    /// Commit everything queued in the bulk buffer.
    async fn flush(&self) -> Result<(), WrapperError>;

    /// Flush and release the bulk buffer. Safe to call more than once.
    async fn close(&self) -> Result<(), WrapperError>;
}
