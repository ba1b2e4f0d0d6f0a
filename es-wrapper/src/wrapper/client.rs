//! The version dispatcher.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::engine::bulk::BulkBuffer;
use crate::engine::search::SearchClient;
use crate::engine::{v5, v6};
use crate::errors::WrapperError;
use crate::interfaces::EsClient;
use crate::types::EsVersion;
use crate::wrapper::index::IndexAdapter;
use crate::wrapper::indices::{IndicesCreateAdapter, IndicesExistsAdapter};
use crate::wrapper::search::{MultiSearchAdapter, SearchAdapter};

/// Bulk buffer for v5 index requests.
pub type V5Bulk = Arc<dyn BulkBuffer<v5::BulkIndexRequest>>;
/// Bulk buffer for v6-family index requests.
pub type V6Bulk = Arc<dyn BulkBuffer<v6::BulkIndexRequest>>;

/// The single client/bulk-buffer pair bound to a dispatcher.
#[derive(Clone)]
pub(crate) enum Backend {
    V5 {
        client: Arc<dyn v5::Client>,
        bulk: V5Bulk,
    },
    V6 {
        client: Arc<dyn v6::Client>,
        bulk: V6Bulk,
    },
    V7 {
        client: Arc<dyn v6::Client>,
        bulk: V6Bulk,
    },
}

/// Routes every capability call to the engine family it was built for.
///
/// Cloning is cheap and clones share the client, the bulk buffer and the
/// closed state.
///
/// # Example
///
/// ```ignore
/// let client = Arc::new(HttpEngineClient::new("http://localhost:9200", None)?);
/// let bulk = Arc::new(BulkProcessor::start(client.clone(), BulkProcessorConfig::default()));
/// let es = ClientWrapper::wrap_v7(client, bulk);
///
/// if !es.index_exists("jaeger-service").send().await? {
///     es.create_index("jaeger-service").body(mapping).send().await?;
/// }
/// es.close().await?;
/// ```
#[derive(Clone)]
pub struct ClientWrapper {
    pub(crate) backend: Backend,
    pub(crate) search: Arc<dyn SearchClient>,
    closed: Arc<AtomicBool>,
}

impl ClientWrapper {
    /// Wrap a v5 client and its bulk buffer.
    pub fn wrap_v5<C>(client: Arc<C>, bulk: V5Bulk) -> Self
    where
        C: v5::Client + 'static,
    {
        let search: Arc<dyn SearchClient> = client.clone();
        Self::new(Backend::V5 { client, bulk }, search)
    }

    /// Wrap a v6 client and its bulk buffer.
    pub fn wrap_v6<C>(client: Arc<C>, bulk: V6Bulk) -> Self
    where
        C: v6::Client + 'static,
    {
        let search: Arc<dyn SearchClient> = client.clone();
        Self::new(Backend::V6 { client, bulk }, search)
    }

    /// Wrap a v6-family client talking to a v7 engine, and its bulk buffer.
    pub fn wrap_v7<C>(client: Arc<C>, bulk: V6Bulk) -> Self
    where
        C: v6::Client + 'static,
    {
        let search: Arc<dyn SearchClient> = client.clone();
        Self::new(Backend::V7 { client, bulk }, search)
    }

    fn new(backend: Backend, search: Arc<dyn SearchClient>) -> Self {
        let wrapper = Self {
            backend,
            search,
            closed: Arc::new(AtomicBool::new(false)),
        };
        info!(version = %wrapper.version(), "Wrapped Elasticsearch client");
        wrapper
    }

    /// Whether `close` has already run.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[async_trait]
impl EsClient for ClientWrapper {
    type IndicesExists<'a> = IndicesExistsAdapter<'a>;
    type IndicesCreate<'a> = IndicesCreateAdapter<'a>;
    type Index<'a> = IndexAdapter<'a>;
    type Search<'a> = SearchAdapter<'a>;
    type MultiSearch<'a> = MultiSearchAdapter<'a>;

    fn version(&self) -> EsVersion {
        match self.backend {
            Backend::V5 { .. } => EsVersion::V5,
            Backend::V6 { .. } => EsVersion::V6,
            Backend::V7 { .. } => EsVersion::V7,
        }
    }

    fn index_exists(&self, index: &str) -> IndicesExistsAdapter<'_> {
        IndicesExistsAdapter::new(self, index)
    }

    fn create_index(&self, index: &str) -> IndicesCreateAdapter<'_> {
        IndicesCreateAdapter::new(self, index)
    }

    fn index(&self) -> IndexAdapter<'_> {
        IndexAdapter::new(self)
    }

    fn search(&self, indices: &[&str]) -> SearchAdapter<'_> {
        SearchAdapter::new(self.search.as_ref(), indices)
    }

    fn multi_search(&self) -> MultiSearchAdapter<'_> {
        MultiSearchAdapter::new(self.search.as_ref())
    }

    async fn flush(&self) -> Result<(), WrapperError> {
        if self.is_closed() {
            return Ok(());
        }
        match &self.backend {
            Backend::V5 { bulk, .. } => bulk.flush().await?,
            Backend::V6 { bulk, .. } | Backend::V7 { bulk, .. } => bulk.flush().await?,
        }
        Ok(())
    }

    async fn close(&self) -> Result<(), WrapperError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!(version = %self.version(), "Elasticsearch client already closed");
            return Ok(());
        }

        let result = match &self.backend {
            Backend::V5 { bulk, .. } => bulk.close().await,
            Backend::V6 { bulk, .. } | Backend::V7 { bulk, .. } => bulk.close().await,
        };

        match result {
            Ok(()) => {
                info!(version = %self.version(), "Closed Elasticsearch client");
                Ok(())
            }
            Err(e) => {
                error!(version = %self.version(), error = %e, "Failed to close bulk buffer");
                Err(WrapperError::Close(e))
            }
        }
    }
}
