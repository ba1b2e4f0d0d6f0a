//! Search and multi-search adapters.
//!
//! Both are passthroughs over the native builders in
//! [`crate::engine::search`]; the same request shape serves every engine
//! family.

use async_trait::async_trait;
use serde_json::Value;
use tracing::instrument;

use crate::engine::search::{
    MultiSearchRequest, MultiSearchResult, SearchClient, SearchResult, SearchSource,
};
use crate::errors::WrapperError;
use crate::interfaces::{MultiSearchService, SearchService};

#[derive(Clone)]
pub struct SearchAdapter<'a> {
    client: &'a dyn SearchClient,
    source: SearchSource,
}

impl<'a> SearchAdapter<'a> {
    pub(crate) fn new(client: &'a dyn SearchClient, indices: &[&str]) -> Self {
        Self {
            client,
            source: SearchSource::new(indices),
        }
    }

    fn map(self, f: impl FnOnce(SearchSource) -> SearchSource) -> Self {
        Self {
            client: self.client,
            source: f(self.source),
        }
    }

    /// The request built so far.
    pub fn source(&self) -> &SearchSource {
        &self.source
    }
}

#[async_trait]
impl SearchService for SearchAdapter<'_> {
    fn doc_type(self, doc_type: &str) -> Self {
        self.map(|s| s.doc_type(doc_type))
    }

    fn size(self, size: usize) -> Self {
        self.map(|s| s.size(size))
    }

    fn aggregation(self, name: &str, aggregation: Value) -> Self {
        self.map(|s| s.aggregation(name, aggregation))
    }

    fn ignore_unavailable(self, ignore_unavailable: bool) -> Self {
        self.map(|s| s.ignore_unavailable(ignore_unavailable))
    }

    fn query(self, query: Value) -> Self {
        self.map(|s| s.query(query))
    }

    #[instrument(skip(self), fields(indices = ?self.source.indices()))]
    async fn send(&self) -> Result<SearchResult, WrapperError> {
        Ok(self.client.search(&self.source).await?)
    }
}

#[derive(Clone)]
pub struct MultiSearchAdapter<'a> {
    client: &'a dyn SearchClient,
    request: MultiSearchRequest,
}

impl<'a> MultiSearchAdapter<'a> {
    pub(crate) fn new(client: &'a dyn SearchClient) -> Self {
        Self {
            client,
            request: MultiSearchRequest::new(),
        }
    }

    /// The request built so far.
    pub fn request(&self) -> &MultiSearchRequest {
        &self.request
    }
}

#[async_trait]
impl MultiSearchService for MultiSearchAdapter<'_> {
    fn add(self, requests: Vec<SearchSource>) -> Self {
        Self {
            client: self.client,
            request: self.request.add(requests),
        }
    }

    fn index(self, indices: &[&str]) -> Self {
        Self {
            client: self.client,
            request: self.request.index(indices),
        }
    }

    #[instrument(skip(self), fields(requests = self.request.requests().len()))]
    async fn send(&self) -> Result<MultiSearchResult, WrapperError> {
        Ok(self.client.multi_search(&self.request).await?)
    }
}
