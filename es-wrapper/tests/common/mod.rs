//! Fake engine clients and bulk buffers shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use es_wrapper::engine::bulk::BulkBuffer;
use es_wrapper::engine::search::{
    MultiSearchRequest, MultiSearchResult, SearchClient, SearchResult, SearchSource,
};
use es_wrapper::engine::{v5, v6};
use es_wrapper::EngineError;

/// Records search calls and answers with canned results.
#[derive(Default)]
pub struct SearchRecorder {
    pub searches: Mutex<Vec<SearchSource>>,
    pub multi_searches: Mutex<Vec<MultiSearchRequest>>,
    pub took: u64,
}

impl SearchRecorder {
    fn search(&self, source: &SearchSource) -> Result<SearchResult, EngineError> {
        self.searches.lock().unwrap().push(source.clone());
        Ok(SearchResult {
            took: self.took,
            ..Default::default()
        })
    }

    fn multi_search(
        &self,
        request: &MultiSearchRequest,
    ) -> Result<MultiSearchResult, EngineError> {
        self.multi_searches.lock().unwrap().push(request.clone());
        Ok(MultiSearchResult {
            responses: vec![SearchResult::default(); request.requests().len()],
        })
    }
}

/// A v5 client returning a fixed create response.
#[derive(Default)]
pub struct FakeV5Client {
    pub exists: bool,
    pub create_response: v5::CreateIndexResponse,
    pub create_error: Option<EngineError>,
    pub exists_calls: Mutex<Vec<String>>,
    pub create_calls: Mutex<Vec<(String, String)>>,
    pub search: SearchRecorder,
}

#[async_trait]
impl v5::Client for FakeV5Client {
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError> {
        self.exists_calls.lock().unwrap().push(index.to_string());
        Ok(self.exists)
    }

    async fn create_index(
        &self,
        index: &str,
        body: &str,
    ) -> Result<v5::CreateIndexResponse, EngineError> {
        self.create_calls
            .lock()
            .unwrap()
            .push((index.to_string(), body.to_string()));
        match &self.create_error {
            Some(e) => Err(e.clone()),
            None => Ok(self.create_response.clone()),
        }
    }
}

#[async_trait]
impl SearchClient for FakeV5Client {
    async fn search(&self, source: &SearchSource) -> Result<SearchResult, EngineError> {
        self.search.search(source)
    }

    async fn multi_search(
        &self,
        request: &MultiSearchRequest,
    ) -> Result<MultiSearchResult, EngineError> {
        self.search.multi_search(request)
    }
}

/// A v6-family client that records every create request it receives.
#[derive(Default)]
pub struct FakeV6Client {
    pub exists: bool,
    pub create_error: Option<EngineError>,
    pub exists_calls: Mutex<Vec<String>>,
    pub create_calls: Mutex<Vec<v6::CreateIndexRequest>>,
    pub search: SearchRecorder,
}

impl FakeV6Client {
    pub fn last_create(&self) -> v6::CreateIndexRequest {
        self.create_calls
            .lock()
            .unwrap()
            .last()
            .cloned()
            .expect("no create call recorded")
    }
}

#[async_trait]
impl v6::Client for FakeV6Client {
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError> {
        self.exists_calls.lock().unwrap().push(index.to_string());
        Ok(self.exists)
    }

    async fn create_index(
        &self,
        request: &v6::CreateIndexRequest,
    ) -> Result<v6::CreateIndexResponse, EngineError> {
        self.create_calls.lock().unwrap().push(request.clone());
        if let Some(e) = &self.create_error {
            return Err(e.clone());
        }
        Ok(v6::CreateIndexResponse {
            acknowledged: true,
            shards_acknowledged: true,
            index: request.index.clone(),
        })
    }
}

#[async_trait]
impl SearchClient for FakeV6Client {
    async fn search(&self, source: &SearchSource) -> Result<SearchResult, EngineError> {
        self.search.search(source)
    }

    async fn multi_search(
        &self,
        request: &MultiSearchRequest,
    ) -> Result<MultiSearchResult, EngineError> {
        self.search.multi_search(request)
    }
}

/// A deterministic bulk buffer: requests stay pending until flushed.
pub struct FakeBulk<R> {
    pub pending: Mutex<Vec<R>>,
    pub committed: Mutex<Vec<R>>,
    pub flushes: AtomicUsize,
    pub closes: AtomicUsize,
    pub close_error: Option<EngineError>,
    closed: AtomicBool,
}

impl<R> Default for FakeBulk<R> {
    fn default() -> Self {
        Self {
            pending: Mutex::new(Vec::new()),
            committed: Mutex::new(Vec::new()),
            flushes: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            close_error: None,
            closed: AtomicBool::new(false),
        }
    }
}

impl<R> FakeBulk<R> {
    pub fn failing_close(error: EngineError) -> Self {
        Self {
            close_error: Some(error),
            ..Default::default()
        }
    }

    pub fn pending_len(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    pub fn committed_len(&self) -> usize {
        self.committed.lock().unwrap().len()
    }

    fn commit(&self) {
        let mut pending = self.pending.lock().unwrap();
        self.committed.lock().unwrap().append(&mut pending);
    }
}

#[async_trait]
impl<R: Send + 'static> BulkBuffer<R> for FakeBulk<R> {
    fn add(&self, request: R) -> Result<(), EngineError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(EngineError::BulkClosed);
        }
        self.pending.lock().unwrap().push(request);
        Ok(())
    }

    async fn flush(&self) -> Result<(), EngineError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        self.commit();
        Ok(())
    }

    async fn close(&self) -> Result<(), EngineError> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        self.closed.store(true, Ordering::SeqCst);
        self.commit();
        match &self.close_error {
            Some(e) => Err(e.clone()),
            None => Ok(()),
        }
    }
}
