//! Native search and multi-search types.
//!
//! Query and aggregation bodies are opaque JSON; building them is the
//! caller's business.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::EngineError;

/// A single search request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSource {
    indices: Vec<String>,
    types: Vec<String>,
    size: Option<usize>,
    aggregations: Map<String, Value>,
    ignore_unavailable: Option<bool>,
    query: Option<Value>,
}

impl SearchSource {
    /// Create a search request over the given indices.
    pub fn new<S: AsRef<str>>(indices: &[S]) -> Self {
        Self {
            indices: indices.iter().map(|i| i.as_ref().to_string()).collect(),
            ..Default::default()
        }
    }

    /// Restrict the search to a document type.
    pub fn doc_type(mut self, doc_type: &str) -> Self {
        self.types.push(doc_type.to_string());
        self
    }

    /// Set the maximum number of hits to return.
    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    /// Add a named aggregation. A later aggregation with the same name wins.
    pub fn aggregation(mut self, name: &str, aggregation: Value) -> Self {
        self.aggregations.insert(name.to_string(), aggregation);
        self
    }

    /// Whether missing or closed indices are ignored.
    pub fn ignore_unavailable(mut self, ignore_unavailable: bool) -> Self {
        self.ignore_unavailable = Some(ignore_unavailable);
        self
    }

    /// Set the query.
    pub fn query(mut self, query: Value) -> Self {
        self.query = Some(query);
        self
    }

    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn ignore_unavailable_flag(&self) -> Option<bool> {
        self.ignore_unavailable
    }

    /// The JSON request body.
    pub fn body(&self) -> Value {
        let mut body = Map::new();
        if let Some(ref query) = self.query {
            body.insert("query".to_string(), query.clone());
        }
        if let Some(size) = self.size {
            body.insert("size".to_string(), json!(size));
        }
        if !self.aggregations.is_empty() {
            body.insert(
                "aggregations".to_string(),
                Value::Object(self.aggregations.clone()),
            );
        }
        Value::Object(body)
    }

    /// The `_msearch` header line for this request.
    fn header(&self) -> Value {
        let mut header = Map::new();
        if !self.indices.is_empty() {
            header.insert("index".to_string(), json!(self.indices));
        }
        if !self.types.is_empty() {
            header.insert("type".to_string(), json!(self.types));
        }
        if let Some(ignore) = self.ignore_unavailable {
            header.insert("ignore_unavailable".to_string(), json!(ignore));
        }
        Value::Object(header)
    }
}

/// A batch of search requests executed in one round trip.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiSearchRequest {
    indices: Vec<String>,
    requests: Vec<SearchSource>,
}

impl MultiSearchRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append requests to the batch.
    pub fn add(mut self, requests: impl IntoIterator<Item = SearchSource>) -> Self {
        self.requests.extend(requests);
        self
    }

    /// Default indices for requests that name none.
    pub fn index<S: AsRef<str>>(mut self, indices: &[S]) -> Self {
        self.indices
            .extend(indices.iter().map(|i| i.as_ref().to_string()));
        self
    }

    pub fn indices(&self) -> &[String] {
        &self.indices
    }

    pub fn requests(&self) -> &[SearchSource] {
        &self.requests
    }

    /// NDJSON lines: one header and one body per request.
    pub fn lines(&self) -> Vec<Value> {
        self.requests
            .iter()
            .flat_map(|request| [request.header(), request.body()])
            .collect()
    }
}

/// Total hit count. Pre-v7 engines report a bare number, v7 an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TotalHits {
    Count(u64),
    Object { value: u64, relation: String },
}

impl TotalHits {
    pub fn value(&self) -> u64 {
        match self {
            Self::Count(value) | Self::Object { value, .. } => *value,
        }
    }
}

impl Default for TotalHits {
    fn default() -> Self {
        Self::Count(0)
    }
}

/// A single search hit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "_index", default)]
    pub index: String,
    #[serde(rename = "_type", default, skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHits {
    #[serde(default)]
    pub total: TotalHits,
    #[serde(default)]
    pub max_score: Option<f64>,
    #[serde(default)]
    pub hits: Vec<SearchHit>,
}

/// Response of a search request, as reported by the engine.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub timed_out: bool,
    #[serde(default)]
    pub hits: SearchHits,
    #[serde(default)]
    pub aggregations: Option<Map<String, Value>>,
    /// Set on failed entries of a multi-search response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
}

/// Response of a multi-search request, one entry per request in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MultiSearchResult {
    #[serde(default)]
    pub responses: Vec<SearchResult>,
}

/// Search operations shared by every engine family.
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, source: &SearchSource) -> Result<SearchResult, EngineError>;

    async fn multi_search(
        &self,
        request: &MultiSearchRequest,
    ) -> Result<MultiSearchResult, EngineError>;
}
