//! Elasticsearch 5.x client family.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::bulk::{index_action_lines, BulkableRequest};
use crate::engine::search::SearchClient;
use crate::errors::EngineError;

/// Response of a v5 create-index call. v5 engines do not echo the index name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateIndexResponse {
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub shards_acknowledged: bool,
}

/// Index management for a v5 engine.
#[async_trait]
pub trait Client: SearchClient {
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError>;

    async fn create_index(
        &self,
        index: &str,
        body: &str,
    ) -> Result<CreateIndexResponse, EngineError>;
}

/// A bulk index action for a v5 engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkIndexRequest {
    index: String,
    doc_type: String,
    id: String,
    doc: Value,
}

impl BulkIndexRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index(mut self, index: &str) -> Self {
        self.index = index.to_string();
        self
    }

    pub fn doc_type(mut self, doc_type: &str) -> Self {
        self.doc_type = doc_type.to_string();
        self
    }

    pub fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn doc(mut self, doc: Value) -> Self {
        self.doc = doc;
        self
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    pub fn type_name(&self) -> &str {
        &self.doc_type
    }

    pub fn doc_id(&self) -> &str {
        &self.id
    }

    pub fn document(&self) -> &Value {
        &self.doc
    }
}

impl BulkableRequest for BulkIndexRequest {
    fn lines(&self) -> Vec<Value> {
        index_action_lines(&self.index, &self.doc_type, &self.id, &self.doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bulk_index_lines() {
        let request = BulkIndexRequest::new()
            .index("jaeger-span-2024-01-01")
            .doc_type("span")
            .id("abc")
            .doc(json!({ "traceID": "1" }));

        assert_eq!(
            request.lines(),
            vec![
                json!({ "index": { "_index": "jaeger-span-2024-01-01", "_type": "span", "_id": "abc" } }),
                json!({ "traceID": "1" }),
            ]
        );
    }

    #[test]
    fn test_create_response_ignores_index_field() {
        let response: CreateIndexResponse = serde_json::from_value(json!({
            "acknowledged": true,
            "shards_acknowledged": false,
            "index": "ignored"
        }))
        .unwrap();

        assert_eq!(
            response,
            CreateIndexResponse {
                acknowledged: true,
                shards_acknowledged: false
            }
        );
    }
}
