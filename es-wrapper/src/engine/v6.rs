//! Elasticsearch 6.x client family. v7 engines are driven through the same
//! client with `include_type_name` set on index creation.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::engine::bulk::{index_action_lines, BulkableRequest};
use crate::engine::search::SearchClient;
use crate::errors::EngineError;

/// A create-index call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateIndexRequest {
    pub index: String,
    pub body: String,
    /// Ask a v7 engine to accept mappings keyed by document type.
    pub include_type_name: bool,
}

impl CreateIndexRequest {
    pub fn new(index: &str) -> Self {
        Self {
            index: index.to_string(),
            ..Default::default()
        }
    }

    pub fn body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    pub fn include_type_name(mut self, include_type_name: bool) -> Self {
        self.include_type_name = include_type_name;
        self
    }
}

/// Response of a v6/v7 create-index call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CreateIndexResponse {
    #[serde(default)]
    pub acknowledged: bool,
    #[serde(default)]
    pub shards_acknowledged: bool,
    #[serde(default)]
    pub index: String,
}

/// Index management for a v6 or v7 engine.
#[async_trait]
pub trait Client: SearchClient {
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError>;

    async fn create_index(
        &self,
        request: &CreateIndexRequest,
    ) -> Result<CreateIndexResponse, EngineError>;
}

/// A bulk index action for a v6 or v7 engine.
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
    fn test_create_request_defaults_to_no_type_name() {
        let request = CreateIndexRequest::new("jaeger-service").body("{}");
        assert_eq!(request.index, "jaeger-service");
        assert_eq!(request.body, "{}");
        assert!(!request.include_type_name);
        assert!(request.include_type_name(true).include_type_name);
    }

    #[test]
    fn test_bulk_index_lines_without_type_or_id() {
        let request = BulkIndexRequest::new()
            .index("jaeger-span-write")
            .doc(json!({ "spanID": "2" }));

        assert_eq!(
            request.lines(),
            vec![
                json!({ "index": { "_index": "jaeger-span-write" } }),
                json!({ "spanID": "2" }),
            ]
        );
    }

    #[test]
    fn test_create_response_reads_index() {
        let response: CreateIndexResponse = serde_json::from_value(json!({
            "acknowledged": true,
            "shards_acknowledged": true,
            "index": "jaeger-span-000001"
        }))
        .unwrap();

        assert_eq!(response.index, "jaeger-span-000001");
    }
}
