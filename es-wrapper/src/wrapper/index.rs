//! Bulk indexing adapter.

use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

use crate::engine::{v5, v6};
use crate::interfaces::{EsClient, IndexService};
use crate::wrapper::client::{Backend, ClientWrapper};

/// Builds one bulk index action and pushes it into the dispatcher's buffer.
///
/// Each fluent call returns an updated copy, so `add` always sees the
/// coordinates configured on the value it is called on.
#[derive(Clone)]
pub struct IndexAdapter<'a> {
    wrapper: &'a ClientWrapper,
    index: String,
    doc_type: String,
    id: String,
    body: Value,
}

impl<'a> IndexAdapter<'a> {
    pub(crate) fn new(wrapper: &'a ClientWrapper) -> Self {
        Self {
            wrapper,
            index: String::new(),
            doc_type: String::new(),
            id: String::new(),
            body: Value::Null,
        }
    }
}

impl IndexService for IndexAdapter<'_> {
    fn index(mut self, index: &str) -> Self {
        self.index = index.to_string();
        self
    }

    fn doc_type(mut self, doc_type: &str) -> Self {
        self.doc_type = doc_type.to_string();
        self
    }

    fn id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    fn body_json<T: Serialize>(mut self, body: &T) -> Self {
        match serde_json::to_value(body) {
            Ok(value) => self.body = value,
            Err(e) => warn!(error = %e, index = %self.index, "Failed to serialize document body"),
        }
        self
    }

    fn add(&self) {
        let result = match &self.wrapper.backend {
            Backend::V5 { bulk, .. } => bulk.add(
                v5::BulkIndexRequest::new()
                    .index(&self.index)
                    .doc_type(&self.doc_type)
                    .id(&self.id)
                    .doc(self.body.clone()),
            ),
            Backend::V6 { bulk, .. } | Backend::V7 { bulk, .. } => bulk.add(
                v6::BulkIndexRequest::new()
                    .index(&self.index)
                    .doc_type(&self.doc_type)
                    .id(&self.id)
                    .doc(self.body.clone()),
            ),
        };

        if let Err(e) = result {
            error!(
                version = %self.wrapper.version(),
                index = %self.index,
                id = %self.id,
                error = %e,
                "Dropped bulk index request"
            );
        }
    }
}
