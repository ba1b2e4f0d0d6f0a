//! Index existence and creation adapters.

use async_trait::async_trait;
use tracing::{debug, instrument};

use crate::engine::v6;
use crate::errors::WrapperError;
use crate::interfaces::{IndicesCreateService, IndicesExistsService};
use crate::types::IndicesCreateResult;
use crate::wrapper::client::{Backend, ClientWrapper};

/// Checks an index against whichever engine family the dispatcher holds.
#[derive(Clone)]
pub struct IndicesExistsAdapter<'a> {
    wrapper: &'a ClientWrapper,
    index: String,
}

impl<'a> IndicesExistsAdapter<'a> {
    pub(crate) fn new(wrapper: &'a ClientWrapper, index: &str) -> Self {
        Self {
            wrapper,
            index: index.to_string(),
        }
    }
}

#[async_trait]
impl IndicesExistsService for IndicesExistsAdapter<'_> {
    #[instrument(skip(self), fields(index = %self.index))]
    async fn send(&self) -> Result<bool, WrapperError> {
        let exists = match &self.wrapper.backend {
            Backend::V5 { client, .. } => client.index_exists(&self.index).await?,
            Backend::V6 { client, .. } | Backend::V7 { client, .. } => {
                client.index_exists(&self.index).await?
            }
        };
        debug!(index = %self.index, exists = exists, "Checked index existence");
        Ok(exists)
    }
}

/// Creates an index, translating the engine response into
/// [`IndicesCreateResult`].
#[derive(Clone)]
pub struct IndicesCreateAdapter<'a> {
    wrapper: &'a ClientWrapper,
    index: String,
    mapping: String,
}

impl<'a> IndicesCreateAdapter<'a> {
    pub(crate) fn new(wrapper: &'a ClientWrapper, index: &str) -> Self {
        Self {
            wrapper,
            index: index.to_string(),
            mapping: String::new(),
        }
    }

    async fn create_v6_family(
        client: &dyn v6::Client,
        request: v6::CreateIndexRequest,
    ) -> Result<IndicesCreateResult, WrapperError> {
        let response = client.create_index(&request).await?;
        Ok(IndicesCreateResult {
            acknowledged: response.acknowledged,
            shards_acknowledged: response.shards_acknowledged,
            index: Some(response.index),
        })
    }
}

#[async_trait]
impl IndicesCreateService for IndicesCreateAdapter<'_> {
    fn body(mut self, mapping: &str) -> Self {
        self.mapping = mapping.to_string();
        self
    }

    #[instrument(skip(self), fields(index = %self.index))]
    async fn send(&self) -> Result<IndicesCreateResult, WrapperError> {
        let result = match &self.wrapper.backend {
            Backend::V5 { client, .. } => {
                let response = client.create_index(&self.index, &self.mapping).await?;
                IndicesCreateResult {
                    acknowledged: response.acknowledged,
                    shards_acknowledged: response.shards_acknowledged,
                    index: None,
                }
            }
            Backend::V6 { client, .. } => {
                let request = v6::CreateIndexRequest::new(&self.index).body(&self.mapping);
                Self::create_v6_family(client.as_ref(), request).await?
            }
            Backend::V7 { client, .. } => {
                // v7 only accepts typed mappings when asked to.
                let request = v6::CreateIndexRequest::new(&self.index)
                    .body(&self.mapping)
                    .include_type_name(true);
                Self::create_v6_family(client.as_ref(), request).await?
            }
        };

        debug!(
            index = %self.index,
            acknowledged = result.acknowledged,
            shards_acknowledged = result.shards_acknowledged,
            "Created index"
        );
        Ok(result)
    }
}
