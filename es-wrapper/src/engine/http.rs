//! HTTP engine client.
//!
//! Implements every engine family over the `opensearch` transport, which
//! speaks the same REST surface as Elasticsearch 5 through 7.

use async_trait::async_trait;
use opensearch::{
    auth::Credentials,
    http::{
        headers::HeaderMap,
        request::JsonBody,
        response::Response,
        transport::{SingleNodeConnectionPool, TransportBuilder},
        Method,
    },
    indices::IndicesExistsParts,
    BulkParts, MsearchParts, OpenSearch,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::engine::bulk::{BulkResponse, BulkSender};
use crate::engine::search::{
    MultiSearchRequest, MultiSearchResult, SearchClient, SearchResult, SearchSource,
};
use crate::engine::{v5, v6};
use crate::errors::EngineError;

#[derive(Serialize)]
struct CreateIndexParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    include_type_name: Option<bool>,
}

#[derive(Serialize)]
struct SearchParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    ignore_unavailable: Option<bool>,
}

/// Engine client speaking HTTP/JSON to a single node.
///
/// # Example
///
/// ```ignore
/// let client = HttpEngineClient::new("http://localhost:9200", None)?;
/// let version = client.ping().await?;
/// ```
pub struct HttpEngineClient {
    client: OpenSearch,
}

impl HttpEngineClient {
    /// Create a client for the given node URL, optionally with basic auth.
    pub fn new(url: &str, basic_auth: Option<(&str, &str)>) -> Result<Self, EngineError> {
        let parsed_url = Url::parse(url).map_err(|e| EngineError::transport(e.to_string()))?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);
        let mut builder = TransportBuilder::new(conn_pool).disable_proxy();
        if let Some((username, password)) = basic_auth {
            builder = builder.auth(Credentials::Basic(
                username.to_string(),
                password.to_string(),
            ));
        }
        let transport = builder
            .build()
            .map_err(|e| EngineError::transport(e.to_string()))?;

        info!(url = %url, auth = basic_auth.is_some(), "Created Elasticsearch HTTP client");

        Ok(Self {
            client: OpenSearch::new(transport),
        })
    }

    /// The version number the engine reports, e.g. `"6.8.23"`.
    #[instrument(skip(self))]
    pub async fn ping(&self) -> Result<String, EngineError> {
        let response = self
            .client
            .info()
            .send()
            .await
            .map_err(|e| EngineError::transport(e.to_string()))?;
        let info: Value = read_json(response).await?;

        info["version"]["number"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| EngineError::parse("missing version.number in ping response"))
    }

    async fn exists(&self, index: &str) -> Result<bool, EngineError> {
        let response = self
            .client
            .indices()
            .exists(IndicesExistsParts::Index(&[index]))
            .send()
            .await
            .map_err(|e| EngineError::transport(e.to_string()))?;

        match response.status_code().as_u16() {
            200 => Ok(true),
            404 => Ok(false),
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(EngineError::status(status, body))
            }
        }
    }

    #[instrument(skip(self, body))]
    async fn put_index(
        &self,
        index: &str,
        body: &str,
        include_type_name: Option<bool>,
    ) -> Result<Response, EngineError> {
        let body = (!body.is_empty()).then(|| body.to_string());
        self.client
            .send(
                Method::Put,
                &format!("/{}", index),
                HeaderMap::new(),
                Some(&CreateIndexParams { include_type_name }),
                body,
                None,
            )
            .await
            .map_err(|e| EngineError::transport(e.to_string()))
    }
}

/// Decode a successful response, or turn a failed one into a status error.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, EngineError> {
    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!(status = %status, body = %body, "Elasticsearch request failed");
        return Err(EngineError::status(status.as_u16(), body));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| EngineError::parse(e.to_string()))
}

/// `_search` path for the given indices and types.
fn search_path(indices: &[String], types: &[String]) -> String {
    match (indices.is_empty(), types.is_empty()) {
        (true, true) => "/_search".to_string(),
        (true, false) => format!("/_all/{}/_search", types.join(",")),
        (false, true) => format!("/{}/_search", indices.join(",")),
        (false, false) => format!("/{}/{}/_search", indices.join(","), types.join(",")),
    }
}

/// Major version from a reported version number such as `"7.10.2"`.
pub fn major_version(number: &str) -> Result<u8, EngineError> {
    number
        .split('.')
        .next()
        .and_then(|major| major.parse().ok())
        .ok_or_else(|| EngineError::parse(format!("invalid version number: {:?}", number)))
}

#[async_trait]
impl v5::Client for HttpEngineClient {
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError> {
        self.exists(index).await
    }

    async fn create_index(
        &self,
        index: &str,
        body: &str,
    ) -> Result<v5::CreateIndexResponse, EngineError> {
        let response = self.put_index(index, body, None).await?;
        read_json(response).await
    }
}

#[async_trait]
impl v6::Client for HttpEngineClient {
    async fn index_exists(&self, index: &str) -> Result<bool, EngineError> {
        self.exists(index).await
    }

    async fn create_index(
        &self,
        request: &v6::CreateIndexRequest,
    ) -> Result<v6::CreateIndexResponse, EngineError> {
        let include_type_name = request.include_type_name.then_some(true);
        let response = self
            .put_index(&request.index, &request.body, include_type_name)
            .await?;
        read_json(response).await
    }
}

#[async_trait]
impl SearchClient for HttpEngineClient {
    async fn search(&self, source: &SearchSource) -> Result<SearchResult, EngineError> {
        let path = search_path(source.indices(), source.types());
        debug!(path = %path, "Executing search");

        let response = self
            .client
            .send(
                Method::Post,
                &path,
                HeaderMap::new(),
                Some(&SearchParams {
                    ignore_unavailable: source.ignore_unavailable_flag(),
                }),
                Some(JsonBody::new(source.body())),
                None,
            )
            .await
            .map_err(|e| EngineError::transport(e.to_string()))?;
        read_json(response).await
    }

    async fn multi_search(
        &self,
        request: &MultiSearchRequest,
    ) -> Result<MultiSearchResult, EngineError> {
        let indices: Vec<&str> = request.indices().iter().map(String::as_str).collect();
        let parts = if indices.is_empty() {
            MsearchParts::None
        } else {
            MsearchParts::Index(&indices)
        };
        let body: Vec<JsonBody<Value>> =
            request.lines().into_iter().map(JsonBody::new).collect();

        debug!(requests = request.requests().len(), "Executing multi-search");

        let response = self
            .client
            .msearch(parts)
            .body(body)
            .send()
            .await
            .map_err(|e| EngineError::transport(e.to_string()))?;
        read_json(response).await
    }
}

#[async_trait]
impl BulkSender for HttpEngineClient {
    async fn bulk(&self, lines: Vec<Value>) -> Result<BulkResponse, EngineError> {
        let body: Vec<JsonBody<Value>> = lines.into_iter().map(JsonBody::new).collect();

        let response = self
            .client
            .bulk(BulkParts::None)
            .body(body)
            .send()
            .await
            .map_err(|e| EngineError::transport(e.to_string()))?;
        read_json(response).await
    }
}
