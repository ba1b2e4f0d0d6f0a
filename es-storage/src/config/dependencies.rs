//! Dependency initialization and wiring for the storage backend.

use std::sync::Arc;

use tracing::info;

use crate::config::EsOptions;
use crate::StorageError;
use es_wrapper::engine::http::major_version;
use es_wrapper::engine::{
    v5, v6, BulkProcessor, BulkProcessorConfig, BulkSender, HttpEngineClient,
};
use es_wrapper::{ClientWrapper, EsClient, EsVersion};

/// Container for all initialized dependencies.
pub struct Dependencies {
    /// The version-neutral Elasticsearch client.
    pub client: ClientWrapper,
    /// The options the client was built from.
    pub options: EsOptions,
}

impl Dependencies {
    /// Connect to Elasticsearch and start the bulk buffer.
    ///
    /// When no version is configured the server is pinged and its reported
    /// major version is used. Must run inside a tokio runtime.
    ///
    /// # Returns
    ///
    /// * `Ok(Dependencies)` - Initialized dependencies
    /// * `Err(StorageError)` - If the client cannot be created, the server
    ///   cannot be reached for detection, or it runs an unsupported version
    pub async fn new(options: EsOptions) -> Result<Self, StorageError> {
        info!(
            server_url = %options.server_url,
            version = ?options.version.map(EsVersion::number),
            "Initializing dependencies"
        );

        let engine = Arc::new(HttpEngineClient::new(
            &options.server_url,
            options.basic_auth(),
        )?);

        let version = match options.version {
            Some(version) => version,
            None => detect_version(&engine).await?,
        };

        let client = build_client(version, engine, options.bulk.clone());
        info!(version = %client.version(), "Elasticsearch client ready");

        Ok(Self { client, options })
    }
}

/// Ask the server which major version it runs.
pub async fn detect_version(engine: &HttpEngineClient) -> Result<EsVersion, StorageError> {
    let number = engine.ping().await?;
    let version = EsVersion::try_from(major_version(&number)?)?;
    info!(reported = %number, version = %version, "Detected Elasticsearch version");
    Ok(version)
}

/// Bind an engine client and a fresh bulk processor for `version`.
pub fn build_client<C>(
    version: EsVersion,
    engine: Arc<C>,
    bulk: BulkProcessorConfig,
) -> ClientWrapper
where
    C: v5::Client + v6::Client + BulkSender + 'static,
{
    let sender: Arc<dyn BulkSender> = engine.clone();
    match version {
        EsVersion::V5 => {
            let processor = BulkProcessor::<v5::BulkIndexRequest>::start(sender, bulk);
            ClientWrapper::wrap_v5(engine, Arc::new(processor))
        }
        EsVersion::V6 => {
            let processor = BulkProcessor::<v6::BulkIndexRequest>::start(sender, bulk);
            ClientWrapper::wrap_v6(engine, Arc::new(processor))
        }
        EsVersion::V7 => {
            let processor = BulkProcessor::<v6::BulkIndexRequest>::start(sender, bulk);
            ClientWrapper::wrap_v7(engine, Arc::new(processor))
        }
    }
}
