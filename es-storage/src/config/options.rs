//! Connection and bulk options, read from the environment.

use std::env;
use std::time::Duration;

use es_wrapper::engine::BulkProcessorConfig;
use es_wrapper::EsVersion;

use crate::StorageError;

/// Default Elasticsearch URL.
const DEFAULT_SERVER_URL: &str = "http://localhost:9200";

/// Default prefix for index names.
const DEFAULT_INDEX_PREFIX: &str = "jaeger";

/// Options for connecting to Elasticsearch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EsOptions {
    /// Server URL.
    pub server_url: String,
    /// Engine major version. `None` means ask the server.
    pub version: Option<EsVersion>,
    /// Basic auth username.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Bulk buffer thresholds.
    pub bulk: BulkProcessorConfig,
    /// Prefix for index names.
    pub index_prefix: String,
}

impl Default for EsOptions {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            version: None,
            username: None,
            password: None,
            bulk: BulkProcessorConfig::default(),
            index_prefix: DEFAULT_INDEX_PREFIX.to_string(),
        }
    }
}

impl EsOptions {
    /// Read options from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `ES_SERVER_URL`: server URL (default: http://localhost:9200)
    /// - `ES_VERSION`: engine major version, 5, 6 or 7 (default: detected)
    /// - `ES_USERNAME` / `ES_PASSWORD`: basic auth, both or neither
    /// - `ES_BULK_ACTIONS`: actions per bulk commit (default: 1000)
    /// - `ES_BULK_SIZE`: bytes per bulk commit (default: 5000000)
    /// - `ES_BULK_FLUSH_INTERVAL_MS`: flush interval in ms (default: 200)
    /// - `ES_INDEX_PREFIX`: index name prefix (default: jaeger)
    pub fn from_env() -> Result<Self, StorageError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read options through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StorageError> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let defaults = Self::default();

        let version = match get("ES_VERSION") {
            Some(raw) => {
                let number: u8 = raw.trim().parse().map_err(|_| {
                    StorageError::config(format!("ES_VERSION is not a number: {:?}", raw))
                })?;
                Some(EsVersion::try_from(number)?)
            }
            None => None,
        };

        let username = get("ES_USERNAME");
        let password = get("ES_PASSWORD");
        if username.is_some() != password.is_some() {
            return Err(StorageError::config(
                "ES_USERNAME and ES_PASSWORD must be set together",
            ));
        }

        let bulk = BulkProcessorConfig {
            bulk_actions: parse_or(
                get("ES_BULK_ACTIONS"),
                "ES_BULK_ACTIONS",
                defaults.bulk.bulk_actions,
            )?,
            bulk_size_bytes: parse_or(
                get("ES_BULK_SIZE"),
                "ES_BULK_SIZE",
                defaults.bulk.bulk_size_bytes,
            )?,
            flush_interval: Duration::from_millis(parse_or(
                get("ES_BULK_FLUSH_INTERVAL_MS"),
                "ES_BULK_FLUSH_INTERVAL_MS",
                defaults.bulk.flush_interval.as_millis() as u64,
            )?),
        };

        Ok(Self {
            server_url: get("ES_SERVER_URL").unwrap_or(defaults.server_url),
            version,
            username,
            password,
            bulk,
            index_prefix: get("ES_INDEX_PREFIX").unwrap_or(defaults.index_prefix),
        })
    }

    /// Basic auth credentials, if configured.
    pub fn basic_auth(&self) -> Option<(&str, &str)> {
        match (&self.username, &self.password) {
            (Some(username), Some(password)) => Some((username.as_str(), password.as_str())),
            _ => None,
        }
    }
}

fn parse_or<T: std::str::FromStr>(
    raw: Option<String>,
    key: &str,
    default: T,
) -> Result<T, StorageError> {
    match raw {
        Some(raw) => raw.trim().parse().map_err(|_| {
            StorageError::config(format!("{} is not a valid number: {:?}", key, raw))
        }),
        None => Ok(default),
    }
}
