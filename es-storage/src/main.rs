use std::env;

use serde_json::json;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use es_storage::{Dependencies, EsOptions, StorageError};
use es_wrapper::{EsClient, IndicesCreateService, IndicesExistsService};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match env::var("LOG_FORMAT").as_deref() {
        Ok("json") => builder.json().init(),
        _ => builder.init(),
    }
}

fn service_mapping() -> String {
    json!({
        "settings": {
            "index.number_of_shards": 5,
            "index.number_of_replicas": 1,
            "index.mapping.nested_fields.limit": 50,
            "index.requests.cache.enable": true
        },
        "mappings": {
            "service": {
                "properties": {
                    "serviceName": { "type": "keyword", "ignore_above": 256 },
                    "operationName": { "type": "keyword", "ignore_above": 256 }
                }
            }
        }
    })
    .to_string()
}

async fn ensure_service_index(deps: &Dependencies) -> Result<(), StorageError> {
    let index = format!("{}-service", deps.options.index_prefix);

    if deps.client.index_exists(&index).send().await? {
        info!(index = %index, "Service index already exists");
        return Ok(());
    }

    let result = deps
        .client
        .create_index(&index)
        .body(&service_mapping())
        .send()
        .await?;
    info!(
        index = %index,
        acknowledged = result.acknowledged,
        shards_acknowledged = result.shards_acknowledged,
        "Created service index"
    );
    Ok(())
}

async fn run() -> Result<(), StorageError> {
    let options = EsOptions::from_env()?;
    let deps = Dependencies::new(options).await?;

    ensure_service_index(&deps).await?;

    info!("Span storage ready, waiting for shutdown signal");
    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal, closing Elasticsearch client");

    deps.client.close().await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();

    if let Err(e) = run().await {
        error!(error = %e, "Span storage exited with error");
        std::process::exit(1);
    }
}
