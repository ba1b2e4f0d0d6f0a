//! Buffered bulk writes.
//!
//! A [`BulkProcessor`] owns a background worker that accumulates index
//! actions and commits them to the engine in batches. The worker commits
//! when the batch reaches a configured action count or byte size, when the
//! flush interval elapses, and whenever a flush or close is requested.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::errors::EngineError;

/// A request that can be rendered as bulk NDJSON lines.
pub trait BulkableRequest: Send + 'static {
    /// The action line followed by its source line, if any.
    fn lines(&self) -> Vec<Value>;
}

/// Render an `index` action. Empty type and id are left out.
pub(crate) fn index_action_lines(
    index: &str,
    doc_type: &str,
    id: &str,
    doc: &Value,
) -> Vec<Value> {
    let mut meta = Map::new();
    meta.insert("_index".to_string(), json!(index));
    if !doc_type.is_empty() {
        meta.insert("_type".to_string(), json!(doc_type));
    }
    if !id.is_empty() {
        meta.insert("_id".to_string(), json!(id));
    }
    vec![json!({ "index": meta }), doc.clone()]
}

/// Response of a `_bulk` call.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BulkResponse {
    #[serde(default)]
    pub took: u64,
    #[serde(default)]
    pub errors: bool,
    #[serde(default)]
    pub items: Vec<Value>,
}

impl BulkResponse {
    /// Number of items the engine rejected.
    pub fn failed_items(&self) -> usize {
        self.items
            .iter()
            .filter(|item| {
                item.as_object()
                    .and_then(|actions| actions.values().next())
                    .and_then(|result| result.get("error"))
                    .is_some()
            })
            .count()
    }
}

/// Sends a rendered bulk body to the engine.
#[async_trait]
pub trait BulkSender: Send + Sync {
    async fn bulk(&self, lines: Vec<Value>) -> Result<BulkResponse, EngineError>;
}

/// A buffered accumulator of bulk requests.
///
/// `add` must never wait on the network. Requests added to the same buffer
/// are committed in the order they were added.
#[async_trait]
pub trait BulkBuffer<R>: Send + Sync {
    /// Queue a request. Fails only if the buffer no longer accepts requests.
    fn add(&self, request: R) -> Result<(), EngineError>;

    /// Commit everything queued so far.
    async fn flush(&self) -> Result<(), EngineError>;

    /// Commit everything queued and release the buffer. Later calls are no-ops.
    async fn close(&self) -> Result<(), EngineError>;
}

/// Configuration for a [`BulkProcessor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkProcessorConfig {
    /// Number of actions that triggers a commit.
    pub bulk_actions: usize,
    /// Estimated body size in bytes that triggers a commit.
    pub bulk_size_bytes: usize,
    /// Maximum time a partial batch waits before being committed.
    pub flush_interval: Duration,
}

impl Default for BulkProcessorConfig {
    fn default() -> Self {
        Self {
            bulk_actions: 1000,
            bulk_size_bytes: 5_000_000,
            flush_interval: Duration::from_millis(200),
        }
    }
}

enum Command<R> {
    Add(R),
    Flush(oneshot::Sender<Result<(), EngineError>>),
    Close(oneshot::Sender<Result<(), EngineError>>),
}

/// Bulk buffer backed by a tokio worker task.
pub struct BulkProcessor<R> {
    tx: mpsc::UnboundedSender<Command<R>>,
    closed: AtomicBool,
}

impl<R: BulkableRequest> BulkProcessor<R> {
    /// Spawn the worker on the current tokio runtime.
    pub fn start(sender: Arc<dyn BulkSender>, config: BulkProcessorConfig) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();

        info!(
            bulk_actions = config.bulk_actions,
            bulk_size_bytes = config.bulk_size_bytes,
            flush_interval_ms = config.flush_interval.as_millis() as u64,
            "Started bulk processor"
        );

        tokio::spawn(run_worker(sender, config, rx));

        Self {
            tx,
            closed: AtomicBool::new(false),
        }
    }

    async fn request(
        &self,
        command: impl FnOnce(oneshot::Sender<Result<(), EngineError>>) -> Command<R>,
    ) -> Result<(), EngineError> {
        let (ack, done) = oneshot::channel();
        self.tx
            .send(command(ack))
            .map_err(|_| EngineError::BulkClosed)?;
        done.await.map_err(|_| EngineError::BulkClosed)?
    }
}

#[async_trait]
impl<R: BulkableRequest> BulkBuffer<R> for BulkProcessor<R> {
    fn add(&self, request: R) -> Result<(), EngineError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(EngineError::BulkClosed);
        }
        self.tx
            .send(Command::Add(request))
            .map_err(|_| EngineError::BulkClosed)
    }

    async fn flush(&self) -> Result<(), EngineError> {
        if self.closed.load(Ordering::Acquire) {
            return Ok(());
        }
        self.request(Command::Flush).await
    }

    async fn close(&self) -> Result<(), EngineError> {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!("Bulk processor already closed");
            return Ok(());
        }
        let result = self.request(Command::Close).await;
        info!(ok = result.is_ok(), "Closed bulk processor");
        result
    }
}

#[derive(Default)]
struct PendingBatch {
    lines: Vec<Value>,
    actions: usize,
    bytes: usize,
}

impl PendingBatch {
    fn push(&mut self, request: &impl BulkableRequest) {
        for line in request.lines() {
            self.bytes += serde_json::to_vec(&line).map_or(0, |encoded| encoded.len() + 1);
            self.lines.push(line);
        }
        self.actions += 1;
    }

    fn is_empty(&self) -> bool {
        self.actions == 0
    }

    fn is_full(&self, config: &BulkProcessorConfig) -> bool {
        (config.bulk_actions > 0 && self.actions >= config.bulk_actions)
            || (config.bulk_size_bytes > 0 && self.bytes >= config.bulk_size_bytes)
    }

    fn take(&mut self) -> (Vec<Value>, usize) {
        let actions = self.actions;
        let lines = std::mem::take(&mut self.lines);
        self.actions = 0;
        self.bytes = 0;
        (lines, actions)
    }
}

async fn run_worker<R: BulkableRequest>(
    sender: Arc<dyn BulkSender>,
    config: BulkProcessorConfig,
    mut rx: mpsc::UnboundedReceiver<Command<R>>,
) {
    let mut batch = PendingBatch::default();
    let period = config.flush_interval.max(Duration::from_millis(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Add(request)) => {
                    batch.push(&request);
                    if batch.is_full(&config) {
                        if let Err(e) = commit(sender.as_ref(), &mut batch).await {
                            error!(error = %e, "Bulk commit on threshold failed");
                        }
                    }
                }
                Some(Command::Flush(ack)) => {
                    let _ = ack.send(commit(sender.as_ref(), &mut batch).await);
                }
                Some(Command::Close(ack)) => {
                    let _ = ack.send(commit(sender.as_ref(), &mut batch).await);
                    break;
                }
                None => {
                    if let Err(e) = commit(sender.as_ref(), &mut batch).await {
                        warn!(error = %e, "Final bulk commit failed after processor was dropped");
                    }
                    break;
                }
            },
            _ = ticker.tick() => {
                if !batch.is_empty() {
                    if let Err(e) = commit(sender.as_ref(), &mut batch).await {
                        error!(error = %e, "Periodic bulk commit failed");
                    }
                }
            }
        }
    }

    debug!("Bulk processor worker stopped");
}

async fn commit(sender: &dyn BulkSender, batch: &mut PendingBatch) -> Result<(), EngineError> {
    if batch.is_empty() {
        return Ok(());
    }

    let (lines, actions) = batch.take();
    let response = sender.bulk(lines).await?;

    if response.errors {
        let failed = response.failed_items();
        error!(
            failed = failed,
            total = actions,
            "Elasticsearch could not process bulk request"
        );
        return Err(EngineError::BulkItems {
            failed,
            total: actions,
        });
    }

    debug!(actions = actions, took = response.took, "Committed bulk request");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Doc(&'static str);

    impl BulkableRequest for Doc {
        fn lines(&self) -> Vec<Value> {
            index_action_lines("spans", "span", self.0, &json!({ "id": self.0 }))
        }
    }

    /// Records every committed body.
    #[derive(Default)]
    struct RecordingSender {
        commits: Mutex<Vec<Vec<Value>>>,
        reject: bool,
    }

    impl RecordingSender {
        fn commit_sizes(&self) -> Vec<usize> {
            self.commits
                .lock()
                .unwrap()
                .iter()
                .map(|lines| lines.len() / 2)
                .collect()
        }
    }

    #[async_trait]
    impl BulkSender for RecordingSender {
        async fn bulk(&self, lines: Vec<Value>) -> Result<BulkResponse, EngineError> {
            let actions = lines.len() / 2;
            self.commits.lock().unwrap().push(lines);
            if self.reject {
                return Ok(BulkResponse {
                    took: 1,
                    errors: true,
                    items: vec![json!({ "index": { "status": 400, "error": { "type": "mapper_parsing_exception" } } }); actions],
                });
            }
            Ok(BulkResponse {
                took: 1,
                errors: false,
                items: vec![json!({ "index": { "status": 201 } }); actions],
            })
        }
    }

    fn config(bulk_actions: usize) -> BulkProcessorConfig {
        BulkProcessorConfig {
            bulk_actions,
            bulk_size_bytes: 0,
            flush_interval: Duration::from_secs(3600),
        }
    }

    #[test]
    fn test_index_action_lines_omit_empty_fields() {
        let lines = index_action_lines("spans", "", "", &json!({}));
        assert_eq!(lines[0], json!({ "index": { "_index": "spans" } }));
    }

    #[test]
    fn test_failed_items() {
        let response = BulkResponse {
            took: 3,
            errors: true,
            items: vec![
                json!({ "index": { "status": 201 } }),
                json!({ "index": { "status": 400, "error": { "type": "x" } } }),
            ],
        };
        assert_eq!(response.failed_items(), 1);
    }

    #[test]
    fn test_batch_thresholds() {
        let mut batch = PendingBatch::default();
        let config = BulkProcessorConfig {
            bulk_actions: 0,
            bulk_size_bytes: 100,
            flush_interval: Duration::from_secs(1),
        };

        batch.push(&Doc("a"));
        assert!(!batch.is_full(&config));
        batch.push(&Doc("b"));
        assert!(batch.is_full(&config));

        let (lines, actions) = batch.take();
        assert_eq!(actions, 2);
        assert_eq!(lines.len(), 4);
        assert!(batch.is_empty());
    }

    #[tokio::test]
    async fn test_flush_commits_pending_requests() {
        let sender = Arc::new(RecordingSender::default());
        let processor = BulkProcessor::start(sender.clone(), config(100));

        processor.add(Doc("1")).unwrap();
        processor.add(Doc("2")).unwrap();
        processor.flush().await.unwrap();

        assert_eq!(sender.commit_sizes(), vec![2]);

        // Nothing pending: no empty commit.
        processor.flush().await.unwrap();
        assert_eq!(sender.commit_sizes(), vec![2]);
    }

    #[tokio::test]
    async fn test_action_threshold_commits_in_order() {
        let sender = Arc::new(RecordingSender::default());
        let processor = BulkProcessor::start(sender.clone(), config(2));

        for id in ["1", "2", "3"] {
            processor.add(Doc(id)).unwrap();
        }
        processor.flush().await.unwrap();

        assert_eq!(sender.commit_sizes(), vec![2, 1]);
        let commits = sender.commits.lock().unwrap();
        assert_eq!(commits[0][0]["index"]["_id"], "1");
        assert_eq!(commits[0][2]["index"]["_id"], "2");
        assert_eq!(commits[1][0]["index"]["_id"], "3");
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_interval_commits_partial_batch() {
        let sender = Arc::new(RecordingSender::default());
        let processor = BulkProcessor::start(
            sender.clone(),
            BulkProcessorConfig {
                bulk_actions: 100,
                bulk_size_bytes: 0,
                flush_interval: Duration::from_millis(200),
            },
        );

        processor.add(Doc("1")).unwrap();
        tokio::time::sleep(Duration::from_millis(300)).await;

        assert_eq!(sender.commit_sizes(), vec![1]);
    }

    #[tokio::test]
    async fn test_close_flushes_and_rejects_later_adds() {
        let sender = Arc::new(RecordingSender::default());
        let processor = BulkProcessor::start(sender.clone(), config(100));

        processor.add(Doc("1")).unwrap();
        processor.close().await.unwrap();
        assert_eq!(sender.commit_sizes(), vec![1]);

        assert_eq!(processor.add(Doc("2")), Err(EngineError::BulkClosed));
        processor.close().await.unwrap();
        processor.flush().await.unwrap();
        assert_eq!(sender.commit_sizes(), vec![1]);
    }

    #[tokio::test]
    async fn test_rejected_items_surface_on_flush() {
        let sender = Arc::new(RecordingSender {
            reject: true,
            ..Default::default()
        });
        let processor = BulkProcessor::start(sender.clone(), config(100));

        processor.add(Doc("1")).unwrap();
        processor.add(Doc("2")).unwrap();

        assert_eq!(
            processor.flush().await,
            Err(EngineError::BulkItems {
                failed: 2,
                total: 2
            })
        );
    }
}
