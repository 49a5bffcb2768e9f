//! Concurrent, all-or-nothing image uploads.
//!
//! A batch is split into one [`UploadTask`] per file. A fixed number of
//! workers pull tasks from a shared queue and push exactly one
//! [`UploadResult`] per task, whatever happens inside the upload. The
//! aggregator correlates results by index, never by arrival order. If any
//! task fails, every key that did get stored is deleted again before the
//! failure is reported.
//!
//! The batch runs on its own task, so a caller that goes away mid-batch does
//! not strand blobs: a batch that finishes without anyone waiting for it
//! deletes what it stored.

use std::collections::BTreeMap;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use estate_storage::{image_key, Storage};
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use tokio::sync::{mpsc, oneshot, Mutex};

/// A file to upload, as received from the client.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub payload: Vec<u8>,
    pub filename_hint: String,
}

/// One unit of work. `index` is the file's position in the batch and fixes
/// its storage key.
#[derive(Debug)]
pub struct UploadTask {
    pub index: usize,
    pub payload: Vec<u8>,
    pub filename_hint: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("storage rejected the file: {0}")]
    Storage(String),
    #[error("upload worker panicked")]
    Panicked,
    #[error("skipped after another file failed")]
    Aborted,
    #[error("no result was reported")]
    Missing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    Success { key: String },
    Failure { cause: UploadError },
}

#[derive(Debug)]
pub struct UploadResult {
    pub index: usize,
    pub outcome: UploadOutcome,
}

/// Why a batch failed and what was cleaned up afterwards.
#[derive(Debug, Clone)]
pub struct FailureReport {
    pub total: usize,
    /// Failed files by index, ascending
    pub failures: Vec<(usize, UploadError)>,
    /// Keys that were stored and then deleted again
    pub compensated: Vec<String>,
    /// Keys that were stored but could not be deleted
    pub cleanup_failures: Vec<String>,
}

impl FailureReport {
    /// Index of the first file that genuinely failed, ignoring files that
    /// were only skipped because of it.
    pub fn first_failed_index(&self) -> usize {
        self.failures
            .iter()
            .find(|(_, e)| *e != UploadError::Aborted)
            .or_else(|| self.failures.first())
            .map(|(i, _)| *i)
            .unwrap_or_default()
    }

    pub(crate) fn lost(total: usize) -> Self {
        FailureReport {
            total,
            failures: (0..total).map(|i| (i, UploadError::Missing)).collect(),
            compensated: Vec::new(),
            cleanup_failures: Vec::new(),
        }
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to upload file {}", self.first_failed_index())
    }
}

impl std::error::Error for FailureReport {}

#[derive(Clone)]
pub struct UploadOrchestrator {
    storage: Arc<dyn Storage>,
    max_workers: usize,
}

impl UploadOrchestrator {
    pub fn new(storage: Arc<dyn Storage>, max_workers: usize) -> Self {
        Self {
            storage,
            max_workers: max_workers.max(1),
        }
    }

    /// Upload every file under `prefix` as `{prefix}/image_{index}{ext}`.
    ///
    /// Returns the keys in index order, or a [`FailureReport`] after deleting
    /// whatever was stored. An empty batch succeeds without touching storage.
    #[tracing::instrument(skip(self, files), fields(upload.prefix = %prefix, upload.files = files.len()))]
    pub async fn upload_all(
        &self,
        prefix: &str,
        files: Vec<UploadFile>,
    ) -> Result<Vec<String>, FailureReport> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let total = files.len();
        let tasks: Vec<UploadTask> = files
            .into_iter()
            .enumerate()
            .map(|(index, file)| UploadTask {
                index,
                payload: file.payload,
                filename_hint: file.filename_hint,
            })
            .collect();

        let (done_tx, done_rx) = oneshot::channel();
        let batch = UploadBatch {
            storage: self.storage.clone(),
            prefix: Arc::from(prefix),
            workers: self.max_workers.min(total),
        };

        tokio::spawn(async move {
            let storage = batch.storage.clone();
            let workers = batch.workers;
            let outcome = batch.run(tasks).await;
            if let Err(Ok(keys)) = done_tx.send(outcome) {
                tracing::warn!(
                    keys = keys.len(),
                    "Upload caller went away; deleting stored files"
                );
                compensate(&storage, &keys, workers).await;
            }
        });

        match done_rx.await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::error!(files = total, "Upload batch ended without reporting");
                Err(FailureReport::lost(total))
            }
        }
    }

    /// Delete keys from a batch that succeeded but could not be attached to
    /// its record. Returns the keys that could not be deleted.
    pub async fn discard(&self, keys: &[String]) -> Vec<String> {
        let (_, failed) = compensate(&self.storage, keys, self.max_workers).await;
        failed
    }
}

struct UploadBatch {
    storage: Arc<dyn Storage>,
    prefix: Arc<str>,
    workers: usize,
}

impl UploadBatch {
    async fn run(self, tasks: Vec<UploadTask>) -> Result<Vec<String>, FailureReport> {
        let start = std::time::Instant::now();
        let total = tasks.len();

        let (task_tx, task_rx) = mpsc::channel::<UploadTask>(total);
        for task in tasks {
            // Capacity equals the batch size and the receiver is alive, so this never waits.
            if task_tx.send(task).await.is_err() {
                break;
            }
        }
        drop(task_tx);

        let task_rx = Arc::new(Mutex::new(task_rx));
        let (result_tx, mut result_rx) = mpsc::channel::<UploadResult>(total);
        let abort = Arc::new(AtomicBool::new(false));

        let mut handles = Vec::with_capacity(self.workers);
        for worker_id in 0..self.workers {
            handles.push(tokio::spawn(worker(
                worker_id,
                self.storage.clone(),
                self.prefix.clone(),
                task_rx.clone(),
                result_tx.clone(),
                abort.clone(),
            )));
        }
        drop(result_tx);

        let mut results: BTreeMap<usize, UploadOutcome> = BTreeMap::new();
        while results.len() < total {
            match result_rx.recv().await {
                Some(result) => {
                    results.insert(result.index, result.outcome);
                }
                None => break,
            }
        }

        for handle in handles {
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "Upload worker exited abnormally");
            }
        }

        let mut keys = Vec::with_capacity(total);
        let mut failures = Vec::new();
        for index in 0..total {
            match results.remove(&index) {
                Some(UploadOutcome::Success { key }) => keys.push(key),
                Some(UploadOutcome::Failure { cause }) => failures.push((index, cause)),
                None => failures.push((index, UploadError::Missing)),
            }
        }

        if failures.is_empty() {
            tracing::info!(
                prefix = %self.prefix,
                files = total,
                workers = self.workers,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Upload batch stored"
            );
            return Ok(keys);
        }

        for (index, cause) in &failures {
            tracing::warn!(prefix = %self.prefix, index = index, error = %cause, "Upload failed");
        }

        let (compensated, cleanup_failures) = compensate(&self.storage, &keys, self.workers).await;

        tracing::error!(
            prefix = %self.prefix,
            files = total,
            failed = failures.len(),
            compensated = compensated.len(),
            orphaned = cleanup_failures.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload batch failed"
        );

        Err(FailureReport {
            total,
            failures,
            compensated,
            cleanup_failures,
        })
    }
}

async fn worker(
    worker_id: usize,
    storage: Arc<dyn Storage>,
    prefix: Arc<str>,
    tasks: Arc<Mutex<mpsc::Receiver<UploadTask>>>,
    results: mpsc::Sender<UploadResult>,
    abort: Arc<AtomicBool>,
) {
    loop {
        let next = tasks.lock().await.recv().await;
        let Some(task) = next else {
            break;
        };
        let index = task.index;

        let outcome = if abort.load(Ordering::Acquire) {
            UploadOutcome::Failure {
                cause: UploadError::Aborted,
            }
        } else {
            match AssertUnwindSafe(put_one(&storage, &prefix, task))
                .catch_unwind()
                .await
            {
                Ok(Ok(key)) => UploadOutcome::Success { key },
                Ok(Err(cause)) => UploadOutcome::Failure { cause },
                Err(_) => UploadOutcome::Failure {
                    cause: UploadError::Panicked,
                },
            }
        };

        if matches!(outcome, UploadOutcome::Failure { .. }) {
            abort.store(true, Ordering::Release);
        }

        if results.send(UploadResult { index, outcome }).await.is_err() {
            tracing::debug!(worker_id = worker_id, "Result channel closed");
            break;
        }
    }
}

async fn put_one(
    storage: &Arc<dyn Storage>,
    prefix: &str,
    task: UploadTask,
) -> Result<String, UploadError> {
    let key = image_key(prefix, task.index, &task.filename_hint);
    storage
        .put(&key, task.payload)
        .await
        .map_err(|e| UploadError::Storage(e.to_string()))?;
    Ok(key)
}

/// Best-effort delete of stored keys. Returns (deleted, failed).
async fn compensate(
    storage: &Arc<dyn Storage>,
    keys: &[String],
    concurrency: usize,
) -> (Vec<String>, Vec<String>) {
    let outcomes: Vec<(String, bool)> = stream::iter(keys.iter().cloned())
        .map(|key| {
            let storage = storage.clone();
            async move {
                match storage.delete(&key).await {
                    Ok(()) => (key, true),
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            storage_key = %key,
                            "Compensating delete failed; file left orphaned"
                        );
                        (key, false)
                    }
                }
            }
        })
        .buffer_unordered(concurrency.max(1))
        .collect()
        .await;

    let mut deleted = Vec::new();
    let mut failed = Vec::new();
    for (key, ok) in outcomes {
        if ok {
            deleted.push(key);
        } else {
            failed.push(key);
        }
    }
    deleted.sort();
    failed.sort();
    (deleted, failed)
}
