//! Bounded, cancellable upload queue.
//!
//! Jobs run on the tokio runtime. A semaphore caps how many are in flight;
//! failed attempts back off exponentially until the retry budget is spent.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::{watch, Semaphore};

use super::blossom::{BlobUploader, UploadRequest};
use crate::config::UploadConfig;
use crate::error::{FeedError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum UploadStatus {
    Queued,
    Uploading { attempt: u32 },
    Completed { url: String },
    Failed { error: String },
    Cancelled,
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed { .. } | Self::Failed { .. } | Self::Cancelled
        )
    }
}

/// Snapshot of one job for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadJob {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub status: UploadStatus,
}

struct JobEntry {
    id: String,
    name: String,
    status: watch::Sender<UploadStatus>,
    cancel: watch::Sender<bool>,
}

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt - 1)`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    base.saturating_mul(1u32 << exponent)
}

pub struct UploadManager<U: BlobUploader> {
    uploader: Arc<U>,
    config: UploadConfig,
    semaphore: Arc<Semaphore>,
    jobs: RwLock<Vec<JobEntry>>,
}

impl<U: BlobUploader> UploadManager<U> {
    pub fn new(uploader: U, config: UploadConfig) -> Self {
        Self {
            uploader: Arc::new(uploader),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            config,
            jobs: RwLock::new(Vec::new()),
        }
    }

    /// Queue `request` and return its job id. Must be called within a tokio runtime.
    pub fn enqueue(&self, request: UploadRequest) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let (status_tx, _) = watch::channel(UploadStatus::Queued);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        tracing::debug!(job = %id, name = %request.name, bytes = request.data.len(), "upload queued");

        tokio::spawn(run_job(
            Arc::clone(&self.uploader),
            Arc::clone(&self.semaphore),
            self.config,
            request.clone(),
            status_tx.clone(),
            cancel_rx,
        ));

        self.jobs.write().push(JobEntry {
            id: id.clone(),
            name: request.name,
            status: status_tx,
            cancel: cancel_tx,
        });
        id
    }

    /// Cancel a job. Returns `false` when it had already finished.
    pub fn cancel(&self, id: &str) -> Result<bool> {
        let jobs = self.jobs.read();
        let job = find(&jobs, id)?;
        let cancelled = transition(&job.status, UploadStatus::Cancelled);
        if cancelled {
            job.cancel.send_replace(true);
            tracing::info!(job = %id, "upload cancelled");
        }
        Ok(cancelled)
    }

    pub fn status(&self, id: &str) -> Result<UploadStatus> {
        let jobs = self.jobs.read();
        let status = find(&jobs, id)?.status.borrow().clone();
        Ok(status)
    }

    /// Status updates for one job.
    pub fn subscribe(&self, id: &str) -> Result<watch::Receiver<UploadStatus>> {
        let jobs = self.jobs.read();
        Ok(find(&jobs, id)?.status.subscribe())
    }

    /// Every job in enqueue order.
    pub fn jobs(&self) -> Vec<UploadJob> {
        self.jobs
            .read()
            .iter()
            .map(|job| UploadJob {
                id: job.id.clone(),
                name: job.name.clone(),
                status: job.status.borrow().clone(),
            })
            .collect()
    }

    /// Forget completed, failed and cancelled jobs. Returns how many were dropped.
    pub fn clear_finished(&self) -> usize {
        let mut jobs = self.jobs.write();
        let before = jobs.len();
        jobs.retain(|job| !job.status.borrow().is_terminal());
        before - jobs.len()
    }

    /// Wait until the job reaches a terminal status.
    pub async fn wait(&self, id: &str) -> Result<UploadStatus> {
        let mut rx = self.subscribe(id)?;
        if let Ok(status) = rx.wait_for(UploadStatus::is_terminal).await {
            return Ok(status.clone());
        }
        let status = rx.borrow().clone();
        Ok(status)
    }

    /// Wait for every queued job.
    pub async fn wait_all(&self) -> Vec<UploadJob> {
        let ids: Vec<String> = self.jobs.read().iter().map(|job| job.id.clone()).collect();
        futures::future::join_all(ids.iter().map(|id| self.wait(id))).await;
        self.jobs()
    }
}

fn find<'a>(jobs: &'a [JobEntry], id: &str) -> Result<&'a JobEntry> {
    jobs.iter()
        .find(|job| job.id == id)
        .ok_or_else(|| FeedError::UnknownJob { id: id.to_string() })
}

/// Move to `next` unless the job already finished.
fn transition(status: &watch::Sender<UploadStatus>, next: UploadStatus) -> bool {
    status.send_if_modified(|current| {
        if current.is_terminal() {
            return false;
        }
        *current = next;
        true
    })
}

/// Resolves once cancellation is requested. Never resolves if the
/// manager is dropped.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|cancel| *cancel).await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn run_job<U: BlobUploader>(
    uploader: Arc<U>,
    semaphore: Arc<Semaphore>,
    config: UploadConfig,
    request: UploadRequest,
    status: watch::Sender<UploadStatus>,
    mut cancel: watch::Receiver<bool>,
) {
    let _permit = tokio::select! {
        biased;
        _ = cancelled(&mut cancel) => return,
        permit = semaphore.acquire_owned() => match permit {
            Ok(permit) => permit,
            Err(_) => {
                transition(&status, UploadStatus::Failed { error: "Upload queue closed".to_string() });
                return;
            }
        },
    };

    let mut attempt = 0;
    loop {
        attempt += 1;
        if !transition(&status, UploadStatus::Uploading { attempt }) {
            return;
        }

        let result = tokio::select! {
            biased;
            _ = cancelled(&mut cancel) => return,
            result = uploader.upload(&request) => result,
        };

        match result {
            Ok(url) => {
                tracing::info!(name = %request.name, %url, attempt, "upload completed");
                transition(&status, UploadStatus::Completed { url });
                return;
            }
            Err(err) if attempt > config.max_retries => {
                tracing::error!(name = %request.name, attempt, error = %err, "upload failed");
                transition(&status, UploadStatus::Failed { error: err.to_string() });
                return;
            }
            Err(err) => {
                let delay = backoff_delay(config.retry_base_delay(), attempt);
                tracing::warn!(name = %request.name, attempt, ?delay, error = %err, "upload attempt failed, retrying");
                tokio::select! {
                    biased;
                    _ = cancelled(&mut cancel) => return,
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}
