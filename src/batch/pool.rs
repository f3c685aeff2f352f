//! Bounded concurrent task execution.
//!
//! A fixed-size pool of permits bounds how many per-file tasks run at
//! once. Every submitted item produces exactly one outcome: task
//! failures, timeouts, panics and cancellation are all converted to
//! classified errors at the task boundary instead of propagating.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tracing::warn;

use crate::models::{ErrorKind, WorkItem};
use crate::pdf::AnalyzeError;

/// Hard cap on the auto-detected worker count.
pub const MAX_DEFAULT_WORKERS: usize = 8;

/// Worker count derived from available parallelism, capped at
/// [`MAX_DEFAULT_WORKERS`], minimum 1.
pub fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .clamp(1, MAX_DEFAULT_WORKERS)
}

/// A classified per-task failure.
#[derive(Debug, Clone)]
pub struct TaskError {
    pub kind: ErrorKind,
    pub message: String,
}

impl TaskError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Failure recorded for items that never started.
    pub fn cancelled() -> Self {
        Self::new(ErrorKind::Unknown, "cancelled")
    }
}

impl From<AnalyzeError> for TaskError {
    fn from(e: AnalyzeError) -> Self {
        let kind = match &e {
            AnalyzeError::NotFound(_) => ErrorKind::NotFound,
            AnalyzeError::Encrypted(_) => ErrorKind::EncryptedUnreadable,
            AnalyzeError::Corrupt(_) => ErrorKind::CorruptDocument,
            AnalyzeError::ToolNotFound(_) | AnalyzeError::Failed(_) | AnalyzeError::Io(_) => {
                ErrorKind::Unknown
            }
        };
        Self::new(kind, e.to_string())
    }
}

/// Configuration for a worker pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of tasks in flight.
    pub workers: usize,
    /// Optional wall-clock budget per task.
    pub per_item_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            per_item_timeout: None,
        }
    }
}

/// Executes per-file tasks with bounded concurrency.
pub struct WorkerPool {
    config: PoolConfig,
    cancelled: Arc<AtomicBool>,
}

impl WorkerPool {
    pub fn new(config: PoolConfig) -> Self {
        Self {
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn workers(&self) -> usize {
        self.config.workers
    }

    /// Flag checked before each task starts. Once set, queued items
    /// are recorded as cancelled failures; in-flight tasks run to
    /// completion (bounded by the per-item timeout, when configured).
    pub fn cancellation_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    /// Run one task per item and return results in submission order.
    ///
    /// The returned vector always has exactly one entry per item;
    /// completion order never matters.
    pub async fn run<T, F, Fut>(&self, items: Vec<WorkItem>, task: F) -> Vec<Result<T, TaskError>>
    where
        T: Send + 'static,
        F: Fn(WorkItem) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
    {
        let total = items.len();
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let task = Arc::new(task);
        let timeout = self.config.per_item_timeout;

        let mut handles = Vec::with_capacity(total);
        for item in items {
            let semaphore = semaphore.clone();
            let task = task.clone();
            let cancelled = self.cancelled.clone();

            handles.push(tokio::spawn(async move {
                // Permit released on every exit path.
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("worker semaphore closed");

                if cancelled.load(Ordering::SeqCst) {
                    return Err(TaskError::cancelled());
                }

                match timeout {
                    Some(budget) => match tokio::time::timeout(budget, task(item)).await {
                        Ok(result) => result,
                        Err(_) => Err(TaskError::new(
                            ErrorKind::Timeout,
                            format!("exceeded per-file budget of {}s", budget.as_secs()),
                        )),
                    },
                    None => task(item).await,
                }
            }));
        }

        let mut results = Vec::with_capacity(total);
        for handle in handles {
            results.push(match handle.await {
                Ok(result) => result,
                Err(e) => {
                    warn!("Worker task aborted: {}", e);
                    Err(TaskError::new(
                        ErrorKind::Unknown,
                        format!("task aborted: {}", e),
                    ))
                }
            });
        }
        results
    }
}
