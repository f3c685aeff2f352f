//! Batch analysis service.
//!
//! Composes the dispatcher, worker pool and page analyzer into one
//! run: N input files in, N ordered outcomes plus statistics out.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::batch::{
    DispatchOptions, PoolConfig, ResultAggregator, TaskError, WorkDispatcher, WorkerPool,
};
use crate::models::{AnalysisResult, BatchStatistics, FileOutcome, WorkItem};
use crate::pdf::PageAnalyzer;

use super::{BatchRunError, RunOptions};

/// Progress events emitted during a batch analysis run.
#[derive(Debug, Clone)]
pub enum AnalyzeEvent {
    /// Enumeration finished, workers starting.
    Started { total: usize, workers: usize },
    /// One file finished (either way).
    FileCompleted {
        index: usize,
        file_name: String,
        success: bool,
    },
}

/// Final output of a batch analysis run.
#[derive(Debug)]
pub struct AnalyzeRunOutput {
    /// Outcomes in input enumeration order.
    pub outcomes: Vec<FileOutcome>,
    pub statistics: BatchStatistics,
    pub workers_used: usize,
}

/// Service for analyzing batches of PDF files.
pub struct AnalyzeService {
    analyzer: Arc<dyn PageAnalyzer>,
}

impl AnalyzeService {
    pub fn new(analyzer: Arc<dyn PageAnalyzer>) -> Self {
        Self { analyzer }
    }

    /// Run one batch.
    ///
    /// Per-file failures are recorded in the outcomes; only
    /// enumeration and configuration problems abort the run.
    pub async fn run(
        &self,
        options: &RunOptions,
        event_tx: mpsc::Sender<AnalyzeEvent>,
    ) -> Result<AnalyzeRunOutput, BatchRunError> {
        let dispatcher = WorkDispatcher::new(&DispatchOptions {
            pattern: options.pattern.clone(),
            recursive: options.recursive,
        })?;
        let items = dispatcher.dispatch(&options.inputs)?;
        if items.is_empty() {
            return Err(BatchRunError::NoFiles);
        }

        let total = items.len();
        info!("Analyzing {} files with {} workers", total, options.workers);
        let _ = event_tx
            .send(AnalyzeEvent::Started {
                total,
                workers: options.workers,
            })
            .await;

        let pool = WorkerPool::new(PoolConfig {
            workers: options.workers,
            per_item_timeout: options.per_file_timeout,
        });

        let signal_task = options.handle_signals.then(|| {
            let flag = pool.cancellation_flag();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupt received, cancelling queued work");
                    flag.store(true, Ordering::SeqCst);
                }
            })
        });

        let paths: Vec<String> = items
            .iter()
            .map(|i| i.path.display().to_string())
            .collect();

        let analyzer = self.analyzer.clone();
        let events = event_tx.clone();
        let results = pool
            .run(items, move |item| {
                let analyzer = analyzer.clone();
                let events = events.clone();
                async move {
                    let index = item.index;
                    let file_name = item
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    let result = analyze_one(analyzer.as_ref(), &item).await;
                    let _ = events
                        .send(AnalyzeEvent::FileCompleted {
                            index,
                            file_name,
                            success: result.is_ok(),
                        })
                        .await;
                    result
                }
            })
            .await;

        if let Some(task) = signal_task {
            task.abort();
        }

        let mut aggregator = ResultAggregator::new(total);
        for (index, result) in results.into_iter().enumerate() {
            let outcome = match result {
                Ok(analysis) => FileOutcome::Success(analysis),
                Err(TaskError { kind, message }) => {
                    FileOutcome::failure(kind, message, paths[index].clone())
                }
            };
            aggregator.record(index, outcome);
        }

        let outcomes = aggregator.into_ordered();
        let statistics = BatchStatistics::compute(&outcomes);
        Ok(AnalyzeRunOutput {
            outcomes,
            statistics,
            workers_used: options.workers,
        })
    }
}

/// Analyze one file: document facts from the capability, file facts
/// from the filesystem, wall-clock timing measured here.
async fn analyze_one(
    analyzer: &dyn PageAnalyzer,
    item: &WorkItem,
) -> Result<AnalysisResult, TaskError> {
    let started = Instant::now();

    let metadata = std::fs::metadata(&item.path).ok();
    let file_size_bytes = metadata.as_ref().map(|m| m.len()).unwrap_or(0);
    let modified_date: Option<DateTime<Utc>> = metadata
        .as_ref()
        .and_then(|m| m.modified().ok())
        .map(DateTime::<Utc>::from);

    let facts = analyzer.analyze(&item.path).await?;

    let elapsed = started.elapsed().as_secs_f64();
    Ok(AnalysisResult {
        file_name: item
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        file_path: item.path.display().to_string(),
        file_size_bytes,
        file_size_mb: crate::models::round2(file_size_bytes as f64 / (1024.0 * 1024.0)),
        modified_date,
        analysis_timestamp: Utc::now(),
        page_count: facts.page_count,
        total_text_length: facts.total_text_length,
        total_images: facts.total_images,
        has_forms: facts.has_forms,
        is_encrypted: facts.is_encrypted,
        pdf_version: facts.pdf_version,
        title: facts.title,
        author: facts.author,
        subject: facts.subject,
        creator: facts.creator,
        producer: facts.producer,
        creation_date: facts.creation_date,
        modification_date: facts.modification_date,
        processing_time_seconds: (elapsed * 100.0).round() / 100.0,
    })
}
