//! Structured extraction batch runner.
//!
//! For each input file: raw text via the page analyzer, one
//! `ExtractionRecord` via the schema extractor, one JSON file per
//! record, and a single run-level summary written at the end.

use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::batch::{DispatchOptions, PoolConfig, TaskError, WorkDispatcher, WorkerPool};
use crate::extract::{Schema, SchemaExtractor};
use crate::models::{ErrorKind, ExtractionRecord, ExtractionSummary};
use crate::pdf::PageAnalyzer;

use super::{BatchRunError, RunOptions};

/// File name of the run-level summary artifact.
pub const SUMMARY_FILE: &str = "extraction_summary.json";

/// Progress events emitted during an extraction run.
#[derive(Debug, Clone)]
pub enum ExtractEvent {
    Started { total: usize, workers: usize },
    FileCompleted {
        index: usize,
        file_name: String,
        success: bool,
    },
}

/// Service for schema-driven batch extraction.
pub struct ExtractService {
    analyzer: Arc<dyn PageAnalyzer>,
    extractor: Arc<SchemaExtractor>,
}

impl ExtractService {
    pub fn new(analyzer: Arc<dyn PageAnalyzer>, extractor: SchemaExtractor) -> Self {
        Self {
            analyzer,
            extractor: Arc::new(extractor),
        }
    }

    /// Run one extraction batch, writing one record file per input
    /// plus the summary. Returns the finalized summary.
    pub async fn run(
        &self,
        options: &RunOptions,
        schema: &'static Schema,
        output_dir: &Path,
        event_tx: mpsc::Sender<ExtractEvent>,
    ) -> Result<ExtractionSummary, BatchRunError> {
        let dispatcher = WorkDispatcher::new(&DispatchOptions {
            pattern: options.pattern.clone(),
            recursive: options.recursive,
        })?;
        let items = dispatcher.dispatch(&options.inputs)?;
        if items.is_empty() {
            return Err(BatchRunError::NoFiles);
        }

        std::fs::create_dir_all(output_dir)?;

        let total = items.len();
        info!(
            "Extracting {} files with schema '{}' using {} workers",
            total,
            schema.name(),
            options.workers
        );
        let _ = event_tx
            .send(ExtractEvent::Started {
                total,
                workers: options.workers,
            })
            .await;

        // Record file names are fixed up front so duplicate stems from
        // different directories cannot collide mid-run.
        let record_paths = Arc::new(record_paths(&items.iter().map(|i| i.path.clone()).collect::<Vec<_>>(), output_dir));
        let source_paths: Vec<String> = items
            .iter()
            .map(|i| i.path.display().to_string())
            .collect();

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

        let analyzer = self.analyzer.clone();
        let extractor = self.extractor.clone();
        let paths = record_paths.clone();
        let events = event_tx.clone();
        let results = pool
            .run(items, move |item| {
                let analyzer = analyzer.clone();
                let extractor = extractor.clone();
                let paths = paths.clone();
                let events = events.clone();
                async move {
                    let index = item.index;
                    let file_name = item
                        .path
                        .file_name()
                        .map(|n| n.to_string_lossy().to_string())
                        .unwrap_or_default();
                    let result =
                        extract_one(analyzer.as_ref(), &extractor, &item.path, schema, &paths[index])
                            .await;
                    let _ = events
                        .send(ExtractEvent::FileCompleted {
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

        // Results come back in submission order, so the summary lists
        // stay aligned with input order.
        let mut summary = ExtractionSummary::new(schema.name(), output_dir.to_path_buf());
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(_) => summary.record_success(&source_paths[index]),
                Err(TaskError { kind, message }) => {
                    summary.record_failure(&source_paths[index], format!("{}: {}", kind, message))
                }
            }
        }
        summary.finish();

        let summary_path = output_dir.join(SUMMARY_FILE);
        std::fs::write(
            &summary_path,
            serde_json::to_string_pretty(&summary).map_err(crate::batch::ReportError::from)?,
        )?;
        info!("Extraction summary saved to {}", summary_path.display());

        Ok(summary)
    }
}

/// Extract one file and persist its record.
async fn extract_one(
    analyzer: &dyn PageAnalyzer,
    extractor: &SchemaExtractor,
    path: &Path,
    schema: &'static Schema,
    record_path: &Path,
) -> Result<ExtractionRecord, TaskError> {
    let text = analyzer.extract_text(path).await?;
    let record = extractor
        .extract(&path.display().to_string(), &text, schema)
        .await;

    let json = serde_json::to_string_pretty(&record).map_err(|e| {
        TaskError::new(ErrorKind::Unknown, format!("failed to serialize record: {}", e))
    })?;
    std::fs::write(record_path, json).map_err(|e| {
        TaskError::new(
            ErrorKind::Unknown,
            format!("failed to write {}: {}", record_path.display(), e),
        )
    })?;

    Ok(record)
}

/// One output path per input, `<stem>_extracted.json`, with duplicate
/// stems disambiguated by a counter.
fn record_paths(inputs: &[PathBuf], output_dir: &Path) -> Vec<PathBuf> {
    let mut seen = std::collections::HashMap::new();
    inputs
        .iter()
        .map(|path| {
            let stem = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| "document".to_string());
            let count = seen.entry(stem.clone()).or_insert(0usize);
            *count += 1;
            let name = if *count == 1 {
                format!("{}_extracted.json", stem)
            } else {
                format!("{}_{}_extracted.json", stem, count)
            };
            output_dir.join(name)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_stems_get_distinct_record_paths() {
        let inputs = vec![
            PathBuf::from("/a/doc.pdf"),
            PathBuf::from("/b/doc.pdf"),
            PathBuf::from("/c/other.pdf"),
        ];
        let paths = record_paths(&inputs, Path::new("/out"));
        assert_eq!(paths[0], Path::new("/out/doc_extracted.json"));
        assert_eq!(paths[1], Path::new("/out/doc_2_extracted.json"));
        assert_eq!(paths[2], Path::new("/out/other_extracted.json"));
    }
}
