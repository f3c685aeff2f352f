//! Batch report serialization.
//!
//! Two forms: a structured JSON document (results plus statistics in
//! one file) and a flat CSV table with a fixed column set, where the
//! statistics travel as a sibling `.stats.json` artifact.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::models::{BatchStatistics, FileOutcome};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Output serialization form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReportFormat {
    #[default]
    Json,
    Csv,
}

/// Run-level metadata attached to the structured report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub processing_date: DateTime<Utc>,
    pub total_files: usize,
    pub workers_used: usize,
    pub analyzer_version: String,
}

impl ReportMetadata {
    pub fn new(total_files: usize, workers_used: usize) -> Self {
        Self {
            processing_date: Utc::now(),
            total_files,
            workers_used,
            analyzer_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// The structured report form.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchReport {
    pub metadata: ReportMetadata,
    pub results: Vec<FileOutcome>,
    pub statistics: BatchStatistics,
}

/// Fixed column set of the tabular form.
const CSV_COLUMNS: [&str; 14] = [
    "file_name",
    "file_path",
    "file_size_mb",
    "page_count",
    "total_text_length",
    "total_images",
    "has_forms",
    "is_encrypted",
    "pdf_version",
    "title",
    "author",
    "creation_date",
    "error",
    "processing_time",
];

/// Write the report in the requested form, creating parent
/// directories as needed.
pub fn write_report(
    path: &Path,
    format: ReportFormat,
    outcomes: &[FileOutcome],
    statistics: &BatchStatistics,
    metadata: ReportMetadata,
) -> Result<(), ReportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    match format {
        ReportFormat::Json => write_json(path, outcomes, statistics, metadata),
        ReportFormat::Csv => write_csv(path, outcomes, statistics),
    }
}

fn write_json(
    path: &Path,
    outcomes: &[FileOutcome],
    statistics: &BatchStatistics,
    metadata: ReportMetadata,
) -> Result<(), ReportError> {
    let report = BatchReport {
        metadata,
        results: outcomes.to_vec(),
        statistics: statistics.clone(),
    };
    let json = serde_json::to_string_pretty(&report)?;
    std::fs::write(path, json)?;
    info!("Report saved to {}", path.display());
    Ok(())
}

/// One CSV row per outcome; statistics go to a sibling artifact, never
/// inline.
fn write_csv(
    path: &Path,
    outcomes: &[FileOutcome],
    statistics: &BatchStatistics,
) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(CSV_COLUMNS)?;

    for outcome in outcomes {
        let row: [String; 14] = match outcome {
            FileOutcome::Success(r) => [
                r.file_name.clone(),
                r.file_path.clone(),
                r.file_size_mb.to_string(),
                r.page_count.to_string(),
                r.total_text_length.to_string(),
                r.total_images.to_string(),
                r.has_forms.to_string(),
                r.is_encrypted.to_string(),
                r.pdf_version.clone(),
                r.title.clone(),
                r.author.clone(),
                r.creation_date.clone(),
                String::new(),
                r.processing_time_seconds.to_string(),
            ],
            FileOutcome::Failure(f) => {
                let file_name = Path::new(&f.path)
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_default();
                let mut row: [String; 14] = Default::default();
                row[0] = file_name;
                row[1] = f.path.clone();
                row[12] = format!("{}: {}", f.kind, f.message);
                row
            }
        };
        writer.write_record(&row)?;
    }
    writer.flush()?;

    let stats_path = stats_artifact_path(path);
    std::fs::write(&stats_path, serde_json::to_string_pretty(statistics)?)?;
    info!(
        "Report saved to {}, statistics to {}",
        path.display(),
        stats_path.display()
    );
    Ok(())
}

/// Sibling statistics artifact for the tabular form.
pub fn stats_artifact_path(report_path: &Path) -> PathBuf {
    report_path.with_extension("stats.json")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ErrorKind;

    fn outcomes() -> Vec<FileOutcome> {
        vec![
            FileOutcome::failure(ErrorKind::CorruptDocument, "bad xref", "/docs/a.pdf"),
            FileOutcome::failure(ErrorKind::NotFound, "gone", "/docs/b.pdf"),
        ]
    }

    #[test]
    fn json_report_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let results = outcomes();
        let stats = BatchStatistics::compute(&results);

        write_report(
            &path,
            ReportFormat::Json,
            &results,
            &stats,
            ReportMetadata::new(2, 4),
        )
        .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let report: BatchReport = serde_json::from_str(&raw).unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.metadata.workers_used, 4);
        assert_eq!(report.statistics.summary.failed, 2);
        assert_eq!(report.results[0].path(), "/docs/a.pdf");
    }

    #[test]
    fn csv_report_has_fixed_columns_and_sibling_stats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        let results = outcomes();
        let stats = BatchStatistics::compute(&results);

        write_report(
            &path,
            ReportFormat::Csv,
            &results,
            &stats,
            ReportMetadata::new(2, 4),
        )
        .unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let mut lines = raw.lines();
        let header = lines.next().unwrap();
        assert_eq!(header.split(',').count(), CSV_COLUMNS.len());
        assert!(header.starts_with("file_name,file_path"));
        assert_eq!(lines.count(), 2);

        let stats_path = stats_artifact_path(&path);
        assert!(stats_path.exists());
        let stats: BatchStatistics =
            serde_json::from_str(&std::fs::read_to_string(stats_path).unwrap()).unwrap();
        assert_eq!(stats.summary.total_files, 2);
    }
}
