//! Batch analysis models: work items, per-file outcomes and aggregate
//! statistics.
//!
//! A batch run turns N input paths into exactly N `FileOutcome` values,
//! ordered by the original input index no matter how the workers
//! interleave.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One unit of per-file work.
///
/// The index is assigned by the dispatcher after sorting and is the
/// position of the file in the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    pub index: usize,
    pub path: PathBuf,
}

impl WorkItem {
    pub fn new(index: usize, path: PathBuf) -> Self {
        Self { index, path }
    }
}

/// Classification of a per-file failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Path vanished between enumeration and execution.
    NotFound,
    /// PDF structure unreadable.
    CorruptDocument,
    /// Password-protected and no password supplied.
    EncryptedUnreadable,
    /// Analysis exceeded the per-file budget.
    Timeout,
    /// AI provider unreachable (extraction runs only).
    ProviderUnavailable,
    /// Anything else, including cancellation.
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::CorruptDocument => "corrupt_document",
            Self::EncryptedUnreadable => "encrypted_unreadable",
            Self::Timeout => "timeout",
            Self::ProviderUnavailable => "provider_unavailable",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything we learned about one successfully analyzed PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub file_name: String,
    pub file_path: String,
    pub file_size_bytes: u64,
    pub file_size_mb: f64,
    /// Filesystem mtime of the input file.
    pub modified_date: Option<DateTime<Utc>>,
    pub analysis_timestamp: DateTime<Utc>,
    pub page_count: u32,
    pub total_text_length: u64,
    pub total_images: u32,
    pub has_forms: bool,
    pub is_encrypted: bool,
    pub pdf_version: String,
    pub title: String,
    pub author: String,
    pub subject: String,
    pub creator: String,
    pub producer: String,
    pub creation_date: String,
    pub modification_date: String,
    pub processing_time_seconds: f64,
}

/// A failure recorded in place of an `AnalysisResult`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileFailure {
    pub kind: ErrorKind,
    pub message: String,
    pub path: String,
}

/// The result of analyzing one file: success or classified failure.
///
/// Failures never abort the batch; they are carried alongside the
/// successes and surface in the statistics block.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileOutcome {
    Success(AnalysisResult),
    Failure(FileFailure),
}

impl FileOutcome {
    pub fn failure(kind: ErrorKind, message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Failure(FileFailure {
            kind,
            message: message.into(),
            path: path.into(),
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Path of the file this outcome belongs to.
    pub fn path(&self) -> &str {
        match self {
            Self::Success(r) => &r.file_path,
            Self::Failure(f) => &f.path,
        }
    }

    pub fn as_success(&self) -> Option<&AnalysisResult> {
        match self {
            Self::Success(r) => Some(r),
            Self::Failure(_) => None,
        }
    }

    pub fn as_failure(&self) -> Option<&FileFailure> {
        match self {
            Self::Success(_) => None,
            Self::Failure(f) => Some(f),
        }
    }
}

/// Round to one decimal place (rates).
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Round to two decimal places (sizes, durations).
pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryStatistics {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    /// Percentage of successful files, one decimal place.
    pub success_rate: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileStatistics {
    pub total_size_mb: f64,
    pub average_size_mb: f64,
    pub largest_file: Option<String>,
    pub smallest_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentStatistics {
    pub total_pages: u64,
    pub average_pages: f64,
    pub total_text_length: u64,
    pub average_text_length: f64,
    pub files_with_forms: usize,
    pub files_with_images: usize,
    pub encrypted_files: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingStatistics {
    pub total_processing_time_seconds: f64,
    pub average_processing_time_seconds: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub file: String,
    pub error: String,
}

/// Aggregate statistics over a full set of outcomes.
///
/// Computed wholesale; size and page means cover successful outcomes
/// only and report 0 when there are no successes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub summary: SummaryStatistics,
    pub file_statistics: FileStatistics,
    pub content_statistics: ContentStatistics,
    pub processing_statistics: ProcessingStatistics,
    pub errors: Vec<ErrorEntry>,
}

impl BatchStatistics {
    pub fn compute(outcomes: &[FileOutcome]) -> Self {
        let total = outcomes.len();
        let successes: Vec<&AnalysisResult> =
            outcomes.iter().filter_map(|o| o.as_success()).collect();
        let successful = successes.len();
        let failed = total - successful;

        let success_rate = if total > 0 {
            round1(successful as f64 / total as f64 * 100.0)
        } else {
            0.0
        };

        let total_size_bytes: u64 = successes.iter().map(|r| r.file_size_bytes).sum();
        let total_size_mb = total_size_bytes as f64 / (1024.0 * 1024.0);
        let average_size_mb = if successful > 0 {
            total_size_mb / successful as f64
        } else {
            0.0
        };

        let largest_file = successes
            .iter()
            .max_by_key(|r| r.file_size_bytes)
            .map(|r| r.file_name.clone());
        let smallest_file = successes
            .iter()
            .min_by_key(|r| r.file_size_bytes)
            .map(|r| r.file_name.clone());

        let total_pages: u64 = successes.iter().map(|r| u64::from(r.page_count)).sum();
        let total_text_length: u64 = successes.iter().map(|r| r.total_text_length).sum();
        let (average_pages, average_text_length) = if successful > 0 {
            (
                round2(total_pages as f64 / successful as f64),
                round2(total_text_length as f64 / successful as f64),
            )
        } else {
            (0.0, 0.0)
        };

        let total_time: f64 = outcomes
            .iter()
            .filter_map(|o| o.as_success())
            .map(|r| r.processing_time_seconds)
            .sum();
        let average_time = if total > 0 {
            round2(total_time / total as f64)
        } else {
            0.0
        };

        let errors = outcomes
            .iter()
            .filter_map(|o| o.as_failure())
            .map(|f| ErrorEntry {
                file: f.path.clone(),
                error: format!("{}: {}", f.kind, f.message),
            })
            .collect();

        Self {
            summary: SummaryStatistics {
                total_files: total,
                successful,
                failed,
                success_rate,
            },
            file_statistics: FileStatistics {
                total_size_mb: round2(total_size_mb),
                average_size_mb: round2(average_size_mb),
                largest_file,
                smallest_file,
            },
            content_statistics: ContentStatistics {
                total_pages,
                average_pages,
                total_text_length,
                average_text_length,
                files_with_forms: successes.iter().filter(|r| r.has_forms).count(),
                files_with_images: successes.iter().filter(|r| r.total_images > 0).count(),
                encrypted_files: successes.iter().filter(|r| r.is_encrypted).count(),
            },
            processing_statistics: ProcessingStatistics {
                total_processing_time_seconds: round2(total_time),
                average_processing_time_seconds: average_time,
            },
            errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn success(name: &str, size: u64, pages: u32, forms: bool, images: u32) -> FileOutcome {
        FileOutcome::Success(AnalysisResult {
            file_name: name.to_string(),
            file_path: format!("/docs/{name}"),
            file_size_bytes: size,
            file_size_mb: round2(size as f64 / (1024.0 * 1024.0)),
            modified_date: None,
            analysis_timestamp: Utc::now(),
            page_count: pages,
            total_text_length: 1000,
            total_images: images,
            has_forms: forms,
            is_encrypted: false,
            pdf_version: "1.7".to_string(),
            title: String::new(),
            author: String::new(),
            subject: String::new(),
            creator: String::new(),
            producer: String::new(),
            creation_date: String::new(),
            modification_date: String::new(),
            processing_time_seconds: 0.5,
        })
    }

    #[test]
    fn success_rate_rounds_to_one_decimal() {
        let outcomes = vec![
            success("a.pdf", 1024, 5, false, 0),
            FileOutcome::failure(ErrorKind::EncryptedUnreadable, "no password", "/docs/b.pdf"),
            success("c.pdf", 2048, 2, false, 0),
        ];
        let stats = BatchStatistics::compute(&outcomes);
        assert_eq!(stats.summary.total_files, 3);
        assert_eq!(stats.summary.successful, 2);
        assert_eq!(stats.summary.failed, 1);
        assert_eq!(stats.summary.success_rate, 66.7);
        assert_eq!(stats.content_statistics.total_pages, 7);
        assert_eq!(stats.errors.len(), 1);
        assert!(stats.errors[0].error.contains("encrypted_unreadable"));
    }

    #[test]
    fn zero_successes_report_zero_means() {
        let outcomes = vec![
            FileOutcome::failure(ErrorKind::CorruptDocument, "bad xref", "/docs/a.pdf"),
            FileOutcome::failure(ErrorKind::NotFound, "gone", "/docs/b.pdf"),
        ];
        let stats = BatchStatistics::compute(&outcomes);
        assert_eq!(stats.summary.success_rate, 0.0);
        assert_eq!(stats.file_statistics.average_size_mb, 0.0);
        assert_eq!(stats.content_statistics.average_pages, 0.0);
        assert!(stats.file_statistics.largest_file.is_none());
    }

    #[test]
    fn empty_outcome_set_is_valid() {
        let stats = BatchStatistics::compute(&[]);
        assert_eq!(stats.summary.total_files, 0);
        assert_eq!(stats.summary.success_rate, 0.0);
    }

    #[test]
    fn largest_and_smallest_files() {
        let outcomes = vec![
            success("small.pdf", 100, 1, false, 0),
            success("big.pdf", 10_000, 1, false, 0),
        ];
        let stats = BatchStatistics::compute(&outcomes);
        assert_eq!(stats.file_statistics.largest_file.as_deref(), Some("big.pdf"));
        assert_eq!(
            stats.file_statistics.smallest_file.as_deref(),
            Some("small.pdf")
        );
    }

    #[test]
    fn content_counters() {
        let outcomes = vec![
            success("a.pdf", 100, 1, true, 0),
            success("b.pdf", 100, 1, false, 3),
            success("c.pdf", 100, 1, true, 1),
        ];
        let stats = BatchStatistics::compute(&outcomes);
        assert_eq!(stats.content_statistics.files_with_forms, 2);
        assert_eq!(stats.content_statistics.files_with_images, 2);
    }
}
