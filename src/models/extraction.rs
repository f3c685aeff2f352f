//! Structured extraction models.
//!
//! An `ExtractionRecord` is the typed result of applying one schema to
//! one document; the `ExtractionSummary` accumulates over a batch run
//! and is written once at run end.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which path produced the final field values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// AI-backed extraction was authoritative.
    Ai,
    /// Deterministic pattern matching was authoritative.
    Pattern,
}

impl ExtractionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ai => "ai",
            Self::Pattern => "pattern",
        }
    }
}

/// The structured result of applying a schema to one document.
///
/// A record is always produced, even when every field is null; missing
/// required fields are flagged for the caller rather than treated as
/// an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRecord {
    pub source_path: String,
    pub schema_name: String,
    pub extraction_timestamp: DateTime<Utc>,
    pub extraction_method: ExtractionMethod,
    /// Field name to extracted value; `None` when absent from the
    /// document.
    pub fields: BTreeMap<String, Option<String>>,
    pub missing_required_fields: BTreeSet<String>,
}

impl ExtractionRecord {
    /// True when every required field was found.
    pub fn is_complete(&self) -> bool {
        self.missing_required_fields.is_empty()
    }
}

/// A file that failed during an extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedFile {
    pub file: String,
    pub error: String,
}

/// Run-level summary for a structured extraction batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionSummary {
    pub schema_name: String,
    pub output_directory: PathBuf,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub total_files: usize,
    /// Source paths that produced a record, in input order.
    pub processed: Vec<String>,
    /// Files that produced no record, with the reason, in input order.
    pub failed: Vec<FailedFile>,
}

impl ExtractionSummary {
    pub fn new(schema_name: &str, output_directory: PathBuf) -> Self {
        Self {
            schema_name: schema_name.to_string(),
            output_directory,
            started_at: Utc::now(),
            finished_at: None,
            total_files: 0,
            processed: Vec::new(),
            failed: Vec::new(),
        }
    }

    pub fn record_success(&mut self, path: &str) {
        self.processed.push(path.to_string());
    }

    pub fn record_failure(&mut self, path: &str, error: impl Into<String>) {
        self.failed.push(FailedFile {
            file: path.to_string(),
            error: error.into(),
        });
    }

    /// Finalize the summary at run end.
    pub fn finish(&mut self) {
        self.total_files = self.processed.len() + self.failed.len();
        self.finished_at = Some(Utc::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_finalization_counts_both_lists() {
        let mut summary = ExtractionSummary::new("client", PathBuf::from("/out"));
        summary.record_success("/docs/a.pdf");
        summary.record_success("/docs/c.pdf");
        summary.record_failure("/docs/b.pdf", "encrypted_unreadable: no password");
        summary.finish();

        assert_eq!(summary.total_files, 3);
        assert_eq!(summary.processed, vec!["/docs/a.pdf", "/docs/c.pdf"]);
        assert_eq!(summary.failed[0].file, "/docs/b.pdf");
        assert!(summary.finished_at.is_some());
    }

    #[test]
    fn record_completeness() {
        let mut record = ExtractionRecord {
            source_path: "/docs/a.pdf".to_string(),
            schema_name: "client".to_string(),
            extraction_timestamp: Utc::now(),
            extraction_method: ExtractionMethod::Pattern,
            fields: BTreeMap::new(),
            missing_required_fields: BTreeSet::new(),
        };
        assert!(record.is_complete());
        record
            .missing_required_fields
            .insert("full_name".to_string());
        assert!(!record.is_complete());
    }
}
