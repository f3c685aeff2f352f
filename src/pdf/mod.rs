//! PDF analysis capability.
//!
//! The batch engine consumes PDFs through the [`PageAnalyzer`] trait and
//! never parses PDF internals itself. The shipped implementation,
//! [`PopplerAnalyzer`], shells out to the Poppler tools (`pdfinfo`,
//! `pdftotext`, `pdfimages`).

mod poppler;

use std::path::Path;

use async_trait::async_trait;
use thiserror::Error;

pub use poppler::PopplerAnalyzer;

/// Errors raised while reading a single document.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Document is encrypted: {0}")]
    Encrypted(String),

    #[error("Corrupt document: {0}")]
    Corrupt(String),

    #[error("External tool not found: {0}")]
    ToolNotFound(String),

    #[error("Analysis failed: {0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Raw per-document facts, as reported by the PDF toolchain.
///
/// File-level facts (size, timing) are added by the worker that wraps
/// this into an `AnalysisResult`.
#[derive(Debug, Clone, Default)]
pub struct DocumentFacts {
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
}

/// Capability interface for per-file document reading.
///
/// Implementations must be safe to call concurrently from multiple
/// worker tasks.
#[async_trait]
pub trait PageAnalyzer: Send + Sync {
    /// Return structural facts and metadata for one document.
    async fn analyze(&self, path: &Path) -> Result<DocumentFacts, AnalyzeError>;

    /// Return the raw text content of one document.
    async fn extract_text(&self, path: &Path) -> Result<String, AnalyzeError>;
}
