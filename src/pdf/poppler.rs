//! Poppler-backed document analysis.
//!
//! Uses `pdfinfo` for structure and metadata, `pdftotext` for text
//! content and `pdfimages` for image counts. All three block on the
//! subprocess, so the async trait methods run them on the blocking
//! pool.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;

use async_trait::async_trait;

use super::{AnalyzeError, DocumentFacts, PageAnalyzer};

/// Document analyzer backed by the Poppler command-line tools.
#[derive(Debug, Clone, Default)]
pub struct PopplerAnalyzer;

impl PopplerAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// Check availability of the external tools this analyzer needs.
    pub fn check_tools() -> Vec<(&'static str, bool)> {
        ["pdfinfo", "pdftotext", "pdfimages"]
            .iter()
            .map(|tool| (*tool, which::which(tool).is_ok()))
            .collect()
    }

    /// Reject inputs that are not PDF content before invoking Poppler.
    fn sniff_pdf(path: &Path) -> Result<(), AnalyzeError> {
        let mut header = [0u8; 8];
        let mut file = std::fs::File::open(path)?;
        let read = file.read(&mut header)?;
        if !infer::archive::is_pdf(&header[..read]) {
            return Err(AnalyzeError::Corrupt(
                "content is not a PDF document".to_string(),
            ));
        }
        Ok(())
    }

    /// Classify a failed Poppler invocation from its stderr output.
    fn classify_failure(tool: &str, stderr: &str) -> AnalyzeError {
        let lower = stderr.to_lowercase();
        if lower.contains("incorrect password") || lower.contains("encrypted") {
            AnalyzeError::Encrypted("password-protected, no password supplied".to_string())
        } else if lower.contains("may not be a pdf")
            || lower.contains("couldn't read xref table")
            || lower.contains("syntax error")
        {
            AnalyzeError::Corrupt(stderr.trim().to_string())
        } else {
            AnalyzeError::Failed(format!("{}: {}", tool, stderr.trim()))
        }
    }

    fn run_tool(cmd: &mut Command, tool: &str) -> Result<String, AnalyzeError> {
        match cmd.output() {
            Ok(output) => {
                if output.status.success() {
                    Ok(String::from_utf8_lossy(&output.stdout).to_string())
                } else {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(Self::classify_failure(tool, &stderr))
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AnalyzeError::ToolNotFound(
                format!("{} (install poppler-utils)", tool),
            )),
            Err(e) => Err(AnalyzeError::Io(e)),
        }
    }

    fn run_pdfinfo(path: &Path) -> Result<String, AnalyzeError> {
        Self::run_tool(Command::new("pdfinfo").arg(path), "pdfinfo")
    }

    fn run_pdftotext(path: &Path) -> Result<String, AnalyzeError> {
        Self::run_tool(
            Command::new("pdftotext")
                .args(["-layout", "-enc", "UTF-8"])
                .arg(path)
                .arg("-"),
            "pdftotext",
        )
    }

    /// Count embedded images via `pdfimages -list`.
    ///
    /// Image counting is best-effort: a failure here degrades to zero
    /// rather than failing the whole analysis.
    fn count_images(path: &Path) -> u32 {
        match Self::run_tool(Command::new("pdfimages").arg("-list").arg(path), "pdfimages") {
            Ok(listing) => parse_pdfimages_listing(&listing),
            Err(e) => {
                tracing::debug!("pdfimages failed for {}: {}", path.display(), e);
                0
            }
        }
    }

    fn analyze_sync(path: &Path) -> Result<DocumentFacts, AnalyzeError> {
        if !path.exists() {
            return Err(AnalyzeError::NotFound(path.display().to_string()));
        }
        Self::sniff_pdf(path)?;

        let info = Self::run_pdfinfo(path)?;
        let mut facts = parse_pdfinfo_output(&info);

        let text = Self::run_pdftotext(path)?;
        facts.total_text_length = text.chars().count() as u64;
        facts.total_images = Self::count_images(path);

        Ok(facts)
    }

    fn extract_text_sync(path: &Path) -> Result<String, AnalyzeError> {
        if !path.exists() {
            return Err(AnalyzeError::NotFound(path.display().to_string()));
        }
        Self::sniff_pdf(path)?;
        Self::run_pdftotext(path)
    }
}

#[async_trait]
impl PageAnalyzer for PopplerAnalyzer {
    async fn analyze(&self, path: &Path) -> Result<DocumentFacts, AnalyzeError> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::analyze_sync(&path))
            .await
            .map_err(|e| AnalyzeError::Failed(format!("analysis task panicked: {}", e)))?
    }

    async fn extract_text(&self, path: &Path) -> Result<String, AnalyzeError> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::extract_text_sync(&path))
            .await
            .map_err(|e| AnalyzeError::Failed(format!("extraction task panicked: {}", e)))?
    }
}

/// Parse the key/value output of `pdfinfo`.
fn parse_pdfinfo_output(output: &str) -> DocumentFacts {
    let mut facts = DocumentFacts::default();

    for line in output.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Pages" => facts.page_count = value.parse().unwrap_or(0),
            "Encrypted" => facts.is_encrypted = value.starts_with("yes"),
            "Form" => facts.has_forms = value != "none",
            "PDF version" => facts.pdf_version = value.to_string(),
            "Title" => facts.title = value.to_string(),
            "Author" => facts.author = value.to_string(),
            "Subject" => facts.subject = value.to_string(),
            "Creator" => facts.creator = value.to_string(),
            "Producer" => facts.producer = value.to_string(),
            "CreationDate" => facts.creation_date = value.to_string(),
            "ModDate" => facts.modification_date = value.to_string(),
            _ => {}
        }
    }

    facts
}

/// Count image rows in `pdfimages -list` output (two header lines,
/// then one row per image).
fn parse_pdfimages_listing(listing: &str) -> u32 {
    listing
        .lines()
        .skip(2)
        .filter(|l| !l.trim().is_empty())
        .count() as u32
}
