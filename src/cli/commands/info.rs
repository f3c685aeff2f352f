//! Single-file inspection command.

use std::path::Path;

use console::style;

use crate::pdf::{PageAnalyzer, PopplerAnalyzer};

use super::super::helpers::{expand_path, format_bytes};

fn or_unspecified(value: &str) -> &str {
    if value.is_empty() {
        "Not specified"
    } else {
        value
    }
}

/// Print a human-readable report for one PDF. Unlike batch runs, the
/// classified error propagates directly.
pub async fn cmd_info(file: &Path, show_text: bool, text_limit: usize) -> anyhow::Result<()> {
    let path = expand_path(file);
    let analyzer = PopplerAnalyzer::new();
    let facts = analyzer.analyze(&path).await?;
    let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

    println!("\n{}", style("PDF Analysis Report").bold());
    println!("{}", "=".repeat(60));
    println!("File: {}", path.display());

    println!("\n{}", style("Basic Information").cyan());
    println!("  {:<18} {}", "Pages:", facts.page_count);
    println!("  {:<18} {}", "File size:", format_bytes(size));
    println!("  {:<18} {}", "PDF version:", or_unspecified(&facts.pdf_version));
    println!(
        "  {:<18} {}",
        "Encrypted:",
        if facts.is_encrypted { "Yes" } else { "No" }
    );
    println!(
        "  {:<18} {}",
        "Form fields:",
        if facts.has_forms { "Yes" } else { "No" }
    );
    println!("  {:<18} {}", "Images:", facts.total_images);
    println!("  {:<18} {}", "Text length:", facts.total_text_length);

    println!("\n{}", style("Metadata").cyan());
    println!("  {:<18} {}", "Title:", or_unspecified(&facts.title));
    println!("  {:<18} {}", "Author:", or_unspecified(&facts.author));
    println!("  {:<18} {}", "Subject:", or_unspecified(&facts.subject));
    println!("  {:<18} {}", "Creator:", or_unspecified(&facts.creator));
    println!("  {:<18} {}", "Producer:", or_unspecified(&facts.producer));
    println!(
        "  {:<18} {}",
        "Created:",
        or_unspecified(&facts.creation_date)
    );
    println!(
        "  {:<18} {}",
        "Modified:",
        or_unspecified(&facts.modification_date)
    );

    if show_text {
        let text = analyzer.extract_text(&path).await?;
        let preview: String = text.chars().take(text_limit).collect();
        println!("\n{}", style("Text Preview").cyan());
        if preview.trim().is_empty() {
            println!("  (no extractable text)");
        } else {
            println!("{}", preview);
            if text.chars().count() > text_limit {
                println!("{}", style("  [truncated]").dim());
            }
        }
    }

    Ok(())
}
