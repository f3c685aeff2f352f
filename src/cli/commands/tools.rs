//! External tool availability command.

use console::style;

use crate::config::Settings;
use crate::pdf::PopplerAnalyzer;

pub fn cmd_tools(settings: &Settings) -> anyhow::Result<()> {
    println!("\n{}", style("Tool Status").bold());
    println!("{}", "-".repeat(40));

    let mut all_found = true;
    for (tool, available) in PopplerAnalyzer::check_tools() {
        let status = if available {
            style("✓ found").green()
        } else {
            all_found = false;
            style("✗ not found").red()
        };
        println!("  {:<15} {}", tool, status);
    }
    if !all_found {
        println!("\n  {}", style("Install poppler-utils for PDF analysis").dim());
    }

    let ai_status = if settings.llm.has_credentials() {
        style("✓ credential configured").green()
    } else {
        style("○ no credential (pattern extraction only)").yellow()
    };
    println!("\n  {:<15} {}", "AI extraction", ai_status);

    Ok(())
}
