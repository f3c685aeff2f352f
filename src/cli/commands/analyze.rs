//! Batch analysis command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::batch::{write_report, ReportFormat, ReportMetadata};
use crate::config::Settings;
use crate::models::BatchStatistics;
use crate::pdf::PopplerAnalyzer;
use crate::services::{AnalyzeEvent, AnalyzeService, RunOptions};

use super::super::helpers::{expand_path, truncate};

pub struct AnalyzeArgs {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub format: ReportFormat,
    pub workers: Option<usize>,
    pub recursive: bool,
    pub pattern: Option<String>,
    pub timeout: Option<u64>,
    pub stats: bool,
}

pub async fn cmd_analyze(settings: &Settings, args: AnalyzeArgs) -> anyhow::Result<()> {
    let workers = settings.resolve_workers(args.workers)?;
    let inputs: Vec<PathBuf> = args.inputs.iter().map(|p| expand_path(p)).collect();
    let single_file = inputs.len() == 1 && inputs[0].is_file();

    let options = RunOptions {
        inputs,
        pattern: args.pattern.unwrap_or_else(|| settings.pattern.clone()),
        recursive: args.recursive || settings.recursive,
        workers,
        per_file_timeout: args
            .timeout
            .map(Duration::from_secs)
            .or_else(|| settings.per_file_timeout()),
        handle_signals: true,
    };

    let (event_tx, mut event_rx) = mpsc::channel(256);
    let service = AnalyzeService::new(Arc::new(PopplerAnalyzer::new()));
    let run_options = options.clone();
    let run = tokio::spawn(async move { service.run(&run_options, event_tx).await });

    let mut progress: Option<ProgressBar> = None;
    while let Some(event) = event_rx.recv().await {
        match event {
            AnalyzeEvent::Started { total, workers } => {
                println!(
                    "{} Analyzing {} files with {} workers",
                    style("→").cyan(),
                    total,
                    workers
                );
                let bar = ProgressBar::new(total as u64);
                bar.set_style(
                    ProgressStyle::default_bar()
                        .template(
                            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec}) {msg}",
                        )
                        .unwrap()
                        .progress_chars("#>-"),
                );
                progress = Some(bar);
            }
            AnalyzeEvent::FileCompleted { file_name, .. } => {
                if let Some(bar) = &progress {
                    bar.set_message(truncate(&file_name, 40));
                    bar.inc(1);
                }
            }
        }
    }

    let output_run = run.await??;
    if let Some(bar) = progress.take() {
        bar.finish_and_clear();
    }

    let report_path = expand_path(&args.output);
    write_report(
        &report_path,
        args.format,
        &output_run.outcomes,
        &output_run.statistics,
        ReportMetadata::new(output_run.outcomes.len(), output_run.workers_used),
    )?;

    let summary = &output_run.statistics.summary;
    println!(
        "{} {} succeeded, {} failed ({}% success rate)",
        style("✓").green(),
        summary.successful,
        summary.failed,
        summary.success_rate
    );
    println!("Report saved to {}", report_path.display());

    if args.stats {
        print_statistics(&output_run.statistics);
    }

    // With a single direct file there is no batch to protect; surface
    // the classified failure as the process result.
    if single_file {
        if let Some(failure) = output_run.outcomes.first().and_then(|o| o.as_failure()) {
            anyhow::bail!("{}: {}", failure.kind, failure.message);
        }
    }

    Ok(())
}

fn print_statistics(stats: &BatchStatistics) {
    println!("\n{}", style("Batch Statistics").bold());
    println!("{}", "-".repeat(40));
    println!("{:<24} {}", "Total files:", stats.summary.total_files);
    println!("{:<24} {}", "Successful:", stats.summary.successful);
    println!("{:<24} {}", "Failed:", stats.summary.failed);
    println!("{:<24} {}%", "Success rate:", stats.summary.success_rate);
    println!(
        "{:<24} {} MB",
        "Total size:", stats.file_statistics.total_size_mb
    );
    println!(
        "{:<24} {}",
        "Total pages:", stats.content_statistics.total_pages
    );
    println!(
        "{:<24} {}",
        "Files with forms:", stats.content_statistics.files_with_forms
    );
    println!(
        "{:<24} {}",
        "Files with images:", stats.content_statistics.files_with_images
    );
    println!(
        "{:<24} {}s",
        "Total processing time:",
        stats.processing_statistics.total_processing_time_seconds
    );

    if !stats.errors.is_empty() {
        println!("\n{}", style("Errors").bold());
        for entry in &stats.errors {
            println!("  {} {}: {}", style("✗").red(), entry.file, entry.error);
        }
    }
}
