//! Structured extraction command.

use std::path::PathBuf;
use std::sync::Arc;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::mpsc;

use crate::config::Settings;
use crate::extract::{Schema, SchemaExtractor};
use crate::llm::LlmClient;
use crate::pdf::PopplerAnalyzer;
use crate::services::{ExtractEvent, ExtractService, RunOptions};

use super::super::helpers::{expand_path, truncate};

pub struct ExtractArgs {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub schema: String,
    pub workers: Option<usize>,
    pub recursive: bool,
    pub pattern: Option<String>,
    pub model: Option<String>,
}

pub async fn cmd_extract(settings: &Settings, args: ExtractArgs) -> anyhow::Result<()> {
    let schema = Schema::by_name(&args.schema)
        .ok_or_else(|| anyhow::anyhow!("Unknown schema '{}' (see `pdftriage schemas`)", args.schema))?;
    let workers = settings.resolve_workers(args.workers)?;

    let mut llm_config = settings.llm.clone();
    if let Some(model) = &args.model {
        llm_config = llm_config.with_model(model);
    }
    let client = LlmClient::from_config(llm_config);
    if client.is_none() {
        println!(
            "{} No AI credential configured, using pattern extraction",
            style("!").yellow()
        );
    }
    let extractor = SchemaExtractor::new(client);

    let options = RunOptions {
        inputs: args.inputs.iter().map(|p| expand_path(p)).collect(),
        pattern: args.pattern.unwrap_or_else(|| settings.pattern.clone()),
        recursive: args.recursive || settings.recursive,
        workers,
        per_file_timeout: settings.per_file_timeout(),
        handle_signals: true,
    };
    let output_dir = expand_path(&args.output);

    let (event_tx, mut event_rx) = mpsc::channel(256);
    let service = ExtractService::new(Arc::new(PopplerAnalyzer::new()), extractor);
    let run_options = options.clone();
    let run_output_dir = output_dir.clone();
    let run = tokio::spawn(async move {
        service
            .run(&run_options, schema, &run_output_dir, event_tx)
            .await
    });

    let mut progress: Option<ProgressBar> = None;
    while let Some(event) = event_rx.recv().await {
        match event {
            ExtractEvent::Started { total, workers } => {
                println!(
                    "{} Extracting {} files with schema '{}' using {} workers",
                    style("→").cyan(),
                    total,
                    schema.name(),
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
            ExtractEvent::FileCompleted { file_name, .. } => {
                if let Some(bar) = &progress {
                    bar.set_message(truncate(&file_name, 40));
                    bar.inc(1);
                }
            }
        }
    }

    let summary = run.await??;
    if let Some(bar) = progress.take() {
        bar.finish_and_clear();
    }

    println!(
        "{} Processed {} files, {} failed",
        style("✓").green(),
        summary.processed.len(),
        summary.failed.len()
    );
    for failed in &summary.failed {
        println!("  {} {}: {}", style("✗").red(), failed.file, failed.error);
    }
    println!("Records saved to {}", output_dir.display());

    Ok(())
}
