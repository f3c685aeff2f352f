//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to
//! command-specific modules.

mod analyze;
mod extract;
mod info;
mod schemas;
mod tools;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::batch::ReportFormat;
use crate::config::load_settings;

#[derive(Parser)]
#[command(name = "pdftriage")]
#[command(about = "PDF batch analysis and structured extraction system")]
#[command(version)]
pub struct Cli {
    /// Config file path (overrides auto-discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze PDFs in parallel and generate a batch report
    Analyze {
        /// Input PDF files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output report path
        #[arg(short, long)]
        output: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = ReportFormat::Json)]
        format: ReportFormat,

        /// Number of parallel workers (default: auto, capped at 8)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Process directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// File pattern for directory inputs (default: *.pdf)
        #[arg(short, long)]
        pattern: Option<String>,

        /// Per-file analysis budget in seconds
        #[arg(long)]
        timeout: Option<u64>,

        /// Print aggregate statistics after the run
        #[arg(short, long)]
        stats: bool,
    },

    /// Extract structured data from PDFs using a named schema
    Extract {
        /// Input PDF files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Directory for extracted records
        #[arg(short, long, default_value = "./extracted_data")]
        output: PathBuf,

        /// Schema to apply (client, immigration, legal)
        #[arg(short, long, default_value = "client")]
        schema: String,

        /// Number of parallel workers (default: auto, capped at 8)
        #[arg(short, long)]
        workers: Option<usize>,

        /// Process directories recursively
        #[arg(short, long)]
        recursive: bool,

        /// File pattern for directory inputs (default: *.pdf)
        #[arg(short, long)]
        pattern: Option<String>,

        /// Model to use for AI extraction (overrides config)
        #[arg(long)]
        model: Option<String>,
    },

    /// Show a detailed report for a single PDF
    Info {
        /// PDF file to inspect
        file: PathBuf,

        /// Include a text preview
        #[arg(long)]
        text: bool,

        /// Maximum characters of text preview
        #[arg(long, default_value = "1000")]
        text_limit: usize,
    },

    /// List built-in extraction schemas
    Schemas,

    /// Check external tool availability
    Tools,
}

/// Parse arguments and dispatch to the matching command.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Analyze {
            inputs,
            output,
            format,
            workers,
            recursive,
            pattern,
            timeout,
            stats,
        } => {
            analyze::cmd_analyze(
                &settings,
                analyze::AnalyzeArgs {
                    inputs,
                    output,
                    format,
                    workers,
                    recursive,
                    pattern,
                    timeout,
                    stats,
                },
            )
            .await
        }
        Commands::Extract {
            inputs,
            output,
            schema,
            workers,
            recursive,
            pattern,
            model,
        } => {
            extract::cmd_extract(
                &settings,
                extract::ExtractArgs {
                    inputs,
                    output,
                    schema,
                    workers,
                    recursive,
                    pattern,
                    model,
                },
            )
            .await
        }
        Commands::Info {
            file,
            text,
            text_limit,
        } => info::cmd_info(&file, text, text_limit).await,
        Commands::Schemas => schemas::cmd_schemas(),
        Commands::Tools => tools::cmd_tools(&settings),
    }
}
