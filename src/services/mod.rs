//! Run-level services.
//!
//! Services compose the batch engine with the document capabilities
//! and emit progress events over a channel; rendering is left to the
//! caller.

mod analyze;
mod extract;

pub use analyze::{AnalyzeEvent, AnalyzeRunOutput, AnalyzeService};
pub use extract::{ExtractEvent, ExtractService};

use std::path::PathBuf;

use thiserror::Error;

use crate::batch::DispatchError;

/// Fatal, batch-aborting conditions. Per-file failures never surface
/// here; they live inside the outcomes.
#[derive(Debug, Error)]
pub enum BatchRunError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("No input files matched")]
    NoFiles,

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error(transparent)]
    Report(#[from] crate::batch::ReportError),
}

/// Shared per-run options resolved from settings and CLI flags.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub inputs: Vec<PathBuf>,
    pub pattern: String,
    pub recursive: bool,
    pub workers: usize,
    pub per_file_timeout: Option<std::time::Duration>,
    /// Install a Ctrl-C handler that cancels queued work. Off in
    /// tests.
    pub handle_signals: bool,
}
