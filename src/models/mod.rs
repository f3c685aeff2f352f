//! Data models for pdftriage.

mod extraction;
mod report;

pub use extraction::{ExtractionMethod, ExtractionRecord, ExtractionSummary, FailedFile};
pub use report::{
    AnalysisResult, BatchStatistics, ContentStatistics, ErrorEntry, ErrorKind, FileFailure,
    FileOutcome, FileStatistics, ProcessingStatistics, SummaryStatistics, WorkItem,
};

pub(crate) use report::round2;
