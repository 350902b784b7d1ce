//! Client-side CSV import pipeline.
//!
//! The pieces, leaves first:
//! - `parser`: splits raw text into trimmed, whitespace-collapsed cells.
//! - `validator`: checks headers and cells against an `ImportSchema`.
//! - `progress`: monotonic upload progress.
//! - `monitor`: state machine for polling a queued import task.
//! - `session`: owns one dialog's file, upload and task state.

mod monitor;
mod parser;
mod progress;
mod session;
mod validator;

pub use monitor::{
    AsyncTask, CompletionAction, MonitorEvent, TaskMonitor, TaskStatus, FAILED_FALLBACK_MESSAGE,
    POLL_INTERVAL,
};
pub use parser::{normalize_cell, parse_rows, ParsedTable};
pub use progress::UploadProgress;
pub use session::{ImportSession, UploadJob, UploadOutcome};
pub use validator::{validate_table, validate_text, ValidationOutcome, EMPTY_FILE_ERROR};

/// Errors raised by session operations that were called in the wrong state.
///
/// Validation problems are never reported through this type; they end up in
/// `ValidationOutcome::errors`.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ImportError {
    #[error("an upload or import is already in progress")]
    Busy,
    #[error("no file has been selected")]
    NoFile,
    #[error("the selected file has validation errors")]
    InvalidFile,
    #[error("task {0} is already being processed")]
    AlreadyProcessing(String),
    #[error("unknown import type \"{0}\"")]
    UnknownImportKind(String),
}
