use std::path::PathBuf;
use thiserror::Error;

pub mod codes;

pub use codes::{describe_error_code, ErrorCode};

use crate::pipeline::state::PipelineState;
use crate::storage::StorageError;
use crate::subprocess::{ExitStatus, ProcessError};
use crate::table::TableError;

/// Result type for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Every error that can abort a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Malformed invocation arguments or configuration values
    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Table error: {0}")]
    Table(#[from] TableError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The regrouping process could not be started
    #[error("Failed to run regrouping process: {0}")]
    Process(#[from] ProcessError),

    /// The regrouping process ran and reported failure
    #[error("Regrouping of chunk {index} failed with {status}: {}", stderr_summary(.stderr))]
    ExternalProcessFailure {
        index: usize,
        status: ExitStatus,
        stderr: String,
    },

    /// The regrouping process exited successfully without writing its output
    #[error("Regrouping of chunk {index} exited successfully but did not write {}", .path.display())]
    MissingOutput { index: usize, path: PathBuf },

    #[error("Invalid pipeline transition from {from} on {event}")]
    InvalidTransition { from: PipelineState, event: String },
}

fn stderr_summary(stderr: &str) -> &str {
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        "no error output"
    } else {
        trimmed
    }
}

impl PipelineError {
    /// Create an argument error
    pub fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Get the error code
    pub fn code(&self) -> u16 {
        match self {
            Self::Argument(_) => ErrorCode::ARGUMENT_INVALID,
            Self::Table(err) => table_code(err),
            Self::Storage(StorageError::Io { .. }) => ErrorCode::STORAGE_IO_ERROR,
            Self::Storage(StorageError::NotFound(_)) => ErrorCode::STORAGE_NOT_FOUND,
            Self::Storage(StorageError::Format { .. }) => ErrorCode::STORAGE_CORRUPTED,
            Self::Process(ProcessError::CommandNotFound(_)) => ErrorCode::EXEC_COMMAND_NOT_FOUND,
            Self::Process(ProcessError::SpawnFailed { .. }) => ErrorCode::EXEC_SPAWN_FAILED,
            Self::Process(_) => ErrorCode::EXEC_GENERIC,
            Self::ExternalProcessFailure {
                status: ExitStatus::Signal(_),
                ..
            } => ErrorCode::EXEC_SIGNAL_RECEIVED,
            Self::ExternalProcessFailure { .. } => ErrorCode::EXEC_SUBPROCESS_FAILED,
            Self::MissingOutput { .. } => ErrorCode::EXEC_MISSING_OUTPUT,
            Self::InvalidTransition { .. } => ErrorCode::PIPELINE_INVALID_TRANSITION,
        }
    }

    /// Message prefixed with the error code, e.g. `[E4003] Regrouping ...`
    pub fn coded_message(&self) -> String {
        format!("[E{:04}] {}", self.code(), self)
    }
}

fn table_code(err: &TableError) -> u16 {
    match err {
        TableError::ShapeMismatch { .. } => ErrorCode::TABLE_SHAPE_MISMATCH,
        TableError::DuplicateColumn(_) => ErrorCode::TABLE_DUPLICATE_COLUMN,
        TableError::UnknownColumn(_) => ErrorCode::TABLE_UNKNOWN_COLUMN,
        TableError::ColumnCollision { .. } => ErrorCode::TABLE_COLUMN_COLLISION,
        TableError::RowAxisMismatch { .. } => ErrorCode::TABLE_ROW_AXIS_MISMATCH,
        TableError::EntryOutOfBounds { .. } => ErrorCode::TABLE_ENTRY_OUT_OF_BOUNDS,
        TableError::Format { .. } => ErrorCode::TABLE_FORMAT,
        TableError::Io { .. } => ErrorCode::TABLE_GENERIC,
    }
}
