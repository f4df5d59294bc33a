//! Error types for the table model

use std::path::PathBuf;
use thiserror::Error;

/// Result type for table operations
pub type TableResult<T> = Result<T, TableError>;

/// Structural and format errors raised by the table model
#[derive(Error, Debug)]
pub enum TableError {
    /// Identifier lists do not match the matrix dimensions
    #[error(
        "shape mismatch: matrix is {matrix_rows}x{matrix_cols} but {row_ids} row ids and {col_ids} column ids were given"
    )]
    ShapeMismatch {
        matrix_rows: usize,
        matrix_cols: usize,
        row_ids: usize,
        col_ids: usize,
    },

    /// A column identifier appears more than once
    #[error("duplicate column id: {0}")]
    DuplicateColumn(String),

    /// A requested column identifier is not present in the table
    #[error("unknown column id: {0}")]
    UnknownColumn(String),

    /// Two tables passed to concat share a column identifier
    #[error("column id '{id}' appears in both table {first} and table {second}")]
    ColumnCollision {
        id: String,
        first: usize,
        second: usize,
    },

    /// A table passed to concat has a different feature axis than the first
    #[error("row ids of table {index} differ from the row ids of table 0")]
    RowAxisMismatch { index: usize },

    /// A matrix entry lies outside the declared shape
    #[error("entry ({row}, {col}) lies outside a {rows}x{cols} matrix")]
    EntryOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Malformed serialized content
    #[error("malformed {format} content: {message}")]
    Format {
        format: &'static str,
        message: String,
    },

    /// Reading an input file failed
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl TableError {
    /// Create a BIOM format error
    pub fn biom(message: impl Into<String>) -> Self {
        Self::Format {
            format: "BIOM",
            message: message.into(),
        }
    }

    /// Create a Matrix Market format error
    pub fn matrix_market(message: impl Into<String>) -> Self {
        Self::Format {
            format: "Matrix Market",
            message: message.into(),
        }
    }
}
