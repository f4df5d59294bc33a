//! Sparse feature-by-sample abundance tables
//!
//! A [`Table`] pairs a [`SparseMatrix`] with ordered row (feature) and column
//! (sample) identifiers. Tables are immutable values: sub-selection and
//! concatenation always produce a new table.
//!
//! - `matrix` - compressed sparse column storage
//! - `biom` - BIOM 1.0 JSON encoding used for every file the pipeline touches
//! - `mtx` - Matrix Market reader for building a table from raw parts

pub mod biom;
pub mod error;
pub mod matrix;
pub mod mtx;

pub use error::{TableError, TableResult};
pub use matrix::SparseMatrix;

use std::collections::{HashMap, HashSet};
use std::ops::Range;

/// Sparse abundance table with feature rows and sample columns
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    matrix: SparseMatrix,
    row_ids: Vec<String>,
    col_ids: Vec<String>,
}

impl Table {
    /// Construct a table from a matrix and its identifier lists.
    ///
    /// Fails with `ShapeMismatch` when the id lists do not match the matrix
    /// dimensions, and with `DuplicateColumn` when a column id repeats.
    pub fn new(
        matrix: SparseMatrix,
        row_ids: Vec<String>,
        col_ids: Vec<String>,
    ) -> TableResult<Self> {
        if row_ids.len() != matrix.rows() || col_ids.len() != matrix.cols() {
            return Err(TableError::ShapeMismatch {
                matrix_rows: matrix.rows(),
                matrix_cols: matrix.cols(),
                row_ids: row_ids.len(),
                col_ids: col_ids.len(),
            });
        }

        let mut seen = HashSet::with_capacity(col_ids.len());
        if let Some(dup) = col_ids.iter().find(|id| !seen.insert(id.as_str())) {
            return Err(TableError::DuplicateColumn(dup.clone()));
        }

        Ok(Self {
            matrix,
            row_ids,
            col_ids,
        })
    }

    /// Table with no rows and no columns
    pub fn empty() -> Self {
        Self {
            matrix: SparseMatrix::zeros(0, 0),
            row_ids: Vec::new(),
            col_ids: Vec::new(),
        }
    }

    pub fn matrix(&self) -> &SparseMatrix {
        &self.matrix
    }

    pub fn row_ids(&self) -> &[String] {
        &self.row_ids
    }

    pub fn col_ids(&self) -> &[String] {
        &self.col_ids
    }

    pub fn n_rows(&self) -> usize {
        self.row_ids.len()
    }

    pub fn n_cols(&self) -> usize {
        self.col_ids.len()
    }

    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    /// Value for a feature/sample pair, `None` if either id is unknown
    pub fn get(&self, row_id: &str, col_id: &str) -> Option<f64> {
        let row = self.row_ids.iter().position(|id| id == row_id)?;
        let col = self.col_ids.iter().position(|id| id == col_id)?;
        Some(self.matrix.get(row, col))
    }

    /// Per-sample totals, in column order
    pub fn column_totals(&self) -> Vec<f64> {
        (0..self.n_cols())
            .map(|col| self.matrix.column_sum(col))
            .collect()
    }

    /// New table restricted to `col_ids`, in the order given.
    ///
    /// Fails with `UnknownColumn` if any id is absent and with
    /// `DuplicateColumn` if an id is requested twice.
    pub fn select_columns<S: AsRef<str>>(&self, col_ids: &[S]) -> TableResult<Self> {
        let index: HashMap<&str, usize> = self
            .col_ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.as_str(), i))
            .collect();

        let mut positions = Vec::with_capacity(col_ids.len());
        let mut seen = HashSet::with_capacity(col_ids.len());
        for id in col_ids {
            let id = id.as_ref();
            let position = index
                .get(id)
                .copied()
                .ok_or_else(|| TableError::UnknownColumn(id.to_string()))?;
            if !seen.insert(position) {
                return Err(TableError::DuplicateColumn(id.to_string()));
            }
            positions.push(position);
        }

        Ok(self.select_positions(&positions))
    }

    /// New table holding the columns at positions `range`
    pub(crate) fn slice_columns(&self, range: Range<usize>) -> Self {
        let positions: Vec<usize> = range.collect();
        self.select_positions(&positions)
    }

    fn select_positions(&self, positions: &[usize]) -> Self {
        Self {
            matrix: self.matrix.select_columns(positions),
            row_ids: self.row_ids.clone(),
            col_ids: positions.iter().map(|&i| self.col_ids[i].clone()).collect(),
        }
    }

    /// Concatenate tables along the sample axis.
    ///
    /// Every input must share the first table's row ids, in the same order,
    /// and no column id may appear in more than one input. Columns of the
    /// result follow input order, then each input's own column order.
    pub fn concat(tables: &[Table]) -> TableResult<Self> {
        let Some(first) = tables.first() else {
            return Ok(Self::empty());
        };

        let mut owner: HashMap<&str, usize> = HashMap::new();
        for (index, table) in tables.iter().enumerate() {
            if table.row_ids != first.row_ids {
                return Err(TableError::RowAxisMismatch { index });
            }
            for id in &table.col_ids {
                if let Some(&previous) = owner.get(id.as_str()) {
                    return Err(TableError::ColumnCollision {
                        id: id.clone(),
                        first: previous,
                        second: index,
                    });
                }
                owner.insert(id.as_str(), index);
            }
        }

        let matrices: Vec<&SparseMatrix> = tables.iter().map(|t| &t.matrix).collect();
        let matrix = SparseMatrix::hstack(&matrices)?;
        let col_ids = tables
            .iter()
            .flat_map(|t| t.col_ids.iter().cloned())
            .collect();

        Ok(Self {
            matrix,
            row_ids: first.row_ids.clone(),
            col_ids,
        })
    }
}
