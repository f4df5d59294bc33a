//! Compressed sparse column storage for abundance values

use super::error::{TableError, TableResult};

/// Sparse matrix in compressed-sparse-column layout.
///
/// Explicit zeros are never stored, and row indices within a column are
/// kept in ascending order. Column-major layout makes the two operations the
/// pipeline needs, column sub-selection and horizontal stacking, plain
/// slice copies.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseMatrix {
    rows: usize,
    cols: usize,
    col_ptr: Vec<usize>,
    row_idx: Vec<usize>,
    values: Vec<f64>,
}

impl SparseMatrix {
    /// Create an all-zero matrix of the given shape
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            col_ptr: vec![0; cols + 1],
            row_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Build a matrix from `(row, col, value)` triplets.
    ///
    /// Triplets may arrive in any order. Repeated coordinates are summed and
    /// entries that end up zero are dropped.
    pub fn from_triplets<I>(rows: usize, cols: usize, triplets: I) -> TableResult<Self>
    where
        I: IntoIterator<Item = (usize, usize, f64)>,
    {
        let mut entries = Vec::new();
        for (row, col, value) in triplets {
            if row >= rows || col >= cols {
                return Err(TableError::EntryOutOfBounds {
                    row,
                    col,
                    rows,
                    cols,
                });
            }
            entries.push((col, row, value));
        }
        entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));

        let mut merged: Vec<(usize, usize, f64)> = Vec::with_capacity(entries.len());
        for (col, row, value) in entries {
            match merged.last_mut() {
                Some(last) if last.0 == col && last.1 == row => last.2 += value,
                _ => merged.push((col, row, value)),
            }
        }

        let mut matrix = Self::zeros(rows, cols);
        for (col, row, value) in merged {
            if value == 0.0 {
                continue;
            }
            matrix.row_idx.push(row);
            matrix.values.push(value);
            matrix.col_ptr[col + 1] += 1;
        }
        for col in 0..cols {
            matrix.col_ptr[col + 1] += matrix.col_ptr[col];
        }
        Ok(matrix)
    }

    /// Build a matrix from dense row-major data
    pub fn from_dense_rows(rows: &[Vec<f64>], cols: usize) -> TableResult<Self> {
        let mut triplets = Vec::new();
        for (r, row) in rows.iter().enumerate() {
            if row.len() != cols {
                return Err(TableError::ShapeMismatch {
                    matrix_rows: rows.len(),
                    matrix_cols: row.len(),
                    row_ids: rows.len(),
                    col_ids: cols,
                });
            }
            for (c, value) in row.iter().enumerate() {
                if *value != 0.0 {
                    triplets.push((r, c, *value));
                }
            }
        }
        Self::from_triplets(rows.len(), cols, triplets)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of stored (non-zero) entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Value at `(row, col)`, zero when not stored
    pub fn get(&self, row: usize, col: usize) -> f64 {
        if row >= self.rows || col >= self.cols {
            return 0.0;
        }
        let range = self.col_ptr[col]..self.col_ptr[col + 1];
        match self.row_idx[range.clone()].binary_search(&row) {
            Ok(offset) => self.values[range.start + offset],
            Err(_) => 0.0,
        }
    }

    /// Stored entries of one column as `(row, value)` pairs
    pub fn column(&self, col: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let range = self.col_ptr[col]..self.col_ptr[col + 1];
        self.row_idx[range.clone()]
            .iter()
            .copied()
            .zip(self.values[range].iter().copied())
    }

    /// Sum of one column
    pub fn column_sum(&self, col: usize) -> f64 {
        self.column(col).map(|(_, value)| value).sum()
    }

    /// All stored entries as `(row, col, value)`, column-major
    pub fn triplets(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.cols).flat_map(move |col| self.column(col).map(move |(row, v)| (row, col, v)))
    }

    /// New matrix holding the given columns, in the given order
    pub fn select_columns(&self, cols: &[usize]) -> Self {
        let mut selected = Self::zeros(self.rows, cols.len());
        selected.col_ptr.clear();
        selected.col_ptr.push(0);
        for &col in cols {
            let range = self.col_ptr[col]..self.col_ptr[col + 1];
            selected.row_idx.extend_from_slice(&self.row_idx[range.clone()]);
            selected.values.extend_from_slice(&self.values[range]);
            selected.col_ptr.push(selected.values.len());
        }
        selected
    }

    /// Stack matrices side by side. All inputs must have the same row count.
    pub fn hstack(matrices: &[&SparseMatrix]) -> TableResult<Self> {
        let Some(first) = matrices.first() else {
            return Ok(Self::zeros(0, 0));
        };
        let rows = first.rows;
        let cols = matrices.iter().map(|m| m.cols).sum();

        let mut stacked = Self::zeros(rows, cols);
        stacked.col_ptr.clear();
        stacked.col_ptr.push(0);
        for matrix in matrices {
            if matrix.rows != rows {
                return Err(TableError::ShapeMismatch {
                    matrix_rows: matrix.rows,
                    matrix_cols: matrix.cols,
                    row_ids: rows,
                    col_ids: matrix.cols,
                });
            }
            let offset = stacked.values.len();
            stacked.row_idx.extend_from_slice(&matrix.row_idx);
            stacked.values.extend_from_slice(&matrix.values);
            stacked
                .col_ptr
                .extend(matrix.col_ptr[1..].iter().map(|ptr| ptr + offset));
        }
        Ok(stacked)
    }
}
