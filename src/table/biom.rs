//! BIOM 1.0 JSON encoding.
//!
//! Both sparse (`[row, col, value]` triplets) and dense (row lists) matrix
//! layouts are accepted on read; tables are always written sparse. Row and
//! column metadata is not modelled and is written as `null`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::{TableError, TableResult};
use super::{SparseMatrix, Table};

pub const FORMAT_NAME: &str = "Biological Observation Matrix 1.0.0";
pub const FORMAT_URL: &str = "http://biom-format.org";

/// Provenance written into chunk files handed to the regrouping tool
pub const CHUNK_PROVENANCE: &str = "splits";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixType {
    Sparse,
    Dense,
}

/// `D` is one `data` entry: `Vec<f64>` on read covers both layouts, while
/// writes use `(usize, usize, f64)` so indices stay integers.
#[derive(Debug, Serialize, Deserialize)]
struct BiomDocument<D = Vec<f64>> {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    format_url: Option<String>,
    #[serde(rename = "type", default)]
    table_type: Option<String>,
    #[serde(default)]
    generated_by: Option<String>,
    #[serde(default)]
    date: Option<String>,
    matrix_type: MatrixType,
    #[serde(default)]
    matrix_element_type: Option<String>,
    shape: [usize; 2],
    data: Vec<D>,
    rows: Vec<AxisEntry>,
    columns: Vec<AxisEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct AxisEntry {
    id: String,
    #[serde(default)]
    metadata: Option<Value>,
}

impl AxisEntry {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            metadata: None,
        }
    }
}

/// Provenance string recorded in a BIOM document, if any
pub fn generated_by(json: &str) -> TableResult<Option<String>> {
    let doc: BiomDocument = serde_json::from_str(json).map_err(|e| TableError::biom(e.to_string()))?;
    Ok(doc.generated_by)
}

/// Encode `table` as a BIOM 1.0 JSON document
pub fn to_json(table: &Table, generated_by: &str) -> TableResult<String> {
    let doc: BiomDocument<(usize, usize, f64)> = BiomDocument {
        id: None,
        format: Some(FORMAT_NAME.to_string()),
        format_url: Some(FORMAT_URL.to_string()),
        table_type: Some("Function table".to_string()),
        generated_by: Some(generated_by.to_string()),
        date: Some(Utc::now().to_rfc3339()),
        matrix_type: MatrixType::Sparse,
        matrix_element_type: Some("float".to_string()),
        shape: [table.n_rows(), table.n_cols()],
        data: table.matrix().triplets().collect(),
        rows: table.row_ids().iter().map(|id| AxisEntry::new(id)).collect(),
        columns: table.col_ids().iter().map(|id| AxisEntry::new(id)).collect(),
    };
    serde_json::to_string(&doc).map_err(|e| TableError::biom(e.to_string()))
}

/// Decode a BIOM 1.0 JSON document into a table
pub fn from_json(json: &str) -> TableResult<Table> {
    let doc: BiomDocument = serde_json::from_str(json).map_err(|e| TableError::biom(e.to_string()))?;
    let [rows, cols] = doc.shape;

    let matrix = match doc.matrix_type {
        MatrixType::Sparse => {
            let mut triplets = Vec::with_capacity(doc.data.len());
            for entry in &doc.data {
                let [row, col, value] = entry.as_slice() else {
                    return Err(TableError::biom(format!(
                        "sparse entry must have 3 elements, found {}",
                        entry.len()
                    )));
                };
                triplets.push((to_index(*row)?, to_index(*col)?, *value));
            }
            SparseMatrix::from_triplets(rows, cols, triplets)?
        }
        MatrixType::Dense => {
            if doc.data.len() != rows {
                return Err(TableError::biom(format!(
                    "dense data has {} rows, shape declares {}",
                    doc.data.len(),
                    rows
                )));
            }
            SparseMatrix::from_dense_rows(&doc.data, cols)?
        }
    };

    Table::new(
        matrix,
        doc.rows.into_iter().map(|entry| entry.id).collect(),
        doc.columns.into_iter().map(|entry| entry.id).collect(),
    )
}

fn to_index(value: f64) -> TableResult<usize> {
    if value < 0.0 || value.fract() != 0.0 {
        return Err(TableError::biom(format!("invalid matrix index {value}")));
    }
    Ok(value as usize)
}
