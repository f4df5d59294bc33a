//! Build a table from a Matrix Market file plus identifier list files

use std::path::Path;
use tokio::fs;

use super::error::{TableError, TableResult};
use super::{SparseMatrix, Table};

/// Parse a Matrix Market `coordinate` file with `general` symmetry.
///
/// `real`, `integer` and `pattern` fields are supported; pattern entries
/// get the value 1.
pub fn parse_matrix_market(content: &str) -> TableResult<SparseMatrix> {
    let mut lines = content.lines();

    let header = lines
        .next()
        .ok_or_else(|| TableError::matrix_market("empty input"))?;
    let banner: Vec<String> = header
        .split_whitespace()
        .map(|s| s.to_ascii_lowercase())
        .collect();
    if banner.len() != 5 || banner[0] != "%%matrixmarket" || banner[1] != "matrix" {
        return Err(TableError::matrix_market(format!(
            "unrecognised header: {header}"
        )));
    }
    if banner[2] != "coordinate" {
        return Err(TableError::matrix_market(format!(
            "only coordinate layout is supported, found {}",
            banner[2]
        )));
    }
    let pattern = match banner[3].as_str() {
        "real" | "integer" | "double" => false,
        "pattern" => true,
        other => {
            return Err(TableError::matrix_market(format!(
                "unsupported field type {other}"
            )))
        }
    };
    if banner[4] != "general" {
        return Err(TableError::matrix_market(format!(
            "only general symmetry is supported, found {}",
            banner[4]
        )));
    }

    let mut data_lines = lines
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('%'));

    let size_line = data_lines
        .next()
        .ok_or_else(|| TableError::matrix_market("missing size line"))?;
    let size: Vec<usize> = size_line
        .split_whitespace()
        .map(|v| v.parse::<usize>())
        .collect::<Result<_, _>>()
        .map_err(|e| TableError::matrix_market(format!("bad size line '{size_line}': {e}")))?;
    let [rows, cols, nnz] = size.as_slice() else {
        return Err(TableError::matrix_market(format!(
            "size line must have 3 fields: {size_line}"
        )));
    };

    let mut triplets = Vec::with_capacity(*nnz);
    for line in data_lines {
        triplets.push(parse_entry(line, pattern)?);
    }
    if triplets.len() != *nnz {
        return Err(TableError::matrix_market(format!(
            "size line declares {} entries, found {}",
            nnz,
            triplets.len()
        )));
    }

    SparseMatrix::from_triplets(*rows, *cols, triplets)
}

fn parse_entry(line: &str, pattern: bool) -> TableResult<(usize, usize, f64)> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let expected = if pattern { 2 } else { 3 };
    if fields.len() != expected {
        return Err(TableError::matrix_market(format!(
            "expected {expected} fields in entry '{line}'"
        )));
    }

    let coordinate = |field: &str| -> TableResult<usize> {
        match field.parse::<usize>() {
            Ok(0) | Err(_) => Err(TableError::matrix_market(format!(
                "invalid 1-based index '{field}' in entry '{line}'"
            ))),
            Ok(index) => Ok(index - 1),
        }
    };
    let row = coordinate(fields[0])?;
    let col = coordinate(fields[1])?;
    let value = if pattern {
        1.0
    } else {
        fields[2].parse::<f64>().map_err(|e| {
            TableError::matrix_market(format!("invalid value in entry '{line}': {e}"))
        })?
    };
    Ok((row, col, value))
}

/// One identifier per line, trailing whitespace removed
pub fn parse_id_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.trim_end().to_string())
        .collect()
}

async fn read(path: &Path) -> TableResult<String> {
    fs::read_to_string(path).await.map_err(|source| TableError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Assemble a table from a matrix file and its row and column id files
pub async fn load_from_parts(
    matrix_path: &Path,
    row_ids_path: &Path,
    col_ids_path: &Path,
) -> TableResult<Table> {
    let matrix = parse_matrix_market(&read(matrix_path).await?)?;
    let row_ids = parse_id_list(&read(row_ids_path).await?);
    let col_ids = parse_id_list(&read(col_ids_path).await?);

    tracing::debug!(
        "Read {}x{} matrix with {} entries from {}",
        matrix.rows(),
        matrix.cols(),
        matrix.nnz(),
        matrix_path.display()
    );

    Table::new(matrix, row_ids, col_ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MTX: &str = "%%MatrixMarket matrix coordinate integer general\n\
                       % written by a test\n\
                       3 2 3\n\
                       1 1 4\n\
                       3 1 1\n\
                       2 2 9\n";

    #[test]
    fn test_parse_coordinate_integer() {
        let m = parse_matrix_market(MTX).unwrap();
        assert_eq!((m.rows(), m.cols(), m.nnz()), (3, 2, 3));
        assert_eq!(m.get(0, 0), 4.0);
        assert_eq!(m.get(2, 0), 1.0);
        assert_eq!(m.get(1, 1), 9.0);
    }

    #[test]
    fn test_parse_pattern() {
        let m = parse_matrix_market("%%MatrixMarket matrix coordinate pattern general\n2 2 1\n2 1\n")
            .unwrap();
        assert_eq!(m.get(1, 0), 1.0);
    }

    #[test]
    fn test_parse_rejects_array_layout() {
        let result = parse_matrix_market("%%MatrixMarket matrix array real general\n1 1\n1.0\n");
        assert!(matches!(result, Err(TableError::Format { .. })));
    }

    #[test]
    fn test_parse_rejects_entry_count_mismatch() {
        let result =
            parse_matrix_market("%%MatrixMarket matrix coordinate real general\n2 2 2\n1 1 1.0\n");
        assert!(matches!(result, Err(TableError::Format { .. })));
    }

    #[test]
    fn test_parse_rejects_zero_index() {
        let result =
            parse_matrix_market("%%MatrixMarket matrix coordinate real general\n2 2 1\n0 1 1.0\n");
        assert!(matches!(result, Err(TableError::Format { .. })));
    }

    #[test]
    fn test_parse_rejects_out_of_range_entry() {
        let result =
            parse_matrix_market("%%MatrixMarket matrix coordinate real general\n2 2 1\n3 1 1.0\n");
        assert!(matches!(result, Err(TableError::EntryOutOfBounds { .. })));
    }

    #[test]
    fn test_parse_id_list_strips_trailing_whitespace() {
        assert_eq!(parse_id_list("a\nb \r\nc\n"), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_load_from_parts() {
        let dir = TempDir::new().unwrap();
        let mtx = dir.path().join("m.mtx");
        let rows = dir.path().join("rows.txt");
        let cols = dir.path().join("cols.txt");
        std::fs::write(&mtx, MTX).unwrap();
        std::fs::write(&rows, "K00001\nK00002\nK00003\n").unwrap();
        std::fs::write(&cols, "S1\nS2\n").unwrap();

        let table = load_from_parts(&mtx, &rows, &cols).await.unwrap();
        assert_eq!(table.get("K00003", "S1"), Some(1.0));
        assert_eq!(table.col_ids(), &["S1", "S2"]);
    }

    #[tokio::test]
    async fn test_load_from_parts_shape_mismatch() {
        let dir = TempDir::new().unwrap();
        let mtx = dir.path().join("m.mtx");
        let rows = dir.path().join("rows.txt");
        let cols = dir.path().join("cols.txt");
        std::fs::write(&mtx, MTX).unwrap();
        std::fs::write(&rows, "K00001\nK00002\n").unwrap();
        std::fs::write(&cols, "S1\nS2\n").unwrap();

        let result = load_from_parts(&mtx, &rows, &cols).await;
        assert!(matches!(result, Err(TableError::ShapeMismatch { .. })));
    }

    #[tokio::test]
    async fn test_load_from_parts_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = load_from_parts(
            &dir.path().join("nope.mtx"),
            &dir.path().join("r"),
            &dir.path().join("c"),
        )
        .await;
        assert!(matches!(result, Err(TableError::Io { .. })));
    }
}
