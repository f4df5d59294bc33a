//! Position-based assignment of samples to chunks

use crate::error::{PipelineError, PipelineResult};
use crate::table::Table;

/// A contiguous slice of the input table's samples
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// 1-based position of this chunk in partition order
    pub index: usize,
    pub table: Table,
}

/// Number of chunks `partition` produces for `n_cols` samples
pub fn chunk_count(n_cols: usize, chunk_size: usize) -> usize {
    if chunk_size == 0 {
        0
    } else {
        n_cols.div_ceil(chunk_size)
    }
}

/// Split `table` into chunks of `chunk_size` consecutive samples.
///
/// The sample at position `i` lands in chunk `i / chunk_size + 1`. Every
/// chunk but the last holds exactly `chunk_size` samples. A table without
/// samples yields no chunks.
pub fn partition(table: &Table, chunk_size: usize) -> PipelineResult<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(PipelineError::argument("chunk size must be greater than zero"));
    }

    let n = table.n_cols();
    let chunks = (0..n)
        .step_by(chunk_size)
        .enumerate()
        .map(|(i, start)| Chunk {
            index: i + 1,
            table: table.slice_columns(start..start.saturating_add(chunk_size).min(n)),
        })
        .collect();
    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::SparseMatrix;

    fn wide_table(n_cols: usize) -> Table {
        let triplets: Vec<_> = (0..n_cols).map(|c| (c % 3, c, (c + 1) as f64)).collect();
        let matrix = SparseMatrix::from_triplets(3, n_cols, triplets).unwrap();
        Table::new(
            matrix,
            vec!["K1".into(), "K2".into(), "K3".into()],
            (0..n_cols).map(|c| format!("sample_{c}")).collect(),
        )
        .unwrap()
    }

    fn sizes(chunks: &[Chunk]) -> Vec<usize> {
        chunks.iter().map(|c| c.table.n_cols()).collect()
    }

    #[test]
    fn test_remainder_goes_to_last_chunk() {
        let chunks = partition(&wide_table(250), 100).unwrap();
        assert_eq!(sizes(&chunks), vec![100, 100, 50]);
        assert_eq!(
            chunks.iter().map(|c| c.index).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(chunks[2].table.col_ids()[0], "sample_200");
    }

    #[test]
    fn test_even_division() {
        let chunks = partition(&wide_table(6), 3).unwrap();
        assert_eq!(sizes(&chunks), vec![3, 3]);
        assert_eq!(chunk_count(6, 3), 2);
    }

    #[test]
    fn test_chunk_size_larger_than_table() {
        let table = wide_table(4);
        let chunks = partition(&table, 100).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].table, table);
    }

    #[test]
    fn test_no_samples_no_chunks() {
        let table = Table::new(SparseMatrix::zeros(2, 0), vec!["a".into(), "b".into()], vec![])
            .unwrap();
        assert!(partition(&table, 10).unwrap().is_empty());
        assert_eq!(chunk_count(0, 10), 0);
    }

    #[test]
    fn test_zero_chunk_size_is_rejected() {
        assert!(matches!(
            partition(&wide_table(3), 0),
            Err(PipelineError::Argument(_))
        ));
    }

    #[test]
    fn test_chunks_keep_values_and_rows() {
        let table = wide_table(5);
        let chunks = partition(&table, 2).unwrap();
        for chunk in &chunks {
            assert_eq!(chunk.table.row_ids(), table.row_ids());
            for col in chunk.table.col_ids() {
                for row in table.row_ids() {
                    assert_eq!(chunk.table.get(row, col), table.get(row, col));
                }
            }
        }
    }
}
