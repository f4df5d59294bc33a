//! Property-based tests for partitioning and joining

#[cfg(test)]
mod tests {
    use crate::pipeline::{chunk_count, partition};
    use crate::table::{SparseMatrix, Table};
    use proptest::prelude::*;

    fn table_strategy() -> impl Strategy<Value = Table> {
        (1usize..6, 0usize..60).prop_flat_map(|(rows, cols)| {
            prop::collection::vec((0..rows, 0..cols.max(1), 0.1f64..1000.0), 0..100).prop_map(
                move |entries| {
                    let triplets: Vec<_> = entries
                        .into_iter()
                        .filter(|&(_, c, _)| c < cols)
                        .collect();
                    Table::new(
                        SparseMatrix::from_triplets(rows, cols, triplets)
                            .expect("entries within shape"),
                        (0..rows).map(|r| format!("F{r}")).collect(),
                        (0..cols).map(|c| format!("S{c}")).collect(),
                    )
                    .expect("ids match shape")
                },
            )
        })
    }

    // Property test: chunks cover every sample exactly once, in order
    proptest! {
        #[test]
        fn test_partition_is_complete(
            table in table_strategy(),
            chunk_size in 1usize..25,
        ) {
            let chunks = partition(&table, chunk_size).unwrap();

            let ids: Vec<String> = chunks
                .iter()
                .flat_map(|c| c.table.col_ids().iter().cloned())
                .collect();
            prop_assert_eq!(ids.as_slice(), table.col_ids());
            prop_assert_eq!(chunks.len(), chunk_count(table.n_cols(), chunk_size));

            let indices: Vec<usize> = chunks.iter().map(|c| c.index).collect();
            let expected: Vec<usize> = (1..=chunks.len()).collect();
            prop_assert_eq!(indices, expected);
        }
    }

    // Property test: only the last chunk may be short
    proptest! {
        #[test]
        fn test_partition_size_bound(
            table in table_strategy(),
            chunk_size in 1usize..25,
        ) {
            let chunks = partition(&table, chunk_size).unwrap();
            if let Some((last, rest)) = chunks.split_last() {
                for chunk in rest {
                    prop_assert_eq!(chunk.table.n_cols(), chunk_size);
                }
                prop_assert!(last.table.n_cols() >= 1);
                prop_assert!(last.table.n_cols() <= chunk_size);
            }
        }
    }

    // Property test: concatenating the chunks restores the table
    proptest! {
        #[test]
        fn test_concat_inverts_partition(
            table in table_strategy(),
            chunk_size in 1usize..25,
        ) {
            prop_assume!(table.n_cols() > 0);
            let chunks = partition(&table, chunk_size).unwrap();
            let parts: Vec<Table> = chunks.into_iter().map(|c| c.table).collect();
            prop_assert_eq!(Table::concat(&parts).unwrap(), table);
        }
    }
}
