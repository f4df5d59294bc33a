//! Reassembly of regrouped chunks

use std::path::PathBuf;

use crate::error::PipelineResult;
use crate::storage::ChunkStore;
use crate::table::Table;

/// Load each table in the order given and concatenate them along samples.
///
/// Paths are not re-sorted; callers pass them in chunk order.
pub async fn join(store: &dyn ChunkStore, paths: &[PathBuf]) -> PipelineResult<Table> {
    let mut tables = Vec::with_capacity(paths.len());
    for path in paths {
        let table = store.read_table(path).await?;
        tracing::debug!(
            "Loaded {} ({} features x {} samples)",
            path.display(),
            table.n_rows(),
            table.n_cols()
        );
        tables.push(table);
    }
    Ok(Table::concat(&tables)?)
}
