//! Core trait definitions for the storage abstraction layer

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use super::error::StorageResult;
use super::CleanupStats;
use crate::regroup::GroupingSpec;
use crate::table::Table;

/// Storage location for the intermediate files of one pipeline run.
///
/// The regrouping tool works on files, so chunks are addressed by path.
/// Implementations decide where those paths live; the pipeline never
/// touches the working directory directly.
#[async_trait]
pub trait ChunkStore: Send + Sync {
    /// Directory that holds this run's intermediates
    fn root(&self) -> &Path;

    /// Where the chunk with 1-based `index` is persisted before regrouping
    fn chunk_path(&self, index: usize) -> PathBuf;

    /// Where the regrouping tool writes its result for chunk `index`
    fn regrouped_path(&self, index: usize, grouping: &GroupingSpec) -> PathBuf;

    /// Persist a table. The file at `path` is replaced atomically.
    async fn write_table(&self, path: &Path, table: &Table, generated_by: &str)
        -> StorageResult<()>;

    /// Load a table written in the shared format
    async fn read_table(&self, path: &Path) -> StorageResult<Table>;

    /// Check whether a file exists
    async fn exists(&self, path: &Path) -> StorageResult<bool>;

    /// Remove files, collecting failures instead of stopping at the first
    async fn remove(&self, paths: &[PathBuf]) -> CleanupStats;
}
