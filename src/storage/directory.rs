//! Directory-backed chunk storage

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;

use super::error::{StorageError, StorageResult};
use super::traits::ChunkStore;
use super::CleanupStats;
use crate::regroup::GroupingSpec;
use crate::table::{biom, Table};

/// Prefix of the per-run directories created by [`DirectoryStore::for_run`]
pub const RUN_DIR_PREFIX: &str = "safe-regroup-";

/// Chunk storage rooted at a single directory
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Use `root` as the storage directory, creating it if needed
    pub async fn new(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::io(&root, e))?;
        Ok(Self { root })
    }

    /// Create a fresh, uniquely named run directory under `work_root`
    pub async fn for_run(work_root: &Path) -> StorageResult<Self> {
        let root = work_root.join(format!("{}{}", RUN_DIR_PREFIX, Uuid::new_v4()));
        tracing::debug!("Creating run directory {}", root.display());
        Self::new(root).await
    }
}

#[async_trait]
impl ChunkStore for DirectoryStore {
    fn root(&self) -> &Path {
        &self.root
    }

    fn chunk_path(&self, index: usize) -> PathBuf {
        self.root.join(format!("split_{index}.biom"))
    }

    fn regrouped_path(&self, index: usize, grouping: &GroupingSpec) -> PathBuf {
        self.root
            .join(format!("split_{}_{}.biom", index, grouping.file_component()))
    }

    async fn write_table(
        &self,
        path: &Path,
        table: &Table,
        generated_by: &str,
    ) -> StorageResult<()> {
        write_table_file(path, table, generated_by).await
    }

    async fn read_table(&self, path: &Path) -> StorageResult<Table> {
        read_table_file(path).await
    }

    async fn exists(&self, path: &Path) -> StorageResult<bool> {
        fs::try_exists(path)
            .await
            .map_err(|e| StorageError::io(path, e))
    }

    async fn remove(&self, paths: &[PathBuf]) -> CleanupStats {
        let mut stats = CleanupStats::new();
        for path in paths {
            stats.items_scanned += 1;
            let size = fs::metadata(path).await.map(|m| m.len()).unwrap_or(0);
            match fs::remove_file(path).await {
                Ok(()) => {
                    stats.items_removed += 1;
                    stats.bytes_reclaimed += size;
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => stats
                    .errors
                    .push(format!("Failed to remove {}: {}", path.display(), e)),
            }
        }
        stats
    }
}

/// Load a BIOM table from `path`
pub async fn read_table_file(path: &Path) -> StorageResult<Table> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| StorageError::io(path, e))?;
    biom::from_json(&content).map_err(|e| StorageError::format(path, e))
}

/// Write `table` to `path` through a sibling temporary file and a rename, so
/// readers never observe a partially written table.
pub async fn write_table_file(path: &Path, table: &Table, generated_by: &str) -> StorageResult<()> {
    let json = biom::to_json(table, generated_by).map_err(|e| StorageError::format(path, e))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::io(parent, e))?;
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "table".to_string());
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    fs::write(&tmp, json)
        .await
        .map_err(|e| StorageError::io(&tmp, e))?;
    if let Err(e) = fs::rename(&tmp, path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(StorageError::io(path, e));
    }
    Ok(())
}
