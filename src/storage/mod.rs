//! Storage abstraction for pipeline intermediates
//!
//! Every run receives an explicit [`ChunkStore`] that decides where chunk
//! files and regrouped chunk files live. The default [`DirectoryStore`]
//! keeps them in one directory per run.

pub mod directory;
pub mod error;
pub mod traits;

pub use directory::{read_table_file, write_table_file, DirectoryStore};
pub use error::{StorageError, StorageResult};
pub use traits::ChunkStore;

/// Statistics from a cleanup operation
#[derive(Debug, Clone, Default)]
pub struct CleanupStats {
    /// Number of items scanned
    pub items_scanned: usize,
    /// Number of items removed
    pub items_removed: usize,
    /// Bytes reclaimed from cleanup
    pub bytes_reclaimed: u64,
    /// Errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupStats {
    /// Create a new empty stats struct
    pub fn new() -> Self {
        Self::default()
    }

    /// Add another stats instance to this one
    pub fn merge(&mut self, other: &CleanupStats) {
        self.items_scanned += other.items_scanned;
        self.items_removed += other.items_removed;
        self.bytes_reclaimed += other.bytes_reclaimed;
        self.errors.extend(other.errors.clone());
    }
}
