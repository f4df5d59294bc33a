//! Partition, regroup and join
//!
//! [`PipelineDriver`] sequences the three stages over an injected
//! [`ChunkStore`](crate::storage::ChunkStore) and
//! [`Transformer`](crate::regroup::Transformer). Chunks are processed one at
//! a time in index order and the first failing chunk aborts the run.

pub mod driver;
pub mod join;
pub mod partition;
pub mod state;


pub use driver::{
    DriverOptions, PipelineDriver, PipelineReport, PipelineRequest, DEFAULT_CHUNK_SIZE,
    DEFAULT_PROVENANCE,
};
pub use join::join;
pub use partition::{chunk_count, partition, Chunk};
pub use state::{apply_transition, PipelineEvent, PipelineState};
