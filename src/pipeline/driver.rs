//! End-to-end pipeline execution

use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::join::join;
use super::partition::{partition, Chunk};
use super::state::{apply_transition, PipelineEvent, PipelineState};
use crate::error::{PipelineError, PipelineResult};
use crate::regroup::{ChunkOutcome, GroupingSpec, RegroupInvoker, Transformer};
use crate::storage::{read_table_file, write_table_file, ChunkStore, CleanupStats};

pub const DEFAULT_CHUNK_SIZE: usize = 100;

/// Provenance recorded in the joined output table
pub const DEFAULT_PROVENANCE: &str = "CuratedMetagenomicData";

/// What to regroup and where to put the result
#[derive(Debug, Clone)]
pub struct PipelineRequest {
    pub input: PathBuf,
    pub grouping: GroupingSpec,
    pub chunk_size: usize,
    pub output: PathBuf,
}

#[derive(Debug, Clone)]
pub struct DriverOptions {
    /// Treat a successful exit without an output file as a failure
    pub verify_outputs: bool,
    /// Leave chunk files in the store after a successful run
    pub keep_intermediates: bool,
    pub provenance: String,
}

impl Default for DriverOptions {
    fn default() -> Self {
        Self {
            verify_outputs: true,
            keep_intermediates: true,
            provenance: DEFAULT_PROVENANCE.to_string(),
        }
    }
}

/// Final state of a run together with every chunk outcome observed
#[derive(Debug)]
pub struct PipelineReport {
    pub state: PipelineState,
    pub chunks: Vec<ChunkOutcome>,
    pub output: Option<PathBuf>,
    pub cleanup: Option<CleanupStats>,
    pub error: Option<PipelineError>,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        self.state == PipelineState::Done && self.error.is_none()
    }

    /// The chunk that stopped the run, if a chunk did
    pub fn failed_chunk(&self) -> Option<&ChunkOutcome> {
        self.chunks.iter().find(|c| !c.success())
    }
}

pub struct PipelineDriver {
    store: Arc<dyn ChunkStore>,
    invoker: RegroupInvoker,
    options: DriverOptions,
    state: PipelineState,
}

impl PipelineDriver {
    pub fn new(
        store: Arc<dyn ChunkStore>,
        transformer: Arc<dyn Transformer>,
        options: DriverOptions,
    ) -> Self {
        let invoker = RegroupInvoker::new(transformer, store.clone())
            .with_verify_outputs(options.verify_outputs);
        Self {
            store,
            invoker,
            options,
            state: PipelineState::Idle,
        }
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    /// Run the pipeline once. A driver that has already run rejects further
    /// runs with `InvalidTransition`.
    pub async fn run(&mut self, request: &PipelineRequest) -> PipelineReport {
        let mut outcomes = Vec::new();

        match self.execute(request, &mut outcomes).await {
            Ok(output) => {
                let cleanup = if self.options.keep_intermediates {
                    None
                } else {
                    Some(self.remove_intermediates(&outcomes).await)
                };
                PipelineReport {
                    state: self.state.clone(),
                    chunks: outcomes,
                    output: Some(output),
                    cleanup,
                    error: None,
                }
            }
            Err(err) => {
                if let Ok(failed) = apply_transition(
                    &self.state,
                    PipelineEvent::Fail {
                        reason: err.to_string(),
                    },
                ) {
                    self.state = failed;
                }
                warn!(
                    "Pipeline stopped in state {}; intermediates kept in {}",
                    self.state,
                    self.store.root().display()
                );
                PipelineReport {
                    state: self.state.clone(),
                    chunks: outcomes,
                    output: None,
                    cleanup: None,
                    error: Some(err),
                }
            }
        }
    }

    fn advance(&mut self, event: PipelineEvent) -> PipelineResult<()> {
        let next = apply_transition(&self.state, event)?;
        debug!("Pipeline state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }

    async fn execute(
        &mut self,
        request: &PipelineRequest,
        outcomes: &mut Vec<ChunkOutcome>,
    ) -> PipelineResult<PathBuf> {
        self.advance(PipelineEvent::Start)?;

        info!("Loading input file {}", request.input.display());
        let table = read_table_file(&request.input).await?;
        debug!(
            "Input has {} features x {} samples ({} non-zero entries)",
            table.n_rows(),
            table.n_cols(),
            table.nnz()
        );

        info!("Partitioning input file");
        let chunks: Vec<Chunk> = partition(&table, request.chunk_size)?;
        info!(
            "Split {} samples into {} chunks of up to {}",
            table.n_cols(),
            chunks.len(),
            request.chunk_size
        );
        drop(table);
        self.advance(PipelineEvent::Partitioned {
            chunks: chunks.len(),
        })?;

        let mut regrouped = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            info!("Regrouping split {}", chunk.index);
            let outcome = self.invoker.invoke(chunk, &request.grouping).await?;
            let verdict = outcome.check();
            debug!(
                "Split {} finished with {} in {:?}",
                outcome.index, outcome.status, outcome.duration
            );
            regrouped.push(outcome.regrouped_path.clone());
            outcomes.push(outcome);
            verdict?;
            self.advance(PipelineEvent::ChunkRegrouped)?;
        }

        info!("Joining split processed tables");
        let joined = join(self.store.as_ref(), &regrouped).await?;
        let totals = joined.column_totals();
        debug!(
            "Joined table has {} features x {} samples, total abundance {}",
            joined.n_rows(),
            joined.n_cols(),
            totals.iter().sum::<f64>()
        );

        info!("Saving joined table to {}", request.output.display());
        write_table_file(&request.output, &joined, &self.options.provenance).await?;
        self.advance(PipelineEvent::Joined)?;

        Ok(request.output.clone())
    }

    async fn remove_intermediates(&self, outcomes: &[ChunkOutcome]) -> CleanupStats {
        let chunk_files: Vec<PathBuf> = outcomes.iter().map(|o| o.chunk_path.clone()).collect();
        let regrouped_files: Vec<PathBuf> =
            outcomes.iter().map(|o| o.regrouped_path.clone()).collect();

        let mut stats = self.store.remove(&chunk_files).await;
        stats.merge(&self.store.remove(&regrouped_files).await);

        for error in &stats.errors {
            warn!("{}", error);
        }
        debug!(
            "Removed {} of {} intermediate files ({} bytes)",
            stats.items_removed, stats.items_scanned, stats.bytes_reclaimed
        );
        stats
    }
}
