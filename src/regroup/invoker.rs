//! Per-chunk regrouping: persist, transform, verify

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::{GroupingSpec, Transformer};
use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::Chunk;
use crate::storage::ChunkStore;
use crate::subprocess::ExitStatus;
use crate::table::biom::CHUNK_PROVENANCE;

/// How a single chunk's regrouping ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkVerdict {
    Regrouped,
    /// The transform exited unsuccessfully
    ProcessFailed,
    /// The transform exited successfully but its output file is absent
    OutputMissing,
}

/// Record of one chunk's trip through the regrouping transform
#[derive(Debug, Clone)]
pub struct ChunkOutcome {
    pub index: usize,
    pub columns: usize,
    pub chunk_path: PathBuf,
    pub regrouped_path: PathBuf,
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
    pub verdict: ChunkVerdict,
}

impl ChunkOutcome {
    pub fn success(&self) -> bool {
        self.verdict == ChunkVerdict::Regrouped
    }

    /// Turn an unsuccessful outcome into the error that aborts the run
    pub fn check(&self) -> PipelineResult<()> {
        match self.verdict {
            ChunkVerdict::Regrouped => Ok(()),
            ChunkVerdict::ProcessFailed => Err(PipelineError::ExternalProcessFailure {
                index: self.index,
                status: self.status.clone(),
                stderr: self.stderr.clone(),
            }),
            ChunkVerdict::OutputMissing => Err(PipelineError::MissingOutput {
                index: self.index,
                path: self.regrouped_path.clone(),
            }),
        }
    }
}

/// Drives a [`Transformer`] over chunks persisted in a [`ChunkStore`]
pub struct RegroupInvoker {
    transformer: Arc<dyn Transformer>,
    store: Arc<dyn ChunkStore>,
    verify_outputs: bool,
}

impl RegroupInvoker {
    pub fn new(transformer: Arc<dyn Transformer>, store: Arc<dyn ChunkStore>) -> Self {
        Self {
            transformer,
            store,
            verify_outputs: true,
        }
    }

    /// Whether a successful exit must be backed by an existing output file
    pub fn with_verify_outputs(mut self, verify: bool) -> Self {
        self.verify_outputs = verify;
        self
    }

    /// Persist `chunk`, regroup it once and report what happened.
    ///
    /// `Err` is returned only when the chunk could not be written or the
    /// transform could not be started; an unsuccessful transform is reported
    /// through the outcome's verdict.
    pub async fn invoke(
        &self,
        chunk: &Chunk,
        grouping: &GroupingSpec,
    ) -> PipelineResult<ChunkOutcome> {
        let chunk_path = self.store.chunk_path(chunk.index);
        let regrouped_path = self.store.regrouped_path(chunk.index, grouping);

        self.store
            .write_table(&chunk_path, &chunk.table, CHUNK_PROVENANCE)
            .await?;
        tracing::debug!(
            "Wrote split {} ({} samples) to {}",
            chunk.index,
            chunk.table.n_cols(),
            chunk_path.display()
        );

        let output = self
            .transformer
            .transform(&chunk_path, grouping, &regrouped_path)
            .await?;

        if !output.stdout.is_empty() {
            tracing::trace!("{} stdout: {}", self.transformer.name(), output.stdout);
        }

        let verdict = if !output.status.success() {
            tracing::warn!(
                "{} failed on split {} with {}",
                self.transformer.name(),
                chunk.index,
                output.status
            );
            ChunkVerdict::ProcessFailed
        } else if self.verify_outputs && !self.store.exists(&regrouped_path).await? {
            tracing::warn!(
                "{} did not write {}",
                self.transformer.name(),
                regrouped_path.display()
            );
            ChunkVerdict::OutputMissing
        } else {
            ChunkVerdict::Regrouped
        };

        Ok(ChunkOutcome {
            index: chunk.index,
            columns: chunk.table.n_cols(),
            chunk_path,
            regrouped_path,
            status: output.status,
            stdout: output.stdout,
            stderr: output.stderr,
            duration: output.duration,
            verdict,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regroup::{ExternalTransformer, IdentityTransformer};
    use crate::storage::DirectoryStore;
    use crate::subprocess::{MockProcessRunner, ProcessCommand};
    use crate::table::{SparseMatrix, Table};
    use tempfile::TempDir;

    fn chunk(index: usize) -> Chunk {
        let matrix = SparseMatrix::from_triplets(1, 2, vec![(0, 0, 2.0)]).unwrap();
        Chunk {
            index,
            table: Table::new(matrix, vec!["f1".into()], vec!["a".into(), "b".into()]).unwrap(),
        }
    }

    fn copy_input_to_output(cmd: &ProcessCommand) {
        let input = &cmd.args[1];
        let output = &cmd.args[5];
        std::fs::copy(input, output).unwrap();
    }

    async fn store(dir: &TempDir) -> Arc<dyn ChunkStore> {
        Arc::new(DirectoryStore::new(dir.path()).await.unwrap())
    }

    #[tokio::test]
    async fn test_invoke_identity_regroups_chunk() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir).await;
        let invoker = RegroupInvoker::new(Arc::new(IdentityTransformer), store.clone());

        let outcome = invoker
            .invoke(&chunk(1), &GroupingSpec::new("uniref90_ko"))
            .await
            .unwrap();

        assert!(outcome.success());
        assert!(outcome.check().is_ok());
        assert_eq!(outcome.columns, 2);
        assert_eq!(outcome.chunk_path, dir.path().join("split_1.biom"));
        assert_eq!(
            outcome.regrouped_path,
            dir.path().join("split_1_uniref90_ko.biom")
        );
        assert_eq!(
            store.read_table(&outcome.regrouped_path).await.unwrap(),
            chunk(1).table
        );
    }

    #[tokio::test]
    async fn test_invoke_persists_chunk_with_split_provenance() {
        let dir = TempDir::new().unwrap();
        let invoker = RegroupInvoker::new(Arc::new(IdentityTransformer), store(&dir).await);

        let outcome = invoker.invoke(&chunk(4), &GroupingSpec::new("g")).await.unwrap();

        let json = std::fs::read_to_string(&outcome.chunk_path).unwrap();
        assert_eq!(
            crate::table::biom::generated_by(&json).unwrap().as_deref(),
            Some(CHUNK_PROVENANCE)
        );
    }

    #[tokio::test]
    async fn test_invoke_nonzero_exit_keeps_streams() {
        let dir = TempDir::new().unwrap();
        let mut mock = MockProcessRunner::new();
        mock.expect_command("humann_regroup_table")
            .returns_exit_code(1)
            .returns_stdout("Loading table")
            .returns_stderr("Unrecognized group: bogus")
            .finish();
        let transformer = ExternalTransformer::new("humann_regroup_table", Arc::new(mock));
        let invoker = RegroupInvoker::new(Arc::new(transformer), store(&dir).await);

        let outcome = invoker
            .invoke(&chunk(2), &GroupingSpec::new("bogus"))
            .await
            .unwrap();

        assert_eq!(outcome.verdict, ChunkVerdict::ProcessFailed);
        assert_eq!(outcome.status, ExitStatus::Error(1));
        assert_eq!(outcome.stdout, "Loading table");
        assert_eq!(outcome.stderr, "Unrecognized group: bogus");
        assert!(matches!(
            outcome.check(),
            Err(PipelineError::ExternalProcessFailure { index: 2, .. })
        ));
    }

    #[tokio::test]
    async fn test_invoke_success_without_output_is_missing() {
        let dir = TempDir::new().unwrap();
        let mut mock = MockProcessRunner::new();
        mock.expect_command("tool").finish();
        let transformer = ExternalTransformer::new("tool", Arc::new(mock));
        let invoker = RegroupInvoker::new(Arc::new(transformer), store(&dir).await);

        let outcome = invoker.invoke(&chunk(1), &GroupingSpec::new("g")).await.unwrap();

        assert_eq!(outcome.verdict, ChunkVerdict::OutputMissing);
        assert!(matches!(
            outcome.check(),
            Err(PipelineError::MissingOutput { index: 1, .. })
        ));
    }

    #[tokio::test]
    async fn test_invoke_without_verification_trusts_exit_code() {
        let dir = TempDir::new().unwrap();
        let mut mock = MockProcessRunner::new();
        mock.expect_command("tool").finish();
        let transformer = ExternalTransformer::new("tool", Arc::new(mock));
        let invoker = RegroupInvoker::new(Arc::new(transformer), store(&dir).await)
            .with_verify_outputs(false);

        let outcome = invoker.invoke(&chunk(1), &GroupingSpec::new("g")).await.unwrap();
        assert!(outcome.success());
    }

    #[tokio::test]
    async fn test_invoke_passes_store_paths_to_tool() {
        let dir = TempDir::new().unwrap();
        let mut mock = MockProcessRunner::new();
        mock.expect_command("tool")
            .with_side_effect(copy_input_to_output)
            .finish();
        let transformer = ExternalTransformer::new("tool", Arc::new(mock.clone()));
        let invoker = RegroupInvoker::new(Arc::new(transformer), store(&dir).await);

        let outcome = invoker
            .invoke(&chunk(3), &GroupingSpec::new("uniref50_go"))
            .await
            .unwrap();
        assert!(outcome.success());

        let history = mock.get_call_history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].args[0], "-i");
        assert_eq!(
            history[0].args[1],
            dir.path().join("split_3.biom").to_string_lossy()
        );
        assert_eq!(history[0].args[3], "uniref50_go");
        assert_eq!(
            history[0].args[5],
            dir.path().join("split_3_uniref50_go.biom").to_string_lossy()
        );
    }

    #[tokio::test]
    async fn test_invoke_spawn_failure_is_error() {
        let dir = TempDir::new().unwrap();
        // No expectation registered: the mock refuses the command
        let transformer = ExternalTransformer::new("tool", Arc::new(MockProcessRunner::new()));
        let invoker = RegroupInvoker::new(Arc::new(transformer), store(&dir).await);

        let result = invoker.invoke(&chunk(1), &GroupingSpec::new("g")).await;
        assert!(matches!(result, Err(PipelineError::Process(_))));
    }
}
