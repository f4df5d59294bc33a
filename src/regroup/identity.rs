//! In-process regrouping that leaves tables unchanged

use async_trait::async_trait;
use std::path::Path;
use std::time::Instant;
use tokio::fs;

use super::{GroupingSpec, TransformOutput, Transformer};
use crate::subprocess::{ExitStatus, ProcessError};

/// Copies each chunk to its output path. Used for dry runs, where the
/// split and join steps run without the external tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTransformer;

#[async_trait]
impl Transformer for IdentityTransformer {
    fn name(&self) -> &str {
        "identity"
    }

    async fn transform(
        &self,
        input: &Path,
        _grouping: &GroupingSpec,
        output: &Path,
    ) -> Result<TransformOutput, ProcessError> {
        let start = Instant::now();
        fs::copy(input, output).await?;
        Ok(TransformOutput {
            status: ExitStatus::Success,
            stdout: String::new(),
            stderr: String::new(),
            duration: start.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_identity_copies_input() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.biom");
        let output = dir.path().join("out.biom");
        std::fs::write(&input, "{}").unwrap();

        let result = IdentityTransformer
            .transform(&input, &GroupingSpec::new("any"), &output)
            .await
            .unwrap();

        assert!(result.status.success());
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "{}");
    }

    #[tokio::test]
    async fn test_identity_missing_input_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = IdentityTransformer
            .transform(
                &dir.path().join("missing.biom"),
                &GroupingSpec::new("any"),
                &dir.path().join("out.biom"),
            )
            .await;
        assert!(matches!(result, Err(ProcessError::Io(_))));
    }
}
