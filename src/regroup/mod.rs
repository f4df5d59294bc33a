//! Regrouping of chunk tables
//!
//! The regrouping transform is a black box behind [`Transformer`]: it reads
//! one table file and writes another, given a [`GroupingSpec`]. The
//! [`RegroupInvoker`] persists a chunk, runs the transformer on it and
//! records the outcome.

pub mod external;
pub mod identity;
pub mod invoker;

pub use external::{ExternalTransformer, DEFAULT_REGROUP_COMMAND};
pub use identity::IdentityTransformer;
pub use invoker::{ChunkOutcome, ChunkVerdict, RegroupInvoker};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::subprocess::{ProcessError, ProcessOutput};

/// Exit status and captured streams of one transform
pub type TransformOutput = ProcessOutput;

/// Opaque name of the grouping to apply, forwarded verbatim
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupingSpec(String);

impl GroupingSpec {
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The grouping name reduced to characters that are safe in a file name
    pub fn file_component(&self) -> String {
        let cleaned: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
            "group".to_string()
        } else {
            cleaned
        }
    }
}

impl fmt::Display for GroupingSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A regrouping backend.
///
/// A returned `Ok` only means the transform ran; whether it succeeded is
/// read from the output's exit status.
#[async_trait]
pub trait Transformer: Send + Sync {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Regroup the table at `input` into `output`
    async fn transform(
        &self,
        input: &Path,
        grouping: &GroupingSpec,
        output: &Path,
    ) -> Result<TransformOutput, ProcessError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_component_keeps_plain_names() {
        assert_eq!(GroupingSpec::new("uniref90_rxn").file_component(), "uniref90_rxn");
        assert_eq!(GroupingSpec::new("uniref50_go").to_string(), "uniref50_go");
    }

    #[test]
    fn test_file_component_replaces_separators() {
        assert_eq!(
            GroupingSpec::new("maps/custom map").file_component(),
            "maps_custom_map"
        );
        assert_eq!(GroupingSpec::new("").file_component(), "group");
        assert_eq!(GroupingSpec::new("..").file_component(), "group");
    }
}
