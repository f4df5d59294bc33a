//! Regrouping through an external executable

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::{GroupingSpec, TransformOutput, Transformer};
use crate::error::{PipelineError, PipelineResult};
use crate::subprocess::{ProcessCommand, ProcessCommandBuilder, ProcessError, ProcessRunner};

pub const DEFAULT_REGROUP_COMMAND: &str = "humann_regroup_table";

pub const INPUT_FLAG: &str = "-i";
pub const GROUP_FLAG: &str = "-g";
pub const OUTPUT_FLAG: &str = "-o";

/// Runs `<program> [args..] -i <input> -g <group> -o <output>`
pub struct ExternalTransformer {
    program: String,
    base_args: Vec<String>,
    working_dir: Option<PathBuf>,
    runner: Arc<dyn ProcessRunner>,
}

impl ExternalTransformer {
    pub fn new(program: impl Into<String>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            program: program.into(),
            base_args: Vec::new(),
            working_dir: None,
            runner,
        }
    }

    /// Build from a command line split with shell quoting rules, so wrappers
    /// such as `conda run -n humann humann_regroup_table` work
    pub fn from_command_line(line: &str, runner: Arc<dyn ProcessRunner>) -> PipelineResult<Self> {
        let mut words = shell_words::split(line)
            .map_err(|e| PipelineError::argument(format!("invalid regroup command '{line}': {e}")))?
            .into_iter();
        let program = words
            .next()
            .ok_or_else(|| PipelineError::argument("regroup command is empty"))?;

        Ok(Self {
            program,
            base_args: words.collect(),
            working_dir: None,
            runner,
        })
    }

    /// Run the tool from `dir` so any side files it writes stay there
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn build_command(
        &self,
        input: &Path,
        grouping: &GroupingSpec,
        output: &Path,
    ) -> ProcessCommand {
        let mut builder = ProcessCommandBuilder::new(&self.program)
            .args(&self.base_args)
            .arg(INPUT_FLAG)
            .path_arg(input)
            .arg(GROUP_FLAG)
            .arg(grouping.as_str())
            .arg(OUTPUT_FLAG)
            .path_arg(output);
        if let Some(dir) = &self.working_dir {
            builder = builder.current_dir(dir);
        }
        builder.build()
    }
}

#[async_trait]
impl Transformer for ExternalTransformer {
    fn name(&self) -> &str {
        &self.program
    }

    async fn transform(
        &self,
        input: &Path,
        grouping: &GroupingSpec,
        output: &Path,
    ) -> Result<TransformOutput, ProcessError> {
        let command = self.build_command(input, grouping, output);
        self.runner.run(command).await
    }
}
