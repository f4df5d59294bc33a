use anyhow::{anyhow, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod loader;

pub use loader::ConfigLoader;

use crate::error::{PipelineError, PipelineResult};
use crate::pipeline::{DEFAULT_CHUNK_SIZE, DEFAULT_PROVENANCE};
use crate::regroup::DEFAULT_REGROUP_COMMAND;

pub const ENV_CHUNK_SIZE: &str = "SAFE_REGROUP_CHUNK_SIZE";
pub const ENV_COMMAND: &str = "SAFE_REGROUP_COMMAND";
pub const ENV_WORK_ROOT: &str = "SAFE_REGROUP_WORK_ROOT";
pub const ENV_LOG_LEVEL: &str = "SAFE_REGROUP_LOG_LEVEL";

/// Get the directory holding the user-wide `config.toml`
pub fn get_global_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("org", "safe-regroup", "safe-regroup")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| anyhow!("Could not determine home directory"))
}

/// Effective settings for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub chunk_size: usize,
    pub regroup_command: String,
    /// Directory under which per-run work directories are created
    pub work_root: PathBuf,
    pub keep_intermediates: bool,
    pub verify_outputs: bool,
    pub provenance: String,
    pub log_level: Option<String>,
}

/// One layer of settings as read from a TOML file. Absent keys leave the
/// lower layers untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub chunk_size: Option<usize>,
    pub regroup_command: Option<String>,
    pub work_root: Option<PathBuf>,
    pub keep_intermediates: Option<bool>,
    pub verify_outputs: Option<bool>,
    pub provenance: Option<String>,
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            regroup_command: DEFAULT_REGROUP_COMMAND.to_string(),
            work_root: PathBuf::from("."),
            keep_intermediates: true,
            verify_outputs: true,
            provenance: DEFAULT_PROVENANCE.to_string(),
            log_level: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_file(&mut self, file: ConfigFile) {
        if let Some(chunk_size) = file.chunk_size {
            self.chunk_size = chunk_size;
        }
        if let Some(command) = file.regroup_command {
            self.regroup_command = command;
        }
        if let Some(work_root) = file.work_root {
            self.work_root = work_root;
        }
        if let Some(keep) = file.keep_intermediates {
            self.keep_intermediates = keep;
        }
        if let Some(verify) = file.verify_outputs {
            self.verify_outputs = verify;
        }
        if let Some(provenance) = file.provenance {
            self.provenance = provenance;
        }
        if file.log_level.is_some() {
            self.log_level = file.log_level;
        }
    }

    pub fn merge_env_vars(&mut self) {
        self.merge_from_lookup(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key/value source shaped like the environment
    pub fn merge_from_lookup<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(chunk_size) = lookup(ENV_CHUNK_SIZE) {
            match chunk_size.trim().parse::<usize>() {
                Ok(value) => self.chunk_size = value,
                Err(e) => tracing::warn!("Ignoring {}={:?}: {}", ENV_CHUNK_SIZE, chunk_size, e),
            }
        }

        if let Some(command) = lookup(ENV_COMMAND) {
            self.regroup_command = command;
        }

        if let Some(work_root) = lookup(ENV_WORK_ROOT) {
            self.work_root = PathBuf::from(work_root);
        }

        if let Some(log_level) = lookup(ENV_LOG_LEVEL) {
            self.log_level = Some(log_level);
        }
    }

    /// Reject settings no run could succeed with
    pub fn validate(&self) -> PipelineResult<()> {
        if self.chunk_size == 0 {
            return Err(PipelineError::argument("chunk_size must be greater than zero"));
        }
        if self.regroup_command.trim().is_empty() {
            return Err(PipelineError::argument("regroup_command must not be empty"));
        }
        if self.provenance.is_empty() {
            return Err(PipelineError::argument("provenance must not be empty"));
        }
        Ok(())
    }
}
