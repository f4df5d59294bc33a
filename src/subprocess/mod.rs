//! Subprocess abstraction used to launch the external regrouping tool
//!
//! Production code talks to [`ProcessRunner`]; tests substitute
//! [`MockProcessRunner`] to script exit codes and captured output.

pub mod builder;
pub mod error;
pub mod mock;
pub mod runner;


pub use builder::ProcessCommandBuilder;
pub use error::ProcessError;
pub use mock::{MockCommandConfig, MockProcessRunner};
pub use runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner, TokioProcessRunner};

use std::sync::Arc;

/// Runner that spawns real processes
pub fn production_runner() -> Arc<dyn ProcessRunner> {
    Arc::new(TokioProcessRunner)
}
