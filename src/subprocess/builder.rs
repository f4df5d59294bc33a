use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use super::runner::ProcessCommand;

/// Fluent construction of a [`ProcessCommand`]
#[derive(Debug, Clone)]
pub struct ProcessCommandBuilder {
    program: String,
    args: Vec<String>,
    working_dir: Option<PathBuf>,
}

impl ProcessCommandBuilder {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_owned(),
            args: Vec::new(),
            working_dir: None,
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_owned());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_owned());
        }
        self
    }

    /// Append a path argument. Non-UTF-8 components are replaced lossily.
    pub fn path_arg(mut self, path: impl AsRef<OsStr>) -> Self {
        let path = path.as_ref().to_string_lossy();
        self.args.push(path.into_owned());
        self
    }

    pub fn current_dir(mut self, dir: &Path) -> Self {
        self.working_dir = Some(dir.to_owned());
        self
    }

    pub fn build(self) -> ProcessCommand {
        ProcessCommand {
            program: self.program,
            args: self.args,
            working_dir: self.working_dir,
        }
    }
}
