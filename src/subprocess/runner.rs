use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use super::error::ProcessError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessCommand {
    pub program: String,
    pub args: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl ProcessCommand {
    /// Program and arguments joined with spaces, for logs and messages
    pub fn display_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Everything observed about a finished process
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Error(i32),
    /// Terminated by a signal (unix only)
    Signal(i32),
}

impl ExitStatus {
    pub fn success(&self) -> bool {
        *self == ExitStatus::Success
    }

    pub fn code(&self) -> Option<i32> {
        match self {
            ExitStatus::Success => Some(0),
            ExitStatus::Error(code) => Some(*code),
            ExitStatus::Signal(_) => None,
        }
    }
}

impl From<std::process::ExitStatus> for ExitStatus {
    fn from(status: std::process::ExitStatus) -> Self {
        if status.success() {
            return ExitStatus::Success;
        }
        if let Some(code) = status.code() {
            return ExitStatus::Error(code);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::ExitStatusExt;
            if let Some(signal) = status.signal() {
                return ExitStatus::Signal(signal);
            }
        }
        ExitStatus::Error(1)
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitStatus::Signal(signal) => write!(f, "signal {signal}"),
            other => write!(f, "exit code {}", other.code().unwrap_or(-1)),
        }
    }
}

/// Runs a command to completion and captures its output.
///
/// There is no timeout: `run` returns only once the process has exited.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError>;
}

/// [`ProcessRunner`] backed by `tokio::process`. The child inherits the
/// parent environment, gets a null stdin and has both output streams
/// captured.
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    fn spawn(command: &ProcessCommand) -> Result<tokio::process::Child, ProcessError> {
        let mut cmd = tokio::process::Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &command.working_dir {
            cmd.current_dir(dir);
        }

        cmd.spawn().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                tracing::error!(
                    "Command '{}' not found (PATH={})",
                    command.program,
                    std::env::var("PATH").unwrap_or_default()
                );
                ProcessError::CommandNotFound(command.program.clone())
            } else {
                ProcessError::SpawnFailed {
                    command: command.display_line(),
                    source,
                }
            }
        })
    }

    fn log_outcome(command: &ProcessCommand, output: &ProcessOutput) {
        match output.status {
            ExitStatus::Success => tracing::debug!(
                "{} finished in {:?}",
                command.program,
                output.duration
            ),
            ExitStatus::Error(_) => tracing::debug!(
                "{} failed with {} in {:?}",
                command.program,
                output.status,
                output.duration
            ),
            ExitStatus::Signal(_) => tracing::warn!(
                "{} was terminated by {} after {:?}",
                command.program,
                output.status,
                output.duration
            ),
        }
        tracing::trace!(
            "Captured {} bytes of stdout, {} bytes of stderr",
            output.stdout.len(),
            output.stderr.len()
        );
        if !output.stderr.is_empty() {
            tracing::trace!("Stderr: {}", output.stderr);
        }
    }
}

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        tracing::debug!("Executing subprocess: {}", command.display_line());
        if let Some(dir) = &command.working_dir {
            tracing::trace!("Working directory: {}", dir.display());
        }

        let started = Instant::now();
        let child = Self::spawn(&command)?;
        let raw = child.wait_with_output().await?;

        let output = ProcessOutput {
            status: raw.status.into(),
            stdout: String::from_utf8_lossy(&raw.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&raw.stderr).into_owned(),
            duration: started.elapsed(),
        };
        Self::log_outcome(&command, &output);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_line() {
        let command = ProcessCommand {
            program: "humann_regroup_table".to_string(),
            args: vec!["-i".to_string(), "split_1.biom".to_string()],
            working_dir: None,
        };
        assert_eq!(command.display_line(), "humann_regroup_table -i split_1.biom");

        let bare = ProcessCommand {
            program: "true".to_string(),
            args: vec![],
            working_dir: None,
        };
        assert_eq!(bare.display_line(), "true");
    }

    #[test]
    fn test_exit_status_display() {
        assert_eq!(ExitStatus::Success.to_string(), "exit code 0");
        assert_eq!(ExitStatus::Error(2).to_string(), "exit code 2");
        assert_eq!(ExitStatus::Signal(9).to_string(), "signal 9");
        assert_eq!(ExitStatus::Signal(9).code(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_exit_status_from_raw() {
        use std::os::unix::process::ExitStatusExt;

        let status = std::process::ExitStatus::from_raw(0);
        assert_eq!(ExitStatus::from(status), ExitStatus::Success);

        // Wait status for exit code 1
        let status = std::process::ExitStatus::from_raw(256);
        assert_eq!(ExitStatus::from(status), ExitStatus::Error(1));

        // Killed by SIGKILL
        let status = std::process::ExitStatus::from_raw(9);
        assert_eq!(ExitStatus::from(status), ExitStatus::Signal(9));
    }
}
