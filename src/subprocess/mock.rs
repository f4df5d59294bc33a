use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::error::ProcessError;
use super::runner::{ExitStatus, ProcessCommand, ProcessOutput, ProcessRunner};

type ArgsMatcher = Box<dyn Fn(&[String]) -> bool + Send + Sync>;
type SideEffect = Box<dyn Fn(&ProcessCommand) + Send + Sync>;

/// Scripted [`ProcessRunner`] for tests.
///
/// Expectations are consulted in registration order; the first whose program
/// and argument matcher accept a command answers it. Clones share state, so a
/// test can keep one handle for assertions and give another to the code under
/// test.
#[derive(Clone, Default)]
pub struct MockProcessRunner {
    state: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    expectations: Vec<Expectation>,
    history: Vec<ProcessCommand>,
}

struct Expectation {
    program: String,
    matcher: Option<ArgsMatcher>,
    side_effect: Option<SideEffect>,
    status: ExitStatus,
    stdout: String,
    stderr: String,
    limit: Option<usize>,
    hits: usize,
}

impl Expectation {
    fn accepts(&self, command: &ProcessCommand) -> bool {
        self.program == command.program
            && self
                .matcher
                .as_ref()
                .map_or(true, |matcher| matcher(&command.args))
    }
}

/// Builder returned by [`MockProcessRunner::expect_command`]; call
/// [`finish`](MockCommandConfig::finish) to register it
pub struct MockCommandConfig {
    runner: MockProcessRunner,
    expectation: Expectation,
}

impl MockProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn expect_command(&mut self, program: &str) -> MockCommandConfig {
        MockCommandConfig {
            runner: self.clone(),
            expectation: Expectation {
                program: program.to_string(),
                matcher: None,
                side_effect: None,
                status: ExitStatus::Success,
                stdout: String::new(),
                stderr: String::new(),
                limit: None,
                hits: 0,
            },
        }
    }

    /// Whether `program` was run exactly `times` times
    pub fn verify_called(&self, program: &str, times: usize) -> bool {
        self.lock()
            .history
            .iter()
            .filter(|command| command.program == program)
            .count()
            == times
    }

    pub fn get_call_history(&self) -> Vec<ProcessCommand> {
        self.lock().history.clone()
    }

    /// Forget every expectation and recorded call
    pub fn reset(&mut self) {
        let mut state = self.lock();
        state.expectations.clear();
        state.history.clear();
    }
}

#[async_trait]
impl ProcessRunner for MockProcessRunner {
    async fn run(&self, command: ProcessCommand) -> Result<ProcessOutput, ProcessError> {
        let mut state = self.lock();
        state.history.push(command.clone());

        let Some(expectation) = state
            .expectations
            .iter_mut()
            .find(|expectation| expectation.accepts(&command))
        else {
            return Err(ProcessError::MockExpectationNotMet(format!(
                "no expectation matches `{}`",
                command.display_line()
            )));
        };

        expectation.hits += 1;
        if let Some(limit) = expectation.limit.filter(|&limit| expectation.hits > limit) {
            return Err(ProcessError::MockExpectationNotMet(format!(
                "`{}` expected {} time(s), called {}",
                command.program, limit, expectation.hits
            )));
        }

        if let Some(effect) = &expectation.side_effect {
            effect(&command);
        }

        Ok(ProcessOutput {
            status: expectation.status.clone(),
            stdout: expectation.stdout.clone(),
            stderr: expectation.stderr.clone(),
            duration: Duration::from_millis(1),
        })
    }
}

impl MockCommandConfig {
    /// Only answer commands whose arguments satisfy `matcher`
    pub fn with_args<F>(mut self, matcher: F) -> Self
    where
        F: Fn(&[String]) -> bool + Send + Sync + 'static,
    {
        self.expectation.matcher = Some(Box::new(matcher));
        self
    }

    /// Run `effect` whenever this expectation answers a command, e.g. to
    /// create the files a real tool would write
    pub fn with_side_effect<F>(mut self, effect: F) -> Self
    where
        F: Fn(&ProcessCommand) + Send + Sync + 'static,
    {
        self.expectation.side_effect = Some(Box::new(effect));
        self
    }

    pub fn returns_stdout(mut self, stdout: &str) -> Self {
        self.expectation.stdout = stdout.to_string();
        self
    }

    pub fn returns_stderr(mut self, stderr: &str) -> Self {
        self.expectation.stderr = stderr.to_string();
        self
    }

    pub fn returns_exit_code(mut self, code: i32) -> Self {
        self.expectation.status = match code {
            0 => ExitStatus::Success,
            code => ExitStatus::Error(code),
        };
        self
    }

    pub fn returns_success(self) -> Self {
        self.returns_exit_code(0)
    }

    /// Fail calls beyond the `n`th
    pub fn times(mut self, n: usize) -> Self {
        self.expectation.limit = Some(n);
        self
    }

    pub fn finish(self) {
        let runner = self.runner;
        runner.lock().expectations.push(self.expectation);
    }
}
