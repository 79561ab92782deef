//! Test runner abstraction.
//!
//! The [`TestRunner`] trait decouples dispatch from the command that actually
//! runs tests. Tests use recording runners that never spawn processes.

use std::path::PathBuf;
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use minijinja::{Environment, UndefinedBehavior, context};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::io::process::run_command_with_timeout;

/// Parameters for one test run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestRunRequest {
    /// Working directory for the test command (the project root).
    pub workdir: PathBuf,
    /// Test file, relative to `workdir`.
    pub test_file: PathBuf,
    pub timeout: Duration,
    /// Truncate captured output beyond this many bytes per stream.
    pub output_limit_bytes: usize,
}

/// Result of a finished test command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestRunOutcome {
    pub test_file: PathBuf,
    pub success: bool,
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub stdout: String,
    pub stderr: String,
}

pub trait TestRunner {
    fn run(&self, request: &TestRunRequest) -> Result<TestRunOutcome>;
}

/// Runs a configured command line, e.g. `nosetests -q --with-machineout`.
#[derive(Debug, Clone)]
pub struct CommandTestRunner {
    command: Vec<String>,
}

impl CommandTestRunner {
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }

    /// Program and arguments for `request`.
    ///
    /// Each entry is a template over `file` and `root`. When no entry refers
    /// to `file` the test file is appended as the last argument.
    pub fn render_args(&self, request: &TestRunRequest) -> Result<Vec<String>> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        let file = request.test_file.display().to_string();
        let root = request.workdir.display().to_string();

        let mut args = Vec::with_capacity(self.command.len() + 1);
        let mut mentions_file = false;
        for arg in &self.command {
            let template = env
                .template_from_str(arg)
                .with_context(|| format!("parse runner argument {arg:?}"))?;
            mentions_file |= template.undeclared_variables(false).contains("file");
            args.push(
                template
                    .render(context! { file => &file, root => &root })
                    .with_context(|| format!("render runner argument {arg:?}"))?,
            );
        }
        if !mentions_file {
            args.push(file);
        }
        Ok(args)
    }
}

impl TestRunner for CommandTestRunner {
    #[instrument(skip_all, fields(test_file = %request.test_file.display()))]
    fn run(&self, request: &TestRunRequest) -> Result<TestRunOutcome> {
        let args = self.render_args(request)?;
        let (program, rest) = args
            .split_first()
            .ok_or_else(|| anyhow!("runner command is empty"))?;
        info!(program = %program, workdir = %request.workdir.display(), "running tests");

        let mut cmd = Command::new(program);
        cmd.args(rest).current_dir(&request.workdir);
        let output = run_command_with_timeout(cmd, request.timeout, request.output_limit_bytes)
            .with_context(|| format!("run tests for {}", request.test_file.display()))?;

        if output.timed_out {
            warn!(timeout_secs = request.timeout.as_secs(), "test command timed out");
        }
        Ok(TestRunOutcome {
            test_file: request.test_file.clone(),
            success: output.status.success() && !output.timed_out,
            exit_code: output.status.code(),
            timed_out: output.timed_out,
            stdout: output.stdout_text(),
            stderr: output.stderr_text(),
        })
    }
}
