//! Switching between a file and its counterpart, and running its tests.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::io::editor::{Editor, OpenRequest};
use crate::io::test_runner::{TestRunOutcome, TestRunRequest, TestRunner};
use crate::io::workspace::{Workspace, ensure_parent_dir};

/// What `switch_counterpart` did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SwitchOutcome {
    /// Went from a test file to its source.
    OpenedSource { path: PathBuf },
    /// Went from a source file to its test; `created` when it did not exist.
    OpenedTest { path: PathBuf, created: bool },
    /// The test file did not exist and its creation was declined.
    Declined { path: PathBuf },
}

/// Open the counterpart of `path` in `editor`.
///
/// From a test file the existing source is opened with the opposite split.
/// From a source file the test file is opened, creating its directory first
/// when the test does not exist yet and creation was confirmed.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn switch_counterpart(
    workspace: &Workspace,
    path: &Path,
    editor: &dyn Editor,
) -> Result<SwitchOutcome> {
    let placement = workspace.config().split_placement()?;

    if workspace.is_test_file(path)? {
        let source = workspace.source_file_for(path)?;
        debug!(source = %source.display(), "switching to source");
        editor.open(&OpenRequest {
            path: source.clone(),
            placement: placement.opposite(),
            workdir: workspace.root().to_path_buf(),
        })?;
        return Ok(SwitchOutcome::OpenedSource { path: source });
    }

    let test = workspace.test_file_for(path)?;
    let created = !test.exists();
    if created {
        if workspace.config().confirm_create {
            let shown = workspace.display_relative(&test, workspace.root());
            if !editor.confirm_create(&shown)? {
                info!(test = %test.display(), "test file creation declined");
                return Ok(SwitchOutcome::Declined { path: test });
            }
        }
        ensure_parent_dir(&test)?;
    }
    debug!(test = %test.display(), created, "switching to test");
    editor.open(&OpenRequest {
        path: test.clone(),
        placement,
        workdir: workspace.root().to_path_buf(),
    })?;
    Ok(SwitchOutcome::OpenedTest {
        path: test,
        created,
    })
}

/// Run the tests for `path`, mapping a source file to its test file first.
///
/// The test file is not checked for existence; the runner reports what it
/// finds.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn run_tests(
    workspace: &Workspace,
    path: &Path,
    runner: &dyn TestRunner,
) -> Result<TestRunOutcome> {
    let test = if workspace.is_test_file(path)? {
        workspace.absolute(&workspace.relativize(path)?)
    } else {
        workspace.test_file_for(path)?
    };
    let test_file = workspace.display_relative(&test, workspace.root());
    let runner_config = &workspace.config().runner;
    info!(test_file = %test_file.display(), "running tests");

    runner
        .run(&TestRunRequest {
            workdir: workspace.root().to_path_buf(),
            test_file: test_file.clone(),
            timeout: Duration::from_secs(runner_config.timeout_secs),
            output_limit_bytes: runner_config.output_limit_bytes,
        })
        .with_context(|| format!("run tests in {}", test_file.display()))
}
