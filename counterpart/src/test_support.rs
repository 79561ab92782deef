//! Test-only fixtures: throwaway projects and scripted collaborators.

use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

use crate::io::config::CounterpartConfig;
use crate::io::editor::{Editor, OpenRequest};
use crate::io::test_runner::{TestRunOutcome, TestRunRequest, TestRunner};
use crate::io::workspace::Workspace;

/// A temporary project directory marked as a root with `.git`.
pub struct TestProject {
    _temp: TempDir,
    root: PathBuf,
}

impl TestProject {
    pub fn new() -> Result<Self> {
        let temp = tempfile::tempdir().context("create temp project")?;
        let root = fs::canonicalize(temp.path()).context("canonicalize temp project")?;
        fs::create_dir(root.join(".git")).context("create .git marker")?;
        Ok(Self { _temp: temp, root })
    }

    /// Canonical project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `contents` to the project-relative `path`, creating directories.
    pub fn write(&self, path: impl AsRef<Path>, contents: &str) -> Result<PathBuf> {
        let path = self.root.join(path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Defaults that only recognise the `.git` marker, so nothing above the
    /// temp directory can be taken for the root.
    pub fn base_config(&self) -> CounterpartConfig {
        let mut config = CounterpartConfig::default();
        config.root.markers = vec![".git".to_string()];
        config
    }

    pub fn workspace(&self, config: CounterpartConfig) -> Result<Workspace> {
        Workspace::new(&self.root, config)
    }
}

/// Editor that records requests and answers confirmations from a script.
#[derive(Debug, Default)]
pub struct ScriptedEditor {
    accept: bool,
    opened: RefCell<Vec<OpenRequest>>,
    confirmations: RefCell<Vec<PathBuf>>,
}

impl ScriptedEditor {
    pub fn accepting() -> Self {
        Self {
            accept: true,
            ..Self::default()
        }
    }

    pub fn declining() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<OpenRequest> {
        self.opened.borrow().clone()
    }

    /// Paths the editor was asked to confirm, in order.
    pub fn confirmations(&self) -> Vec<PathBuf> {
        self.confirmations.borrow().clone()
    }
}

impl Editor for ScriptedEditor {
    fn open(&self, request: &OpenRequest) -> Result<()> {
        self.opened.borrow_mut().push(request.clone());
        Ok(())
    }

    fn confirm_create(&self, path: &Path) -> Result<bool> {
        self.confirmations.borrow_mut().push(path.to_path_buf());
        Ok(self.accept)
    }
}

/// Test runner that records requests instead of spawning anything.
#[derive(Debug, Default)]
pub struct RecordingTestRunner {
    success: bool,
    requests: RefCell<Vec<TestRunRequest>>,
}

impl RecordingTestRunner {
    pub fn passing() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self::default()
    }

    pub fn requests(&self) -> Vec<TestRunRequest> {
        self.requests.borrow().clone()
    }
}

impl TestRunner for RecordingTestRunner {
    fn run(&self, request: &TestRunRequest) -> Result<TestRunOutcome> {
        self.requests.borrow_mut().push(request.clone());
        Ok(TestRunOutcome {
            test_file: request.test_file.clone(),
            success: self.success,
            exit_code: Some(if self.success { 0 } else { 1 }),
            timed_out: false,
            stdout: String::new(),
            stderr: String::new(),
        })
    }
}
