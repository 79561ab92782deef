//! A discovered project: root directory, effective configuration and layout.
//!
//! The layout works on project-relative paths; [`Workspace`] translates
//! between those and real locations and performs the existence checks.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, instrument, trace};

use crate::core::layout::{Candidates, Layout};
use crate::core::relpath::{normalize, relpath};
use crate::error::{MappingError, SHOWN_CANDIDATES};
use crate::io::config::{ConfigLayer, CounterpartConfig, apply_layer, with_project_file};
use crate::io::root::{RootSearch, find_project_root};

#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    config: CounterpartConfig,
    layout: Layout,
}

impl Workspace {
    /// Bind `config` to an already known project root.
    pub fn new(root: impl Into<PathBuf>, config: CounterpartConfig) -> Result<Self> {
        config.validate()?;
        let layout = config.layout()?;
        Ok(Self {
            root: root.into(),
            config,
            layout,
        })
    }

    /// Find the project containing `path` and resolve its configuration.
    ///
    /// `overrides` apply both to the search and on top of the project's
    /// `.counterpart.toml`.
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn discover(
        path: &Path,
        base: CounterpartConfig,
        overrides: &ConfigLayer,
    ) -> Result<Self> {
        let base = apply_layer(base, overrides)?;
        let root = find_project_root(path, &RootSearch::from_config(&base))?;
        let config = with_project_file(base, &root)?;
        let config = apply_layer(config, overrides)?;
        debug!(root = %root.display(), layout = %config.layout, "workspace resolved");
        Self::new(root, config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &CounterpartConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Project-relative form of `path`.
    ///
    /// Relative paths are taken to be relative to the project root already.
    /// Absolute paths have their existing part canonicalised so symlinked
    /// checkouts still land inside the root.
    pub fn relativize(&self, path: &Path) -> Result<PathBuf, MappingError> {
        if path.is_relative() {
            let relative = normalize(path);
            if relative.starts_with("..") {
                return Err(self.outside(path));
            }
            return Ok(relative);
        }
        let resolved = canonicalize_existing_prefix(path);
        match resolved.strip_prefix(&self.root) {
            Ok(relative) => Ok(relative.to_path_buf()),
            Err(_) => Err(self.outside(path)),
        }
    }

    fn outside(&self, path: &Path) -> MappingError {
        MappingError::NotUnderRoot {
            path: path.to_path_buf(),
            root: self.root.clone(),
            label: "project root",
        }
    }

    /// Absolute location of a project-relative path.
    pub fn absolute(&self, relative: &Path) -> PathBuf {
        self.root.join(relative)
    }

    /// `path` in the same form as the paths this workspace hands out.
    ///
    /// Absolute paths have symlinks in their existing part resolved; relative
    /// paths are taken to be relative to the project root.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_relative() {
            return self.absolute(&normalize(path));
        }
        canonicalize_existing_prefix(path)
    }

    /// `path` relative to `start`, both taken inside the project.
    pub fn display_relative(&self, path: &Path, start: &Path) -> PathBuf {
        relpath(path, start, &self.root)
    }

    pub fn is_test_file(&self, path: &Path) -> Result<bool> {
        let relative = self.relativize(path)?;
        Ok(self.layout.is_test_file(&relative))
    }

    /// Absolute path of the test file for the source at `path`; it need not exist.
    pub fn test_file_for(&self, path: &Path) -> Result<PathBuf> {
        let relative = self.relativize(path)?;
        let test = self.layout.source_to_test(&relative)?;
        trace!(source = %relative.display(), test = %test.display(), "mapped source to test");
        Ok(self.absolute(&test))
    }

    /// Project-relative source candidates for the test file at `path`.
    pub fn source_candidates(&self, path: &Path) -> Result<Candidates> {
        let relative = self.relativize(path)?;
        Ok(self.layout.test_to_source_candidates(&relative)?)
    }

    /// Absolute path of the first source candidate that exists.
    #[instrument(skip_all, fields(test = %path.display()))]
    pub fn source_file_for(&self, path: &Path) -> Result<PathBuf> {
        let relative = self.relativize(path)?;
        let mut tried = Vec::new();
        let mut tried_count = 0usize;
        for candidate in self.layout.test_to_source_candidates(&relative)? {
            let absolute = self.absolute(&candidate);
            tried_count += 1;
            if absolute.exists() {
                debug!(source = %candidate.display(), checked = tried_count, "found source");
                return Ok(absolute);
            }
            trace!(candidate = %candidate.display(), "candidate missing");
            if tried.len() < SHOWN_CANDIDATES {
                tried.push(candidate);
            }
        }
        Err(MappingError::SourceNotFound {
            test_file: relative,
            tried,
            tried_count,
        })
        .with_context(|| format!("look up source for {}", path.display()))
    }
}

/// Canonicalise the longest existing ancestor of `path` and re-append the rest.
fn canonicalize_existing_prefix(path: &Path) -> PathBuf {
    let path = normalize(path);
    let mut existing = path.as_path();
    let mut rest = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                rest.push(name.to_os_string());
                existing = parent;
            }
            _ => return path,
        }
    }
    let Ok(mut resolved) = fs::canonicalize(existing) else {
        return path;
    };
    resolved.extend(rest.iter().rev());
    resolved
}

/// Create the directory that will hold `file`.
pub fn ensure_parent_dir(file: &Path) -> Result<()> {
    if let Some(parent) = file.parent()
        && !parent.exists()
    {
        debug!(dir = %parent.display(), "creating test directory");
        fs::create_dir_all(parent).with_context(|| format!("create directory {}", parent.display()))?;
    }
    Ok(())
}
