//! Test layout conventions.
//!
//! A [`Layout`] maps project-relative source paths to test paths and back.
//! The set of conventions is closed; each lives in its own module as plain
//! functions over a shared [`LayoutConfig`].

mod flat;
mod follow_hierarchy;
mod side_by_side;

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub use flat::FlatCandidates;

use crate::core::module_path::ModuleNaming;
use crate::core::relpath::normalize;
use crate::error::MappingError;

/// Where test files live relative to their sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutKind {
    /// `src/bar/baz.py` <-> `src/bar/test_baz.py`
    SideBySide,
    /// `src/bar/baz.py` <-> `tests/test_bar_baz.py`
    Flat,
    /// `src/bar/baz.py` <-> `tests/test_bar/test_baz.py`
    FollowHierarchy,
}

impl LayoutKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SideBySide => "side-by-side",
            Self::Flat => "flat",
            Self::FollowHierarchy => "follow-hierarchy",
        }
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutKind {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "side-by-side" => Ok(Self::SideBySide),
            "flat" => Ok(Self::Flat),
            "follow-hierarchy" => Ok(Self::FollowHierarchy),
            other => Err(MappingError::UnknownLayout(other.to_string())),
        }
    }
}

/// Roots and naming shared by every layout.
///
/// Roots are relative to the project root; an empty root is the project root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutConfig {
    pub source_root: PathBuf,
    pub test_root: PathBuf,
    pub prefix: String,
    pub naming: ModuleNaming,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            source_root: PathBuf::new(),
            test_root: PathBuf::from("tests"),
            prefix: "test_".to_string(),
            naming: ModuleNaming::default(),
        }
    }
}

impl LayoutConfig {
    fn under_source_root<'a>(&self, path: &'a Path) -> Result<&'a Path, MappingError> {
        under_root(path, &self.source_root, "source root")
    }

    fn under_test_root<'a>(&self, path: &'a Path) -> Result<&'a Path, MappingError> {
        under_root(path, &self.test_root, "test root")
    }

    /// `segment` carries the prefix and still names something after it.
    fn is_prefixed(&self, segment: &str) -> bool {
        segment.len() > self.prefix.len() && segment.starts_with(&self.prefix)
    }

    fn strip_prefix<'a>(&self, segment: &'a str) -> &'a str {
        if self.prefix.is_empty() {
            return segment;
        }
        segment.strip_prefix(&self.prefix).unwrap_or(segment)
    }
}

fn under_root<'a>(
    path: &'a Path,
    root: &Path,
    label: &'static str,
) -> Result<&'a Path, MappingError> {
    path.strip_prefix(root)
        .map_err(|_| MappingError::NotUnderRoot {
            path: path.to_path_buf(),
            root: root.to_path_buf(),
            label,
        })
}

/// The active layout: a convention plus its configuration.
///
/// Every operation takes a path relative to the project root. Paths are
/// normalised lexically before use, so `./src/../src/foo.py` is `src/foo.py`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    kind: LayoutKind,
    config: LayoutConfig,
}

impl Layout {
    pub fn new(kind: LayoutKind, mut config: LayoutConfig) -> Self {
        config.source_root = normalize(&config.source_root);
        config.test_root = normalize(&config.test_root);
        Self { kind, config }
    }

    pub fn kind(&self) -> LayoutKind {
        self.kind
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Classify `path` without touching the filesystem.
    pub fn is_test_file(&self, path: &Path) -> bool {
        let path = normalize(path);
        match self.kind {
            LayoutKind::SideBySide => side_by_side::is_test_file(&self.config, &path),
            LayoutKind::Flat => flat::is_test_file(&self.config, &path),
            LayoutKind::FollowHierarchy => follow_hierarchy::is_test_file(&self.config, &path),
        }
    }

    /// The one test file belonging to the source file at `path`.
    pub fn source_to_test(&self, path: &Path) -> Result<PathBuf, MappingError> {
        let path = normalize(path);
        match self.kind {
            LayoutKind::SideBySide => side_by_side::source_to_test(&self.config, &path),
            LayoutKind::Flat => flat::source_to_test(&self.config, &path),
            LayoutKind::FollowHierarchy => follow_hierarchy::source_to_test(&self.config, &path),
        }
    }

    /// Plausible source files for the test file at `path`, most likely first.
    ///
    /// The sequence is never empty and is produced lazily; nothing is checked
    /// on disk.
    pub fn test_to_source_candidates(&self, path: &Path) -> Result<Candidates, MappingError> {
        let path = normalize(path);
        match self.kind {
            LayoutKind::SideBySide => {
                side_by_side::source_candidates(&self.config, &path).map(Candidates::listed)
            }
            LayoutKind::Flat => flat::source_candidates(&self.config, &path).map(Candidates::Flat),
            LayoutKind::FollowHierarchy => {
                follow_hierarchy::source_candidates(&self.config, &path).map(Candidates::listed)
            }
        }
    }
}

/// Lazily generated reverse-mapping results.
#[derive(Debug)]
pub enum Candidates {
    Listed(std::vec::IntoIter<PathBuf>),
    Flat(FlatCandidates),
}

impl Candidates {
    fn listed(paths: Vec<PathBuf>) -> Self {
        Self::Listed(paths.into_iter())
    }
}

impl Iterator for Candidates {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        match self {
            Self::Listed(iter) => iter.next(),
            Self::Flat(iter) => iter.next(),
        }
    }
}
