//! Module vocabulary: source extension and aggregator files.
//!
//! A path like `foo/bar/qux.py` breaks down into the module segments
//! `["foo", "bar", "qux"]`. The aggregator `foo/bar/__init__.py` names its
//! directory, so it breaks down into `["foo", "bar"]`.

use std::path::{Component, Path, PathBuf};

use crate::error::MappingError;

/// How a list of module segments turns back into a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    /// `a/b` -> `a/b.py`
    Module,
    /// `a/b` -> `a/b/__init__.py`
    Aggregator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNaming {
    extension: String,
    aggregator: String,
}

impl Default for ModuleNaming {
    fn default() -> Self {
        Self::new("py", "__init__")
    }
}

impl ModuleNaming {
    /// `extension` is given without the leading dot.
    pub fn new(extension: impl Into<String>, aggregator: impl Into<String>) -> Self {
        Self {
            extension: extension.into(),
            aggregator: aggregator.into(),
        }
    }

    fn suffix(&self) -> String {
        format!(".{}", self.extension)
    }

    pub fn aggregator_file(&self) -> String {
        format!("{}{}", self.aggregator, self.suffix())
    }

    /// Split `path` into module segments.
    ///
    /// The source extension is stripped from the last segment; an aggregator
    /// file is dropped entirely. Files with another extension keep their full
    /// name.
    pub fn break_down(&self, path: &Path) -> Result<Vec<String>, MappingError> {
        let mut parts = segments(path)?;
        let suffix = self.suffix();
        if let Some(last) = parts.last_mut() {
            if *last == self.aggregator_file() {
                parts.pop();
            } else if let Some(stem) = last.strip_suffix(&suffix) {
                *last = stem.to_string();
            }
        }
        Ok(parts)
    }

    /// Join `base` and `parts` into a file path with the given ending.
    ///
    /// Returns `None` for a module ending without any segment to carry the
    /// extension.
    pub fn glue(&self, base: &Path, parts: &[String], ending: Ending) -> Option<PathBuf> {
        let mut path = base.to_path_buf();
        match ending {
            Ending::Module => {
                let (last, dirs) = parts.split_last()?;
                path.extend(dirs);
                path.push(format!("{}{}", last, self.suffix()));
            }
            Ending::Aggregator => {
                path.extend(parts);
                path.push(self.aggregator_file());
            }
        }
        Some(path)
    }
}

/// Plain UTF-8 segments of a relative path; `.` is skipped.
pub fn segments(path: &Path) -> Result<Vec<String>, MappingError> {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .map(|component| {
            component
                .as_os_str()
                .to_str()
                .map(str::to_string)
                .ok_or_else(|| MappingError::NonUtf8Path(path.to_path_buf()))
        })
        .collect()
}
