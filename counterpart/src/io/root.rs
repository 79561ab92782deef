//! Project-root discovery by walking up from a file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, instrument, trace};

use crate::error::MappingError;
use crate::io::config::CounterpartConfig;

/// What marks a project root and where the upward search gives up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootSearch {
    pub markers: Vec<String>,
    /// Directory that ends the search like the filesystem root does.
    pub stop_at: Option<PathBuf>,
}

impl RootSearch {
    /// Markers from `config`; stops at the user's home directory when
    /// `root.stop_at_home` is set.
    pub fn from_config(config: &CounterpartConfig) -> Self {
        let stop_at = if config.root.stop_at_home {
            dirs::home_dir().map(|home| fs::canonicalize(&home).unwrap_or(home))
        } else {
            None
        };
        Self {
            markers: config.root_markers(),
            stop_at,
        }
    }

    /// Whether the walk ends at `dir` without testing it.
    pub fn is_boundary(&self, dir: &Path) -> bool {
        dir.parent().is_none() || self.stop_at.as_deref() == Some(dir)
    }
}

/// Find the nearest ancestor of `start` containing one of the markers.
///
/// `start` may be a file, a directory, or a path that does not exist yet. The
/// walk begins at its nearest existing directory with symlinks resolved, the
/// file's own link included.
/// Fails with [`MappingError::ProjectRootNotFound`] on reaching a boundary.
#[instrument(skip_all, fields(start = %start.display()))]
pub fn find_project_root(start: &Path, search: &RootSearch) -> Result<PathBuf> {
    let mut dir = nearest_existing_dir(start)?;

    loop {
        if search.is_boundary(&dir) {
            debug!(boundary = %dir.display(), "no project root found");
            return Err(MappingError::ProjectRootNotFound(start.to_path_buf()).into());
        }
        trace!(dir = %dir.display(), "checking for root markers");
        if let Some(marker) = search
            .markers
            .iter()
            .find(|marker| dir.join(marker).exists())
        {
            debug!(root = %dir.display(), marker = %marker, "found project root");
            return Ok(dir);
        }
        let Some(parent) = dir.parent().map(Path::to_path_buf) else {
            return Err(MappingError::ProjectRootNotFound(start.to_path_buf()).into());
        };
        dir = parent;
    }
}

/// Directory of the nearest existing ancestor-or-self of `start`, resolved.
///
/// A file is resolved before taking its directory, so a symlinked file walks
/// up from where its target lives.
fn nearest_existing_dir(start: &Path) -> Result<PathBuf> {
    let mut current = start;
    loop {
        if current.exists() {
            let resolved = fs::canonicalize(current)
                .with_context(|| format!("resolve {}", current.display()))?;
            if resolved.is_dir() {
                return Ok(resolved);
            }
            if let Some(parent) = resolved.parent() {
                return Ok(parent.to_path_buf());
            }
            return Ok(resolved);
        }
        match current.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => current = parent,
            _ => return fs::canonicalize(".").context("resolve current directory"),
        }
    }
}
