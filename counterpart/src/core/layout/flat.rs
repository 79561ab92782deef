//! All tests directly under the test root: `src/bar/baz.py` <-> `tests/test_bar_baz.py`.
//!
//! Flattening joins module segments with `_`, which loses information: on the
//! way back every underscore may have been a separator or a literal, and the
//! last segment may have been a module or an aggregator. [`FlatCandidates`]
//! enumerates those readings lazily.

use std::path::{Path, PathBuf};

use super::LayoutConfig;
use crate::core::module_path::{Ending, ModuleNaming, segments};
use crate::error::MappingError;

const SEPARATOR: char = '_';

pub(super) fn is_test_file(config: &LayoutConfig, path: &Path) -> bool {
    let Ok(relative) = config.under_test_root(path) else {
        return false;
    };
    match (segments(relative), config.naming.break_down(relative)) {
        (Ok(segs), Ok(parts)) => {
            segs.len() == 1 && parts.len() == 1 && config.is_prefixed(&parts[0])
        }
        _ => false,
    }
}

pub(super) fn source_to_test(config: &LayoutConfig, path: &Path) -> Result<PathBuf, MappingError> {
    let relative = config.under_source_root(path)?;
    let parts = config.naming.break_down(relative)?;
    if parts.is_empty() {
        return Err(MappingError::EmptyModulePath(path.to_path_buf()));
    }
    let flat_name = format!("{}{}", config.prefix, parts.join("_"));
    config
        .naming
        .glue(&config.test_root, &[flat_name], Ending::Module)
        .ok_or_else(|| MappingError::EmptyModulePath(path.to_path_buf()))
}

pub(super) fn source_candidates(
    config: &LayoutConfig,
    path: &Path,
) -> Result<FlatCandidates, MappingError> {
    let relative = config.under_test_root(path)?;
    if segments(relative)?.len() > 1 {
        return Err(MappingError::NestedFlatTest(path.to_path_buf()));
    }
    let parts = config.naming.break_down(relative)?;
    let name = parts
        .first()
        .map(|part| config.strip_prefix(part))
        .filter(|name| !name.is_empty())
        .ok_or_else(|| MappingError::EmptyModulePath(path.to_path_buf()))?;
    Ok(FlatCandidates::new(
        config.source_root.clone(),
        name,
        config.naming.clone(),
    ))
}

/// Source paths a flattened test name may have come from.
///
/// Readings with more separators come first. Among readings with the same
/// number of separators, separator positions are taken in lexicographic order
/// (leftmost first). Each reading yields the plain module, then the
/// aggregator. Readings that would create an empty segment are skipped, so
/// `foo__bar` never becomes `foo//bar`.
#[derive(Debug)]
pub struct FlatCandidates {
    base: PathBuf,
    pieces: Vec<String>,
    naming: ModuleNaming,
    separators: Option<Vec<usize>>,
    pending: Option<PathBuf>,
}

impl FlatCandidates {
    fn new(base: PathBuf, name: &str, naming: ModuleNaming) -> Self {
        let pieces: Vec<String> = name.split(SEPARATOR).map(str::to_string).collect();
        let gaps = pieces.len() - 1;
        Self {
            base,
            pieces,
            naming,
            separators: Some((0..gaps).collect()),
            pending: None,
        }
    }

    fn gaps(&self) -> usize {
        self.pieces.len() - 1
    }

    /// Hand out the current separator set and step to the next one.
    fn advance(&mut self) -> Option<Vec<usize>> {
        let current = self.separators.take()?;
        self.separators = next_combination(&current, self.gaps());
        if self.separators.is_none() && !current.is_empty() {
            self.separators = Some((0..current.len() - 1).collect());
        }
        Some(current)
    }

    fn reading(&self, separators: &[usize]) -> Option<Vec<String>> {
        let mut out = Vec::with_capacity(separators.len() + 1);
        let mut current = self.pieces[0].clone();
        for (gap, piece) in self.pieces[1..].iter().enumerate() {
            if separators.contains(&gap) {
                out.push(std::mem::take(&mut current));
                current.push_str(piece);
            } else {
                current.push(SEPARATOR);
                current.push_str(piece);
            }
        }
        out.push(current);
        if out.iter().any(String::is_empty) {
            return None;
        }
        Some(out)
    }
}

impl Iterator for FlatCandidates {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        if let Some(aggregator) = self.pending.take() {
            return Some(aggregator);
        }
        loop {
            let separators = self.advance()?;
            let Some(parts) = self.reading(&separators) else {
                continue;
            };
            self.pending = self.naming.glue(&self.base, &parts, Ending::Aggregator);
            return self.naming.glue(&self.base, &parts, Ending::Module);
        }
    }
}

/// Next `k`-subset of `0..n` in lexicographic order, `k = current.len()`.
fn next_combination(current: &[usize], n: usize) -> Option<Vec<usize>> {
    let k = current.len();
    for i in (0..k).rev() {
        if current[i] < n - k + i {
            let mut next = current.to_vec();
            next[i] += 1;
            for j in i + 1..k {
                next[j] = next[j - 1] + 1;
            }
            return Some(next);
        }
    }
    None
}
