//! Mirrored tree under the test root: `src/bar/baz.py` <-> `tests/test_bar/test_baz.py`.

use std::path::{Path, PathBuf};

use super::LayoutConfig;
use crate::core::module_path::Ending;
use crate::error::MappingError;

pub(super) fn is_test_file(config: &LayoutConfig, path: &Path) -> bool {
    let Ok(relative) = config.under_test_root(path) else {
        return false;
    };
    match config.naming.break_down(relative) {
        Ok(parts) => !parts.is_empty() && parts.iter().all(|part| config.is_prefixed(part)),
        Err(_) => false,
    }
}

pub(super) fn source_to_test(config: &LayoutConfig, path: &Path) -> Result<PathBuf, MappingError> {
    let relative = config.under_source_root(path)?;
    let parts: Vec<String> = config
        .naming
        .break_down(relative)?
        .into_iter()
        .map(|part| format!("{}{}", config.prefix, part))
        .collect();
    config
        .naming
        .glue(&config.test_root, &parts, Ending::Module)
        .ok_or_else(|| MappingError::EmptyModulePath(path.to_path_buf()))
}

/// The stripped module first, then the same segments read as an aggregator.
pub(super) fn source_candidates(
    config: &LayoutConfig,
    path: &Path,
) -> Result<Vec<PathBuf>, MappingError> {
    let relative = config.under_test_root(path)?;
    let parts: Vec<String> = config
        .naming
        .break_down(relative)?
        .iter()
        .map(|part| config.strip_prefix(part).to_string())
        .collect();
    if parts.is_empty() || parts.iter().any(String::is_empty) {
        return Err(MappingError::EmptyModulePath(path.to_path_buf()));
    }
    [Ending::Module, Ending::Aggregator]
        .into_iter()
        .map(|ending| {
            config
                .naming
                .glue(&config.source_root, &parts, ending)
                .ok_or_else(|| MappingError::EmptyModulePath(path.to_path_buf()))
        })
        .collect()
}
