//! Tests next to their sources: `src/bar/baz.py` <-> `src/bar/test_baz.py`.
//!
//! Only the final segment matters; the source root is not consulted.

use std::path::{Path, PathBuf};

use super::LayoutConfig;
use crate::core::module_path::Ending;
use crate::error::MappingError;

pub(super) fn is_test_file(config: &LayoutConfig, path: &Path) -> bool {
    match config.naming.break_down(path) {
        Ok(parts) => parts.last().is_some_and(|last| config.is_prefixed(last)),
        Err(_) => false,
    }
}

pub(super) fn source_to_test(config: &LayoutConfig, path: &Path) -> Result<PathBuf, MappingError> {
    let mut parts = config.naming.break_down(path)?;
    let last = parts
        .last_mut()
        .ok_or_else(|| MappingError::EmptyModulePath(path.to_path_buf()))?;
    *last = format!("{}{}", config.prefix, last);
    config
        .naming
        .glue(Path::new(""), &parts, Ending::Module)
        .ok_or_else(|| MappingError::EmptyModulePath(path.to_path_buf()))
}

pub(super) fn source_candidates(
    config: &LayoutConfig,
    path: &Path,
) -> Result<Vec<PathBuf>, MappingError> {
    let mut parts = config.naming.break_down(path)?;
    let last = parts
        .last_mut()
        .ok_or_else(|| MappingError::EmptyModulePath(path.to_path_buf()))?;
    if !config.is_prefixed(last) {
        return Err(MappingError::NotATestFile(path.to_path_buf()));
    }
    *last = last[config.prefix.len()..].to_string();
    let source = config
        .naming
        .glue(Path::new(""), &parts, Ending::Module)
        .ok_or_else(|| MappingError::EmptyModulePath(path.to_path_buf()))?;
    Ok(vec![source])
}

#[cfg(test)]
mod tests {
    use super::super::{Layout, LayoutKind};
    use super::*;

    fn layout(prefix: &str) -> Layout {
        Layout::new(
            LayoutKind::SideBySide,
            LayoutConfig {
                source_root: PathBuf::from("src"),
                prefix: prefix.to_string(),
                ..LayoutConfig::default()
            },
        )
    }

    fn to_test(layout: &Layout, path: &str) -> String {
        layout
            .source_to_test(Path::new(path))
            .expect("test file")
            .display()
            .to_string()
    }

    fn candidates(layout: &Layout, path: &str) -> Vec<String> {
        layout
            .test_to_source_candidates(Path::new(path))
            .expect("candidates")
            .map(|p| p.display().to_string())
            .collect()
    }

    #[test]
    fn detects_test_files_by_final_segment() {
        let layout = layout("test_");
        assert!(layout.is_test_file(Path::new("test_foo.py")));
        assert!(layout.is_test_file(Path::new("foo/test_bar.py")));
        assert!(layout.is_test_file(Path::new("tests/foo/test_bar.py")));
        assert!(layout.is_test_file(Path::new("test_foo/test_bar.py")));
        assert!(!layout.is_test_file(Path::new("foo.py")));
        assert!(!layout.is_test_file(Path::new("src/foo.py")));
        assert!(!layout.is_test_file(Path::new("src/foo/bar.py")));
    }

    #[test]
    fn detects_test_files_with_alternate_prefix() {
        let layout = layout("_");
        assert!(layout.is_test_file(Path::new("_foo.py")));
        assert!(layout.is_test_file(Path::new("foo/_bar.py")));
        assert!(layout.is_test_file(Path::new("test_foo/_bar.py")));
        assert!(!layout.is_test_file(Path::new("foo.py")));
        assert!(!layout.is_test_file(Path::new("src/foo/bar.py")));
    }

    #[test]
    fn bare_prefix_is_not_a_test_file() {
        assert!(!layout("test_").is_test_file(Path::new("src/test_.py")));
    }

    #[test]
    fn source_to_test_prefixes_file_name() {
        let layout = layout("test_");
        assert_eq!(to_test(&layout, "src/foo.py"), "src/test_foo.py");
        assert_eq!(to_test(&layout, "src/bar/baz.py"), "src/bar/test_baz.py");
        assert_eq!(to_test(&layout, "foo.py"), "test_foo.py");
    }

    #[test]
    fn source_to_test_with_alternate_prefix() {
        let layout = layout("_");
        assert_eq!(to_test(&layout, "src/foo.py"), "src/_foo.py");
        assert_eq!(to_test(&layout, "src/bar/baz.py"), "src/bar/_baz.py");
        assert_eq!(to_test(&layout, "foo.py"), "_foo.py");
    }

    #[test]
    fn reversal_yields_single_candidate() {
        let layout = layout("test_");
        assert_eq!(candidates(&layout, "src/test_foo.py"), vec!["src/foo.py"]);
        assert_eq!(candidates(&layout, "src/bar/test_baz.py"), vec!["src/bar/baz.py"]);
        assert_eq!(candidates(&layout, "test_foo.py"), vec!["foo.py"]);

        let layout = self::layout("_");
        assert_eq!(candidates(&layout, "src/bar/_baz.py"), vec!["src/bar/baz.py"]);
    }

    #[test]
    fn reversal_rejects_unprefixed_name() {
        let err = layout("test_")
            .test_to_source_candidates(Path::new("src/foo.py"))
            .unwrap_err();
        assert!(matches!(err, MappingError::NotATestFile(_)));
    }

    #[test]
    fn round_trips_source_paths() {
        let layout = layout("test_");
        for source in ["src/foo.py", "src/a/b/c.py", "top.py"] {
            let test = layout.source_to_test(Path::new(source)).expect("test");
            let first = layout
                .test_to_source_candidates(&test)
                .expect("candidates")
                .next()
                .expect("first");
            assert_eq!(first, PathBuf::from(source));
        }
    }

    #[test]
    fn top_level_aggregator_has_no_test_file() {
        let err = layout("test_")
            .source_to_test(Path::new("__init__.py"))
            .unwrap_err();
        assert!(matches!(err, MappingError::EmptyModulePath(_)));
    }
}
