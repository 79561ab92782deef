//! Typed failures of the mapping core.
//!
//! The io and dispatch layers wrap these in `anyhow` with context; the binary
//! downcasts back to [`MappingError`] to pick an exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of a [`MappingError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown layout or split name, or an invalid configuration value.
    Configuration,
    /// A path is not rooted where the operation expects it.
    Location,
    /// No project root, or no existing source candidate.
    NotFound,
    /// A path has a shape the active layout cannot represent.
    Structure,
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("no such test layout: {0} (expected side-by-side, flat or follow-hierarchy)")]
    UnknownLayout(String),

    #[error("no such split placement: {0} (expected top, left, right, bottom or no)")]
    UnknownSplit(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("{} is not under the {label} {}", .path.display(), .root.display())]
    NotUnderRoot {
        path: PathBuf,
        root: PathBuf,
        label: &'static str,
    },

    #[error("{} is not a test file", .0.display())]
    NotATestFile(PathBuf),

    #[error("could not find project root above {}", .0.display())]
    ProjectRootNotFound(PathBuf),

    #[error("source file not found for {} (tried {})", .test_file.display(), render_tried(.tried, .tried_count))]
    SourceNotFound {
        test_file: PathBuf,
        /// The first [`SHOWN_CANDIDATES`] candidates checked.
        tried: Vec<PathBuf>,
        /// Every candidate checked, including those not kept in `tried`.
        tried_count: usize,
    },

    #[error("flat test layout does not allow tests more than one directory deep: {}", .0.display())]
    NestedFlatTest(PathBuf),

    #[error("{} does not name a module", .0.display())]
    EmptyModulePath(PathBuf),

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),
}

impl MappingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownLayout(_) | Self::UnknownSplit(_) | Self::InvalidConfig(_) => {
                ErrorKind::Configuration
            }
            Self::NotUnderRoot { .. } | Self::NotATestFile(_) => ErrorKind::Location,
            Self::ProjectRootNotFound(_) | Self::SourceNotFound { .. } => ErrorKind::NotFound,
            Self::NestedFlatTest(_) | Self::EmptyModulePath(_) | Self::NonUtf8Path(_) => {
                ErrorKind::Structure
            }
        }
    }
}

/// How many checked candidates a [`MappingError::SourceNotFound`] keeps.
pub const SHOWN_CANDIDATES: usize = 8;

fn render_tried(tried: &[PathBuf], total: &usize) -> String {
    let mut shown = tried
        .iter()
        .map(|path| path.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let more = total.saturating_sub(tried.len());
    if more > 0 {
        shown.push_str(&format!(" and {more} more"));
    }
    shown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_taxonomy() {
        assert_eq!(
            MappingError::UnknownLayout("nested".to_string()).kind(),
            ErrorKind::Configuration
        );
        assert_eq!(
            MappingError::NotATestFile(PathBuf::from("foo.py")).kind(),
            ErrorKind::Location
        );
        assert_eq!(
            MappingError::ProjectRootNotFound(PathBuf::from("/tmp")).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            MappingError::NestedFlatTest(PathBuf::from("tests/a/test_b.py")).kind(),
            ErrorKind::Structure
        );
    }

    #[test]
    fn source_not_found_lists_candidates() {
        let err = MappingError::SourceNotFound {
            test_file: PathBuf::from("tests/test_foo.py"),
            tried: vec![PathBuf::from("foo.py"), PathBuf::from("foo/__init__.py")],
            tried_count: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("tests/test_foo.py"));
        assert!(msg.contains("foo.py, foo/__init__.py)"));
    }

    #[test]
    fn source_not_found_summarises_unlisted_candidates() {
        let err = MappingError::SourceNotFound {
            test_file: PathBuf::from("tests/test_a_b_c.py"),
            tried: vec![PathBuf::from("a/b/c.py")],
            tried_count: 8,
        };
        assert!(err.to_string().ends_with("(tried a/b/c.py and 7 more)"));
    }
}
