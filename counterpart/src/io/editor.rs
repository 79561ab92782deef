//! Editor abstraction: opening a counterpart and asking before creating one.
//!
//! [`VimEditor`] does not drive an editor itself. It prints the ex command an
//! editor integration should execute, one line per open request.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use dialoguer::Confirm;
use tracing::{debug, instrument};

use crate::core::split::{SplitPlacement, vim_open_command};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenRequest {
    pub path: PathBuf,
    pub placement: SplitPlacement,
    /// Directory the new window should work in (the project root).
    pub workdir: PathBuf,
}

pub trait Editor {
    fn open(&self, request: &OpenRequest) -> Result<()>;

    /// Whether `path`, which does not exist yet, should be created.
    fn confirm_create(&self, path: &Path) -> Result<bool>;
}

#[derive(Debug, Clone, Default)]
pub struct VimEditor {
    loaded_buffers: BTreeSet<PathBuf>,
    assume_yes: bool,
    /// Leave stdout to the caller, e.g. for `--json` reports.
    quiet: bool,
}

impl VimEditor {
    /// `loaded_buffers` are files already open in the editor; they are
    /// reused rather than split again.
    pub fn new(loaded_buffers: impl IntoIterator<Item = PathBuf>, assume_yes: bool) -> Self {
        Self {
            loaded_buffers: loaded_buffers.into_iter().collect(),
            assume_yes,
            quiet: false,
        }
    }

    pub fn quiet(self) -> Self {
        Self {
            quiet: true,
            ..self
        }
    }

    pub fn command(&self, request: &OpenRequest) -> String {
        let buffer_exists = self.loaded_buffers.contains(&request.path);
        let open = vim_open_command(
            &escape_ex(&request.path),
            request.placement,
            buffer_exists,
        );
        format!("{open} | lcd {}", escape_ex(&request.workdir))
    }
}

impl Editor for VimEditor {
    #[instrument(skip_all, fields(path = %request.path.display(), placement = %request.placement))]
    fn open(&self, request: &OpenRequest) -> Result<()> {
        let command = self.command(request);
        debug!(command = %command, quiet = self.quiet, "emitting editor command");
        if !self.quiet {
            println!("{command}");
        }
        Ok(())
    }

    fn confirm_create(&self, path: &Path) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }
        Confirm::new()
            .with_prompt(format!(
                "Test file does not exist yet. Create {} now?",
                path.display()
            ))
            .default(true)
            .interact()
            .context("prompt for test file creation")
    }
}

/// Escape characters that are special in ex file arguments.
fn escape_ex(path: &Path) -> String {
    let raw = path.display().to_string();
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, ' ' | '\\' | '|' | '%' | '#' | '"') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str, placement: SplitPlacement) -> OpenRequest {
        OpenRequest {
            path: PathBuf::from(path),
            placement,
            workdir: PathBuf::from("/proj"),
        }
    }

    #[test]
    fn splits_for_new_buffers() {
        let editor = VimEditor::default();
        assert_eq!(
            editor.command(&request("/proj/tests/test_foo.py", SplitPlacement::Right)),
            "vert rightb split /proj/tests/test_foo.py | lcd /proj"
        );
        assert_eq!(
            editor.command(&request("/proj/foo.py", SplitPlacement::Top)),
            "lefta split /proj/foo.py | lcd /proj"
        );
    }

    #[test]
    fn reuses_loaded_buffers() {
        let editor = VimEditor::new([PathBuf::from("/proj/foo.py")], false);
        assert_eq!(
            editor.command(&request("/proj/foo.py", SplitPlacement::Left)),
            "vert lefta sbuffer /proj/foo.py | lcd /proj"
        );
    }

    #[test]
    fn no_split_edits_in_place() {
        let editor = VimEditor::new([PathBuf::from("/proj/foo.py")], false);
        assert_eq!(
            editor.command(&request("/proj/foo.py", SplitPlacement::No)),
            "edit /proj/foo.py | lcd /proj"
        );
    }

    #[test]
    fn escapes_special_characters() {
        assert_eq!(escape_ex(Path::new("/my proj/a%b#c.py")), "/my\\ proj/a\\%b\\#c.py");
    }

    #[test]
    fn assume_yes_skips_prompt() {
        let editor = VimEditor::new([], true);
        assert!(editor.confirm_create(Path::new("tests/test_foo.py")).expect("confirm"));
    }
}
