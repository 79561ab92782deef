//! Lexical path arithmetic: normalisation and relative paths.
//!
//! Nothing here touches the filesystem. Symlinks are not resolved; callers
//! that need that canonicalise first (see `io::root`). Only
//! [`relpath_from_current_dir`] looks at the process state.

use std::path::{Component, Path, PathBuf};
use std::{env, io};

/// Fold `.` and `..` segments without consulting the filesystem.
///
/// Leading `..` of a relative path are kept; `..` directly under the root is
/// dropped. An input that collapses to nothing yields an empty path.
pub fn normalize(path: &Path) -> PathBuf {
    let mut out: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.last() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => out.push(component),
            },
            other => out.push(other),
        }
    }
    out.iter().collect()
}

/// Return `path` relative to `start`.
///
/// Relative inputs are resolved against `cwd` first. The result is `.` when
/// both name the same directory, and climbs with `..` when `path` lies outside
/// `start`. Trailing separators are irrelevant.
pub fn relpath(path: &Path, start: &Path, cwd: &Path) -> PathBuf {
    let target = normalize(&cwd.join(path));
    let base = normalize(&cwd.join(start));

    let target: Vec<Component<'_>> = target.components().collect();
    let base: Vec<Component<'_>> = base.components().collect();
    let common = target
        .iter()
        .zip(base.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut out = PathBuf::new();
    for _ in common..base.len() {
        out.push(Component::ParentDir);
    }
    for component in &target[common..] {
        out.push(component);
    }
    if out.as_os_str().is_empty() {
        return PathBuf::from(".");
    }
    out
}

/// [`relpath`] against the process working directory.
pub fn relpath_from_current_dir(path: &Path, start: &Path) -> io::Result<PathBuf> {
    let cwd = env::current_dir()?;
    Ok(relpath(path, start, &cwd))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rel(path: &str, start: &str) -> String {
        relpath(Path::new(path), Path::new(start), Path::new("/home/user/project"))
            .display()
            .to_string()
    }

    #[test]
    fn relpath_descends_into_subtree() {
        assert_eq!(rel("/tmp/foo/bar", "/tmp"), "foo/bar");
        assert_eq!(rel("/etc/passwd", "/"), "etc/passwd");
    }

    #[test]
    fn relpath_walks_backward() {
        assert_eq!(rel(".././foo/bar.py", "."), "../foo/bar.py");
        assert_eq!(rel("/a/b", "/c"), "../a/b");
        assert_eq!(rel("/a/b/c", "/d/e"), "../../a/b/c");
        assert_eq!(rel("/", "/a/b"), "../..");
    }

    #[test]
    fn relpath_ignores_trailing_separators() {
        assert_eq!(rel("foo/", "foo"), ".");
        assert_eq!(rel("foo", "foo/"), ".");
        assert_eq!(rel("foo", "foo"), ".");
    }

    #[test]
    fn relpath_of_absolute_path_inside_cwd() {
        assert_eq!(rel("/home/user/project/src/foo.py", "."), "src/foo.py");
    }

    #[test]
    fn normalize_folds_dots() {
        assert_eq!(normalize(Path::new("./a/./b/../c")), PathBuf::from("a/c"));
        assert_eq!(normalize(Path::new("../a")), PathBuf::from("../a"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("a/..")), PathBuf::new());
    }

    #[test]
    fn relpath_from_current_dir_resolves_relative_inputs() {
        let cwd = env::current_dir().expect("cwd");
        assert_eq!(
            relpath_from_current_dir(&cwd.join("a/b.py"), Path::new(".")).expect("relpath"),
            PathBuf::from("a/b.py")
        );
        assert_eq!(
            relpath_from_current_dir(Path::new("x"), &cwd.join("x")).expect("relpath"),
            PathBuf::from(".")
        );
    }
}
