//! Configuration: built-in defaults, an optional config file, the project's
//! `.counterpart.toml`, and command-line overrides, in that order.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::layout::{Layout, LayoutConfig, LayoutKind};
use crate::core::module_path::ModuleNaming;
use crate::core::split::SplitPlacement;
use crate::error::MappingError;

/// Project-local configuration file. Its presence also marks a project root.
pub const PROJECT_CONFIG_FILE: &str = ".counterpart.toml";

/// Counterpart configuration (TOML).
///
/// Missing fields default to the conventions of a Python project with a
/// `tests/` directory mirroring the package tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CounterpartConfig {
    /// `side-by-side`, `flat` or `follow-hierarchy`.
    pub layout: String,

    /// Source tree, relative to the project root. Empty is the root itself.
    pub source_root: PathBuf,

    /// Test tree, relative to the project root.
    pub test_root: PathBuf,

    pub prefix: String,

    /// Source file extension, without the dot.
    pub extension: String,

    /// File stem of package aggregator files.
    pub aggregator: String,

    /// Ask before creating a test file that does not exist yet.
    pub confirm_create: bool,

    /// `top`, `left`, `right`, `bottom` or `no`.
    pub split: String,

    pub root: RootConfig,

    pub runner: RunnerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RootConfig {
    /// Entries whose presence marks a project root.
    pub markers: Vec<String>,

    /// Give up at the home directory instead of the filesystem root.
    pub stop_at_home: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Test command. Arguments are templates over `file` and `root`; when none
    /// mentions `file`, the test file is appended.
    pub command: Vec<String>,

    pub timeout_secs: u64,

    /// Truncate captured test output beyond this many bytes.
    pub output_limit_bytes: usize,
}

impl Default for RootConfig {
    fn default() -> Self {
        Self {
            markers: vec![
                ".git".to_string(),
                "setup.py".to_string(),
                "setup.cfg".to_string(),
            ],
            stop_at_home: true,
        }
    }
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            command: vec![
                "nosetests".to_string(),
                "-q".to_string(),
                "--with-machineout".to_string(),
            ],
            timeout_secs: 10 * 60,
            output_limit_bytes: 1_000_000,
        }
    }
}

impl Default for CounterpartConfig {
    fn default() -> Self {
        Self {
            layout: LayoutKind::FollowHierarchy.to_string(),
            source_root: PathBuf::new(),
            test_root: PathBuf::from("tests"),
            prefix: "test_".to_string(),
            extension: "py".to_string(),
            aggregator: "__init__".to_string(),
            confirm_create: true,
            split: SplitPlacement::Right.to_string(),
            root: RootConfig::default(),
            runner: RunnerConfig::default(),
        }
    }
}

impl CounterpartConfig {
    pub fn validate(&self) -> Result<(), MappingError> {
        let kind = self.layout_kind()?;
        self.split_placement()?;
        if self.extension.trim().is_empty() {
            return Err(invalid("extension must be non-empty"));
        }
        if self.aggregator.trim().is_empty() {
            return Err(invalid("aggregator must be non-empty"));
        }
        if kind == LayoutKind::SideBySide && self.prefix.is_empty() {
            return Err(invalid("prefix must be non-empty for the side-by-side layout"));
        }
        if self.prefix.contains(['/', '\\']) {
            return Err(invalid("prefix must not contain a path separator"));
        }
        check_relative_root("source_root", &self.source_root)?;
        check_relative_root("test_root", &self.test_root)?;
        if self.runner.command.is_empty() || self.runner.command[0].trim().is_empty() {
            return Err(invalid("runner.command must be a non-empty array"));
        }
        if self.runner.timeout_secs == 0 {
            return Err(invalid("runner.timeout_secs must be > 0"));
        }
        if self.runner.output_limit_bytes == 0 {
            return Err(invalid("runner.output_limit_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn layout_kind(&self) -> Result<LayoutKind, MappingError> {
        self.layout.parse()
    }

    pub fn split_placement(&self) -> Result<SplitPlacement, MappingError> {
        self.split.parse()
    }

    /// Build the active layout from this configuration.
    pub fn layout(&self) -> Result<Layout, MappingError> {
        let kind = self.layout_kind()?;
        Ok(Layout::new(
            kind,
            LayoutConfig {
                source_root: self.source_root.clone(),
                test_root: self.test_root.clone(),
                prefix: self.prefix.clone(),
                naming: ModuleNaming::new(self.extension.clone(), self.aggregator.clone()),
            },
        ))
    }

    /// Configured markers plus the project configuration file.
    pub fn root_markers(&self) -> Vec<String> {
        let mut markers = self.root.markers.clone();
        if !markers.iter().any(|marker| marker == PROJECT_CONFIG_FILE) {
            markers.push(PROJECT_CONFIG_FILE.to_string());
        }
        markers
    }
}

fn invalid(message: &str) -> MappingError {
    MappingError::InvalidConfig(message.to_string())
}

fn check_relative_root(name: &str, root: &Path) -> Result<(), MappingError> {
    let escapes = root
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
    if escapes {
        return Err(MappingError::InvalidConfig(format!(
            "{name} must be relative to the project root and stay inside it: {}",
            root.display()
        )));
    }
    Ok(())
}

/// A partial configuration laid over another one.
///
/// Used for the project file and for command-line overrides; only the fields
/// that are set replace the underlying values.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigLayer {
    pub layout: Option<String>,
    pub source_root: Option<PathBuf>,
    pub test_root: Option<PathBuf>,
    pub prefix: Option<String>,
    pub extension: Option<String>,
    pub aggregator: Option<String>,
    pub confirm_create: Option<bool>,
    pub split: Option<String>,
    pub root: Option<RootLayer>,
    pub runner: Option<RunnerLayer>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RootLayer {
    pub markers: Option<Vec<String>>,
    pub stop_at_home: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerLayer {
    pub command: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub output_limit_bytes: Option<usize>,
}

/// Lay `layer` over `base` and validate the result.
pub fn apply_layer(
    mut base: CounterpartConfig,
    layer: &ConfigLayer,
) -> Result<CounterpartConfig, MappingError> {
    fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
        if let Some(value) = value {
            *slot = value.clone();
        }
    }

    set(&mut base.layout, &layer.layout);
    set(&mut base.source_root, &layer.source_root);
    set(&mut base.test_root, &layer.test_root);
    set(&mut base.prefix, &layer.prefix);
    set(&mut base.extension, &layer.extension);
    set(&mut base.aggregator, &layer.aggregator);
    set(&mut base.confirm_create, &layer.confirm_create);
    set(&mut base.split, &layer.split);
    if let Some(root) = &layer.root {
        set(&mut base.root.markers, &root.markers);
        set(&mut base.root.stop_at_home, &root.stop_at_home);
    }
    if let Some(runner) = &layer.runner {
        set(&mut base.runner.command, &runner.command);
        set(&mut base.runner.timeout_secs, &runner.timeout_secs);
        set(&mut base.runner.output_limit_bytes, &runner.output_limit_bytes);
    }
    base.validate()?;
    Ok(base)
}

/// Load a complete config from a TOML file; missing fields take defaults.
pub fn load_config(path: &Path) -> Result<CounterpartConfig> {
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: CounterpartConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()?;
    debug!(path = %path.display(), "loaded config");
    Ok(cfg)
}

/// Load a config layer, or `None` if the file does not exist.
pub fn load_layer(path: &Path) -> Result<Option<ConfigLayer>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let layer: ConfigLayer =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    debug!(path = %path.display(), "loaded config layer");
    Ok(Some(layer))
}

/// Base configuration: the file at `path` if given, built-in defaults otherwise.
pub fn base_config(path: Option<&Path>) -> Result<CounterpartConfig> {
    match path {
        Some(path) => load_config(path),
        None => Ok(CounterpartConfig::default()),
    }
}

/// Overlay the project file of `project_root`, if any, onto `base`.
pub fn with_project_file(base: CounterpartConfig, project_root: &Path) -> Result<CounterpartConfig> {
    let path = project_file(project_root);
    match load_layer(&path)? {
        Some(layer) => {
            apply_layer(base, &layer).with_context(|| format!("apply {}", path.display()))
        }
        None => Ok(base),
    }
}

pub fn project_file(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = CounterpartConfig::default();
        cfg.validate().expect("valid");
        assert_eq!(cfg.layout_kind().expect("layout"), LayoutKind::FollowHierarchy);
        assert_eq!(cfg.split_placement().expect("split"), SplitPlacement::Right);
    }

    #[test]
    fn load_partial_file_fills_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("counterpart.toml");
        fs::write(&path, "layout = \"flat\"\nsource_root = \"src\"\n").expect("write");

        let cfg = load_config(&path).expect("load");
        assert_eq!(cfg.layout, "flat");
        assert_eq!(cfg.source_root, PathBuf::from("src"));
        assert_eq!(cfg.test_root, PathBuf::from("tests"));
        assert_eq!(cfg.runner, RunnerConfig::default());
    }

    #[test]
    fn load_rejects_unknown_layout() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("counterpart.toml");
        fs::write(&path, "layout = \"nested\"\n").expect("write");

        let err = load_config(&path).unwrap_err();
        let mapping = err.downcast_ref::<MappingError>().expect("mapping error");
        assert!(matches!(mapping, MappingError::UnknownLayout(name) if name == "nested"));
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert!(base_config(Some(&temp.path().join("missing.toml"))).is_err());
    }

    #[test]
    fn layer_overrides_only_set_fields() {
        let layer = ConfigLayer {
            prefix: Some("_".to_string()),
            runner: Some(RunnerLayer {
                timeout_secs: Some(5),
                ..RunnerLayer::default()
            }),
            ..ConfigLayer::default()
        };
        let cfg = apply_layer(CounterpartConfig::default(), &layer).expect("apply");
        assert_eq!(cfg.prefix, "_");
        assert_eq!(cfg.runner.timeout_secs, 5);
        assert_eq!(cfg.runner.command, RunnerConfig::default().command);
        assert_eq!(cfg.layout, "follow-hierarchy");
    }

    #[test]
    fn project_file_is_layered_over_base() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(
            temp.path().join(PROJECT_CONFIG_FILE),
            "layout = \"side-by-side\"\nprefix = \"_\"\n",
        )
        .expect("write");
        let base = CounterpartConfig {
            split: "bottom".to_string(),
            ..CounterpartConfig::default()
        };

        let cfg = with_project_file(base, temp.path()).expect("layer");
        assert_eq!(cfg.layout, "side-by-side");
        assert_eq!(cfg.prefix, "_");
        assert_eq!(cfg.split, "bottom");
    }

    #[test]
    fn layer_rejects_unknown_keys() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(PROJECT_CONFIG_FILE), "prefx = \"_\"\n").expect("write");
        assert!(with_project_file(CounterpartConfig::default(), temp.path()).is_err());
    }

    #[test]
    fn validate_rejects_escaping_roots() {
        let cfg = CounterpartConfig {
            test_root: PathBuf::from("../tests"),
            ..CounterpartConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(MappingError::InvalidConfig(_))));

        let cfg = CounterpartConfig {
            source_root: PathBuf::from("/abs/src"),
            ..CounterpartConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_empty_side_by_side_prefix() {
        let cfg = CounterpartConfig {
            layout: "side-by-side".to_string(),
            prefix: String::new(),
            ..CounterpartConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_prefix_with_separator() {
        for prefix in ["tests/test_", "..\\test_"] {
            let cfg = CounterpartConfig {
                prefix: prefix.to_string(),
                ..CounterpartConfig::default()
            };
            let err = cfg.validate().unwrap_err();
            assert!(err.to_string().contains("path separator"), "{prefix}: {err}");
        }
    }

    #[test]
    fn root_markers_include_project_file() {
        let markers = CounterpartConfig::default().root_markers();
        assert_eq!(markers, vec![".git", "setup.py", "setup.cfg", PROJECT_CONFIG_FILE]);
    }

    #[test]
    fn layout_uses_configured_naming() {
        let cfg = CounterpartConfig {
            extension: "rb".to_string(),
            prefix: "test_".to_string(),
            ..CounterpartConfig::default()
        };
        let test = cfg
            .layout()
            .expect("layout")
            .source_to_test(Path::new("lib/foo.rb"))
            .expect("test");
        assert_eq!(test, PathBuf::from("tests/test_lib/test_foo.rb"));
    }
}
