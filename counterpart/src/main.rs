//! Switch between source and test files.
//!
//! Every command locates the project containing the given path, resolves the
//! configuration for it and applies the configured test layout. `switch`
//! prints the Vim command that opens the counterpart; `run` runs the tests
//! for a file.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use counterpart::core::relpath::{normalize, relpath_from_current_dir};
use counterpart::dispatch::{run_tests, switch_counterpart};
use counterpart::error::{ErrorKind, MappingError};
use counterpart::exit_codes;
use counterpart::io::config::{ConfigLayer, base_config};
use counterpart::io::editor::VimEditor;
use counterpart::io::test_runner::CommandTestRunner;
use counterpart::io::workspace::Workspace;
use counterpart::logging;

#[derive(Parser)]
#[command(
    name = "counterpart",
    version,
    about = "Switch between source and test files and run the tests for the current file"
)]
struct Cli {
    /// Configuration file replacing the built-in defaults.
    #[arg(long, global = true, env = "COUNTERPART_CONFIG")]
    config: Option<PathBuf>,

    /// Test layout: side-by-side, flat or follow-hierarchy.
    #[arg(long, global = true)]
    layout: Option<String>,

    #[arg(long, global = true)]
    source_root: Option<PathBuf>,

    #[arg(long, global = true)]
    test_root: Option<PathBuf>,

    /// Test file prefix.
    #[arg(long, global = true)]
    prefix: Option<String>,

    /// Where the test window opens: top, left, right, bottom or no.
    #[arg(long, global = true)]
    split: Option<String>,

    /// Create missing test files without asking.
    #[arg(short, long, global = true)]
    yes: bool,

    /// File already loaded in the editor (repeatable).
    #[arg(long = "buffer", global = true, value_name = "PATH")]
    buffers: Vec<PathBuf>,

    /// Print results as JSON.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open the test file for a source file, or the source file for a test.
    Switch { path: PathBuf },
    /// Run the tests for a file (a source file runs its test file).
    Run { path: PathBuf },
    /// Print the test file path for a source file.
    TestFile {
        path: PathBuf,
        /// Print relative to the current directory.
        #[arg(long)]
        relative: bool,
    },
    /// Print the existing source file for a test file.
    Source {
        path: PathBuf,
        /// Print every candidate in lookup order, existing or not.
        #[arg(long)]
        candidates: bool,
        /// Print relative to the current directory.
        #[arg(long)]
        relative: bool,
    },
    /// Print the project root containing a path (default: current directory).
    Root { path: Option<PathBuf> },
    /// Exit 0 when the path is a test file, 3 otherwise.
    IsTest { path: PathBuf },
}

impl Cli {
    fn overrides(&self) -> ConfigLayer {
        ConfigLayer {
            layout: self.layout.clone(),
            source_root: self.source_root.clone(),
            test_root: self.test_root.clone(),
            prefix: self.prefix.clone(),
            split: self.split.clone(),
            ..ConfigLayer::default()
        }
    }
}

fn main() {
    logging::init();
    let cli = Cli::parse();
    match run(&cli) {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("{:#}", err);
            process::exit(exit_code_for(&err));
        }
    }
}

fn run(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Command::Switch { path } => cmd_switch(cli, path),
        Command::Run { path } => cmd_run(cli, path),
        Command::TestFile { path, relative } => cmd_test_file(cli, path, *relative),
        Command::Source {
            path,
            candidates,
            relative,
        } => cmd_source(cli, path, *candidates, *relative),
        Command::Root { path } => cmd_root(cli, path.as_deref()),
        Command::IsTest { path } => cmd_is_test(cli, path),
    }
}

fn workspace_for(cli: &Cli, path: &Path) -> Result<(Workspace, PathBuf)> {
    let path = absolute(path)?;
    let base = base_config(cli.config.as_deref())?;
    let workspace = Workspace::discover(&path, base, &cli.overrides())?;
    Ok((workspace, path))
}

fn cmd_switch(cli: &Cli, path: &Path) -> Result<i32> {
    let (workspace, path) = workspace_for(cli, path)?;
    let buffers = cli
        .buffers
        .iter()
        .map(|buffer| Ok(workspace.resolve(&absolute(buffer)?)))
        .collect::<Result<Vec<_>>>()?;
    let editor = VimEditor::new(buffers, cli.yes);
    let editor = if cli.json { editor.quiet() } else { editor };

    let outcome = switch_counterpart(&workspace, &path, &editor)?;
    if cli.json {
        print_json(&outcome)?;
    }
    Ok(exit_codes::OK)
}

fn cmd_run(cli: &Cli, path: &Path) -> Result<i32> {
    let (workspace, path) = workspace_for(cli, path)?;
    let runner = CommandTestRunner::new(workspace.config().runner.command.clone());
    let outcome = run_tests(&workspace, &path, &runner)?;

    if cli.json {
        print_json(&outcome)?;
    } else {
        print!("{}", outcome.stdout);
        eprint!("{}", outcome.stderr);
        if outcome.timed_out {
            eprintln!(
                "tests for {} timed out after {}s",
                outcome.test_file.display(),
                workspace.config().runner.timeout_secs
            );
        }
    }
    Ok(if outcome.success {
        exit_codes::OK
    } else {
        exit_codes::TESTS_FAILED
    })
}

fn cmd_test_file(cli: &Cli, path: &Path, relative: bool) -> Result<i32> {
    let (workspace, path) = workspace_for(cli, path)?;
    let test = workspace.test_file_for(&path)?;
    let shown = shown_path(&test, relative)?;
    if cli.json {
        print_json(&shown)?;
    } else {
        println!("{}", shown.display());
    }
    Ok(exit_codes::OK)
}

fn cmd_source(cli: &Cli, path: &Path, candidates: bool, relative: bool) -> Result<i32> {
    let (workspace, path) = workspace_for(cli, path)?;
    let found = if candidates {
        workspace
            .source_candidates(&path)?
            .map(|candidate| shown_path(&workspace.absolute(&candidate), relative))
            .collect::<Result<Vec<_>>>()?
    } else {
        vec![shown_path(&workspace.source_file_for(&path)?, relative)?]
    };

    if cli.json {
        if candidates {
            print_json(&found)?;
        } else {
            print_json(&found[0])?;
        }
    } else {
        for path in &found {
            println!("{}", path.display());
        }
    }
    Ok(exit_codes::OK)
}

fn cmd_root(cli: &Cli, path: Option<&Path>) -> Result<i32> {
    let start = match path {
        Some(path) => path.to_path_buf(),
        None => std::env::current_dir().context("read current directory")?,
    };
    let (workspace, _) = workspace_for(cli, &start)?;
    if cli.json {
        print_json(&workspace.root())?;
    } else {
        println!("{}", workspace.root().display());
    }
    Ok(exit_codes::OK)
}

fn cmd_is_test(cli: &Cli, path: &Path) -> Result<i32> {
    let (workspace, path) = workspace_for(cli, path)?;
    let is_test = workspace.is_test_file(&path)?;
    if cli.json {
        print_json(&is_test)?;
    }
    Ok(if is_test {
        exit_codes::OK
    } else {
        exit_codes::NOT_TEST
    })
}

fn absolute(path: &Path) -> Result<PathBuf> {
    let path = std::path::absolute(path).with_context(|| format!("resolve {}", path.display()))?;
    Ok(normalize(&path))
}

fn shown_path(path: &Path, relative: bool) -> Result<PathBuf> {
    if relative {
        relpath_from_current_dir(path, Path::new(".")).context("read current directory")
    } else {
        Ok(path.to_path_buf())
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let payload = serde_json::to_string(value).context("serialize json")?;
    println!("{payload}");
    Ok(())
}

/// Exit code for a failed command, from the first typed error in the chain.
fn exit_code_for(err: &anyhow::Error) -> i32 {
    let kind = err
        .chain()
        .find_map(|cause| cause.downcast_ref::<MappingError>())
        .map(MappingError::kind);
    match kind {
        Some(ErrorKind::NotFound) => exit_codes::NOT_FOUND,
        _ => exit_codes::INVALID,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_switch_with_globals() {
        let cli = Cli::parse_from([
            "counterpart",
            "switch",
            "src/foo.py",
            "--yes",
            "--buffer",
            "a.py",
            "--buffer",
            "b.py",
            "--split",
            "left",
        ]);
        assert!(matches!(&cli.command, Command::Switch { path } if path == Path::new("src/foo.py")));
        assert!(cli.yes);
        assert_eq!(cli.buffers, vec![PathBuf::from("a.py"), PathBuf::from("b.py")]);
        assert_eq!(cli.overrides().split.as_deref(), Some("left"));
    }

    #[test]
    fn parse_source_candidates() {
        let cli = Cli::parse_from([
            "counterpart",
            "--layout",
            "flat",
            "source",
            "tests/test_a_b.py",
            "--candidates",
        ]);
        assert!(matches!(
            cli.command,
            Command::Source {
                candidates: true,
                relative: false,
                ..
            }
        ));
        assert_eq!(cli.overrides().layout.as_deref(), Some("flat"));
        assert_eq!(cli.overrides().prefix, None);
    }

    #[test]
    fn parse_root_without_path() {
        let cli = Cli::parse_from(["counterpart", "root"]);
        assert!(matches!(cli.command, Command::Root { path: None }));
    }

    #[test]
    fn exit_codes_follow_error_kind() {
        let not_found = anyhow::Error::new(MappingError::ProjectRootNotFound(PathBuf::from("/x")))
            .context("discover project");
        assert_eq!(exit_code_for(&not_found), exit_codes::NOT_FOUND);

        let invalid = anyhow::Error::new(MappingError::UnknownLayout("nested".to_string()));
        assert_eq!(exit_code_for(&invalid), exit_codes::INVALID);

        assert_eq!(exit_code_for(&anyhow::anyhow!("boom")), exit_codes::INVALID);
    }
}
