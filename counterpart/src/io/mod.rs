//! Side-effecting helpers: configuration files, root discovery, processes and
//! the editor and test runner collaborators.

pub mod config;
pub mod editor;
pub mod process;
pub mod root;
pub mod test_runner;
pub mod workspace;
