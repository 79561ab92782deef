//! Switch between a source file and its test file, and run the tests for
//! whichever one is open.
//!
//! The crate keeps the mapping rules apart from everything that touches the
//! outside world:
//!
//! - **[`core`]**: Pure path logic (layouts, module paths, split placement).
//!   Works on project-relative paths only and never reads the filesystem.
//! - **[`io`]**: Configuration files, project-root discovery, the editor and
//!   test runner collaborators, and process execution.
//!
//! [`dispatch`] combines the two into the `switch` and `run` commands.

pub mod core;
pub mod dispatch;
pub mod error;
pub mod exit_codes;
pub mod io;
pub mod logging;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
