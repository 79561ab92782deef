//! Deterministic, pure path mapping.
//!
//! Core modules must be free of I/O side effects. They work on paths relative
//! to the project root and never ask the filesystem whether anything exists.

pub mod layout;
pub mod module_path;
pub mod relpath;
pub mod split;
