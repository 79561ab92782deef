//! Stable exit codes for counterpart CLI commands.

/// Command succeeded; for `is-test`, the path is a test file.
pub const OK: i32 = 0;
/// Invalid configuration, a path outside its expected root, a path the layout
/// cannot map, or any other failure.
pub const INVALID: i32 = 1;
/// No project root, or no existing source file for a test.
pub const NOT_FOUND: i32 = 2;
/// `counterpart is-test` was given a path that is not a test file.
pub const NOT_TEST: i32 = 3;
/// `counterpart run` ran the tests and they failed or timed out.
pub const TESTS_FAILED: i32 = 4;
