//! Stable exit codes for the sweep driver.

/// Sweep completed and every child process exited zero.
pub const OK: i32 = 0;
/// Configuration or I/O error (missing run-control file, bad parameter
/// token, unreadable template) before or during the sweep.
pub const CONFIG: i32 = 1;
/// A declared parameter was never found in the template; the sweep was
/// aborted before running the remaining variants.
pub const VALIDATION: i32 = 2;
/// Sweep completed, but at least one simulation or hook exited non-zero.
pub const SIM_FAILED: i32 = 3;
