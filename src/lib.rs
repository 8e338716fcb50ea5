//! Parameter-sweep driver for external numeric simulations.
//!
//! `rystiat` takes a parametrized simulation script, varies one declared
//! parameter over a range given on the command line, generates one rewritten
//! copy of the script per value, and runs an external interpreter on each,
//! collecting scripts and provenance under a numbered batch directory.
//! The architecture enforces a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (parameter parsing, argument
//!   classification, run-control grammar, batch naming, template
//!   substitution). No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting operations (run-control discovery, batch
//!   directory setup, template decoding, subprocess streaming).
//!
//! [`sweep`] coordinates core logic with I/O to implement one batch run.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod report;
pub mod sweep;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Name of the run-control file searched for upward from the invocation
/// directory.
pub const RC_FILENAME: &str = "rystiat.rc";
