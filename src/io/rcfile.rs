//! Locating and loading the run-control file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::core::rc::RunControl;

/// Search `start` and each parent up to the filesystem root for `filename`
/// and parse the first hit.
///
/// `Path::ancestors` bounds the walk at the root by construction. An
/// unreadable directory (e.g. permission denied) counts as "not found
/// here" and the walk continues upward. A total miss is fatal: the driver
/// must not start without run control.
pub fn find_run_control(start: &Path, filename: &str) -> Result<(PathBuf, RunControl)> {
    for dir in start.ancestors() {
        let candidate = dir.join(filename);
        let text = match fs::read_to_string(&candidate) {
            Ok(text) => text,
            Err(err) => {
                debug!(path = %candidate.display(), err = %err, "no run control here");
                continue;
            }
        };
        debug!(path = %candidate.display(), "run control file found");
        let rc = RunControl::parse(&text)
            .with_context(|| format!("parse {}", candidate.display()))?;
        return Ok((candidate, rc));
    }
    bail!(
        "could not find `{filename}` in `{}` or any of its parent directories",
        start.display()
    )
}
