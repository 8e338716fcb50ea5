//! Test-only fixtures for driving sweeps against a temporary directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::TempDir;

/// A temporary invocation directory with helpers for writing the
/// run-control file, template scripts, and stub interpreters.
pub struct SweepFixture {
    temp: TempDir,
}

impl SweepFixture {
    pub fn new() -> Result<Self> {
        Ok(Self {
            temp: TempDir::new().context("create tempdir")?,
        })
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn write_rc(&self, contents: &str) -> Result<PathBuf> {
        let path = self.root().join(crate::RC_FILENAME);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    pub fn write_script(&self, name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }

    /// Write an executable shell script to stand in for the simulation
    /// interpreter.
    pub fn write_interpreter(&self, name: &str, body: &str) -> Result<PathBuf> {
        let path = self.root().join(name);
        fs::write(&path, body).with_context(|| format!("write {}", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .with_context(|| format!("chmod {}", path.display()))?;
        }
        Ok(path)
    }

    /// An interpreter that appends each argument it receives, one per line,
    /// to `interpreter.log` in its working directory.
    pub fn recording_interpreter(&self) -> Result<PathBuf> {
        self.write_interpreter(
            "run-sim",
            "#!/bin/sh\nprintf '%s\\n' \"$@\" >> interpreter.log\n",
        )
    }
}
