//! Batch directory setup and invocation-directory bookkeeping.
//!
//! The counter and last-batch pointer are plain read-modify-write files with
//! no locking; concurrent invocations from the same directory are
//! unsupported.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, warn};

/// Monotonic batch counter, one per invocation directory.
pub const COUNTER_FILE: &str = "rystiat-counter";
/// Absolute path of the most recently created batch directory.
pub const LAST_BATCH_FILE: &str = "rystiat-last-batch";
/// Verbatim invoking command line, inside the batch directory.
pub const COMMAND_LINE_FILE: &str = "rystiat_command_line.txt";
/// Suffix on the copy of the original script inside the batch directory.
pub const BACKUP_SUFFIX: &str = "__original_bkup";

/// Paths owned by one batch.
#[derive(Debug, Clone)]
pub struct BatchPaths {
    pub dir: PathBuf,
    pub command_line_path: PathBuf,
    pub backup_path: PathBuf,
}

/// Read the counter, persist `counter + 1`, return the value read.
///
/// A missing or unparsable counter file reads as 0 rather than failing:
/// losing the count is not worth losing the batch.
pub fn read_and_increment_counter(invoke_dir: &Path) -> Result<u64> {
    let path = invoke_dir.join(COUNTER_FILE);
    let counter = match fs::read_to_string(&path) {
        Ok(text) => match text.trim().parse::<u64>() {
            Ok(value) => value,
            Err(_) => {
                warn!(path = %path.display(), "counter file is unparsable, restarting at 0");
                0
            }
        },
        Err(_) => 0,
    };
    fs::write(&path, format!("{}\n", counter + 1))
        .with_context(|| format!("write counter {}", path.display()))?;
    Ok(counter)
}

/// Create the batch directory and its provenance files.
///
/// Writes the invoking command line, copies the original script with the
/// backup suffix, and points the invocation directory's last-batch file at
/// the new directory. Creation is idempotent if the directory exists.
pub fn create_batch(
    invoke_dir: &Path,
    batch_name: &str,
    argv: &[String],
    script_path: &Path,
) -> Result<BatchPaths> {
    let dir = invoke_dir.join(batch_name);
    fs::create_dir_all(&dir).with_context(|| format!("create batch dir {}", dir.display()))?;
    debug!(dir = %dir.display(), "batch directory created");

    let command_line_path = dir.join(COMMAND_LINE_FILE);
    fs::write(&command_line_path, format!("{}\n", argv.join(" ")))
        .with_context(|| format!("write {}", command_line_path.display()))?;

    let script_basename = script_path
        .file_name()
        .with_context(|| format!("script path {} has no file name", script_path.display()))?
        .to_string_lossy()
        .into_owned();
    let backup_path = dir.join(format!("{script_basename}{BACKUP_SUFFIX}"));
    fs::copy(script_path, &backup_path).with_context(|| {
        format!(
            "back up {} to {}",
            script_path.display(),
            backup_path.display()
        )
    })?;

    let pointer_path = invoke_dir.join(LAST_BATCH_FILE);
    fs::write(&pointer_path, format!("{}\n", dir.display()))
        .with_context(|| format!("write {}", pointer_path.display()))?;

    Ok(BatchPaths {
        dir,
        command_line_path,
        backup_path,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_counter_reads_as_zero_and_persists_one() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(read_and_increment_counter(temp.path()).expect("counter"), 0);
        let stored = fs::read_to_string(temp.path().join(COUNTER_FILE)).expect("read");
        assert_eq!(stored.trim(), "1");
    }

    #[test]
    fn counter_increments_across_calls() {
        let temp = tempfile::tempdir().expect("tempdir");
        assert_eq!(read_and_increment_counter(temp.path()).expect("counter"), 0);
        assert_eq!(read_and_increment_counter(temp.path()).expect("counter"), 1);
        assert_eq!(read_and_increment_counter(temp.path()).expect("counter"), 2);
    }

    #[test]
    fn garbage_counter_reads_as_zero() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join(COUNTER_FILE), "not a number").expect("write");
        assert_eq!(read_and_increment_counter(temp.path()).expect("counter"), 0);
    }

    #[test]
    fn create_batch_writes_provenance_and_pointer() {
        let temp = tempfile::tempdir().expect("tempdir");
        let script = temp.path().join("sim.in");
        fs::write(&script, "$depth = 10\n").expect("write script");

        let argv = vec!["rystiat".to_string(), "depth=10..20..5".to_string()];
        let batch =
            create_batch(temp.path(), "000__sim.in__depthScan", &argv, &script).expect("batch");

        assert!(batch.dir.is_dir());
        let recorded = fs::read_to_string(&batch.command_line_path).expect("read");
        assert_eq!(recorded, "rystiat depth=10..20..5\n");

        let backup = fs::read_to_string(&batch.backup_path).expect("read backup");
        assert_eq!(backup, "$depth = 10\n");
        assert!(
            batch
                .backup_path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(BACKUP_SUFFIX))
        );

        let pointer = fs::read_to_string(temp.path().join(LAST_BATCH_FILE)).expect("pointer");
        assert!(pointer.ends_with('\n'));
        assert_eq!(pointer.trim_end(), batch.dir.display().to_string());
    }

    #[test]
    fn create_batch_is_idempotent_for_an_existing_directory() {
        let temp = tempfile::tempdir().expect("tempdir");
        let script = temp.path().join("sim.in");
        fs::write(&script, "x\n").expect("write script");
        let argv = vec!["rystiat".to_string()];
        create_batch(temp.path(), "000__sim.in", &argv, &script).expect("first");
        create_batch(temp.path(), "000__sim.in", &argv, &script).expect("second");
    }
}
