//! Reading the template script with encoding fallback.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::warn;

/// Read the template as lines, trying UTF-8 first and falling back to
/// Windows-1252.
///
/// Encodings can never be detected with certainty; the single-byte fallback
/// covers the legacy scripts this tool historically met. Line terminators
/// are stripped.
pub fn read_script_lines(path: &Path) -> Result<Vec<String>> {
    let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let text = decode_text(&bytes, path);
    Ok(text.lines().map(str::to_string).collect())
}

fn decode_text(bytes: &[u8], path: &Path) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            warn!(path = %path.display(), "not valid UTF-8, decoding as Windows-1252");
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded.into_owned()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_scripts_read_as_lines() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("sim.in");
        fs::write(&path, "$depth = 10\nrun()\n").expect("write");
        assert_eq!(
            read_script_lines(&path).expect("read"),
            vec!["$depth = 10".to_string(), "run()".to_string()]
        );
    }

    #[test]
    fn windows_1252_bytes_fall_back() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("legacy.in");
        // 0xE4 is "ä" in Windows-1252 and invalid as a UTF-8 start byte here.
        fs::write(&path, b"# L\xE4nge\n$depth = 10\n").expect("write");
        let lines = read_script_lines(&path).expect("read");
        assert_eq!(lines[0], "# Länge");
        assert_eq!(lines[1], "$depth = 10");
    }

    #[test]
    fn missing_file_reports_the_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("absent.in");
        let err = read_script_lines(&path).expect_err("missing");
        assert!(format!("{err:#}").contains("absent.in"));
    }
}
