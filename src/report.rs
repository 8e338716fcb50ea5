//! Product-facing diagnostic lines.
//!
//! Everything here goes to the user's terminal as part of normal driver
//! output, independent of `RUST_LOG` (see `logging` for the split). Three
//! severities, each with a colored `rystiat` prefix, plus keyword
//! highlighting for streamed child output.

use std::sync::LazyLock;

use colored::Colorize;
use regex::Regex;

static FINDINGS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(error|warning|failed)\b").expect("valid findings regex"));

/// Print an informational line.
pub fn info(msg: impl AsRef<str>) {
    println!("{} {}", "rystiat:".white().bold(), msg.as_ref());
}

/// Print a warning line. Warnings never stop the sweep.
pub fn warn(msg: impl AsRef<str>) {
    println!("{} {}", "rystiat warning:".yellow().bold(), msg.as_ref());
}

/// Print an error line.
pub fn error(msg: impl AsRef<str>) {
    println!("{} {}", "rystiat error:".red().bold(), msg.as_ref());
}

/// Emphasize `Error`/`Warning`/`Failed` (case-insensitive, whole words) in a
/// line of child process output.
pub fn highlight_findings(line: &str) -> String {
    FINDINGS
        .replace_all(line, |caps: &regex::Captures<'_>| {
            caps[0].red().bold().to_string()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test: the colored override is process-global state.
    #[test]
    fn highlight_matches_whole_keywords_only() {
        colored::control::set_override(true);
        assert_ne!(highlight_findings("fatal ERROR in step 3"), "fatal ERROR in step 3");
        assert_ne!(highlight_findings("step Failed"), "step Failed");
        // "terrorize" contains "error" but is not a finding.
        assert_eq!(highlight_findings("terrorize"), "terrorize");
        assert_eq!(highlight_findings("all good"), "all good");
        colored::control::unset_override();
    }
}
