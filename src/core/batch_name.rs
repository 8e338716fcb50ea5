//! Batch directory naming.

use indexmap::IndexMap;

use crate::core::params::ParamValue;

/// Longest script basename kept in the directory name.
const BASENAME_LIMIT: usize = 40;

/// Compose the batch directory name.
///
/// `{counter:03}__{basename}` plus one `__{name}={value}` per static
/// parameter in insertion order, plus `__{name}Scan` when a scan is active.
/// Deterministic given the same inputs, so reruns with the same counter
/// reproduce the same name.
pub fn batch_dir_name(
    counter: u64,
    script_basename: &str,
    statics: &IndexMap<String, ParamValue>,
    scan_name: Option<&str>,
) -> String {
    let basename: String = script_basename.chars().take(BASENAME_LIMIT).collect();
    let mut name = format!("{counter:03}__{basename}");
    for (param, value) in statics {
        name.push_str(&format!("__{param}={}", value.render()));
    }
    if let Some(scan) = scan_name {
        name.push_str(&format!("__{scan}Scan"));
    }
    name
}
