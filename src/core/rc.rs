//! Run-control file grammar.
//!
//! Line-oriented `key = value` pairs with `#` comments. A line starting with
//! whitespace continues the most recent key: the first continuation turns
//! the stored value into a two-element list, later ones append.

use anyhow::{Result, anyhow, bail};
use indexmap::IndexMap;

/// A run-control value: scalar until the first continuation line, a list
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RcValue {
    Single(String),
    List(Vec<String>),
}

/// Parsed run-control file contents.
///
/// Built once per run, immutable afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunControl {
    entries: IndexMap<String, RcValue>,
}

impl RunControl {
    pub fn parse(text: &str) -> Result<Self> {
        let mut entries: IndexMap<String, RcValue> = IndexMap::new();
        let mut last_key: Option<String> = None;

        for (index, line) in text.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            if line.chars().next().is_some_and(char::is_whitespace) {
                let key = last_key.clone().ok_or_else(|| {
                    anyhow!("line {}: continuation before any key", index + 1)
                })?;
                let Some(value) = entries.get_mut(&key) else {
                    bail!("line {}: continuation for unknown key `{key}`", index + 1);
                };
                match &mut *value {
                    RcValue::Single(existing) => {
                        let first = std::mem::take(existing);
                        *value = RcValue::List(vec![first, trimmed.to_string()]);
                    }
                    RcValue::List(items) => items.push(trimmed.to_string()),
                }
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                bail!("line {}: expected `key = value`, got `{trimmed}`", index + 1);
            };
            let key = key.trim();
            if key.is_empty() {
                // The legacy format tolerates a bare `= value` line.
                continue;
            }
            entries.insert(key.to_string(), RcValue::Single(value.trim().to_string()));
            last_key = Some(key.to_string());
        }

        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&RcValue> {
        self.entries.get(key)
    }

    /// A required single-valued key; missing or list-valued is a
    /// configuration error naming the key.
    pub fn require(&self, key: &str) -> Result<&str> {
        match self.entries.get(key) {
            Some(RcValue::Single(value)) => Ok(value),
            Some(RcValue::List(_)) => {
                bail!("run-control key `{key}` must be a single value, not a list")
            }
            None => bail!("run-control file is missing the required key `{key}`"),
        }
    }

    /// An optional single-valued key; empty values count as absent.
    pub fn optional(&self, key: &str) -> Option<&str> {
        match self.entries.get(key) {
            Some(RcValue::Single(value)) if !value.is_empty() => Some(value),
            _ => None,
        }
    }

    /// Hook commands under `key`, ready to spawn.
    ///
    /// Scalar or list values are flattened; each entry may hold several
    /// commands separated by `;`; each command splits on whitespace into an
    /// argument vector. Empty commands are dropped.
    pub fn commands(&self, key: &str) -> Vec<Vec<String>> {
        let entries: Vec<&str> = match self.entries.get(key) {
            Some(RcValue::Single(value)) => vec![value.as_str()],
            Some(RcValue::List(items)) => items.iter().map(String::as_str).collect(),
            None => Vec::new(),
        };
        entries
            .iter()
            .flat_map(|entry| entry.split(';'))
            .map(|command| {
                command
                    .split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|argv| !argv.is_empty())
            .collect()
    }
}
