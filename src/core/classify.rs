//! Classification of command-line parameters into one scan plus statics.

use anyhow::{Result, bail};
use indexmap::IndexMap;

use crate::core::params::{ParamValue, parse_values};

/// The single parameter whose values drive the sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct ScannedParam {
    pub name: String,
    /// Always more than one value.
    pub values: Vec<ParamValue>,
}

/// A multi-valued argument that arrived after the scan was already chosen
/// and was demoted to a static parameter (first value only).
///
/// The demotion loses information, so the driver must surface it as a
/// warning instead of dropping it silently.
#[derive(Debug, Clone, PartialEq)]
pub struct Demotion {
    /// Name of the parameter already driving the scan.
    pub kept: String,
    /// Name of the rejected scan candidate.
    pub rejected: String,
    /// The value the rejected candidate was pinned to.
    pub pinned: ParamValue,
}

/// Partition of the full argument list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SweepPlan {
    /// At most one scanned parameter: the first argument, in argv order,
    /// whose parsed value sequence has more than one element.
    pub scanned: Option<ScannedParam>,
    /// Single-valued parameters, in insertion order, last write wins.
    pub statics: IndexMap<String, ParamValue>,
    pub demotions: Vec<Demotion>,
}

/// Classify `name=valuestring` tokens in argv order.
///
/// Parameter names are lowercased. A token without `=` is a user error.
pub fn classify_params(tokens: &[String]) -> Result<SweepPlan> {
    let mut plan = SweepPlan::default();
    for token in tokens {
        let Some((name, raw_value)) = token.split_once('=') else {
            bail!("parameter `{token}` is not of the form NAME=VALUE");
        };
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            bail!("parameter `{token}` has an empty name");
        }
        let mut values = parse_values(raw_value)
            .map_err(|err| err.context(format!("parameter `{name}`")))?;
        if values.len() > 1 {
            match &plan.scanned {
                None => {
                    plan.scanned = Some(ScannedParam { name, values });
                }
                Some(scan) => {
                    let pinned = values.swap_remove(0);
                    plan.demotions.push(Demotion {
                        kept: scan.name.clone(),
                        rejected: name.clone(),
                        pinned: pinned.clone(),
                    });
                    plan.statics.insert(name, pinned);
                }
            }
        } else if let Some(value) = values.pop() {
            plan.statics.insert(name, value);
        } else {
            bail!("parameter `{name}` has no value");
        }
    }
    Ok(plan)
}
