//! Template substitution: rewriting assignment lines for one variant.
//!
//! Matching is a whitespace-stripped substring test on `{prefix}{name}=`,
//! kept for compatibility with existing templates. A name that is a suffix
//! of another name (`depth=` inside `mydepth=`) will false-positive match;
//! see DESIGN.md before changing this to a tokenizer.

use indexmap::IndexMap;

use crate::core::params::ParamValue;

/// Inputs for one substitution pass.
#[derive(Debug, Clone)]
pub struct SubstitutionRequest<'a> {
    /// Configured variable prefix, prepended to every tracked name.
    pub prefix: &'a str,
    /// Scanned parameter and its current value, if a scan is active.
    pub scanned: Option<(&'a str, &'a ParamValue)>,
    pub statics: &'a IndexMap<String, ParamValue>,
}

/// One rewritten line sequence plus the parameters that never matched.
#[derive(Debug, Clone, PartialEq)]
pub struct Substitution {
    pub lines: Vec<String>,
    /// Declared parameters with no assignment line in the template: statics
    /// in declaration order, then the scanned name. Non-empty means the
    /// whole sweep must abort before running this variant.
    pub missing: Vec<String>,
}

/// Rewrite `lines` for one variant.
///
/// A matched line is replaced wholesale by the regenerated assignment
/// `{prefix}{name}={value}`; original spacing is not preserved. Each static
/// substitutes at most once (first match wins) and at most one static
/// substitutes per line.
pub fn substitute(lines: &[String], request: &SubstitutionRequest<'_>) -> Substitution {
    let scan_needle = request
        .scanned
        .map(|(name, _)| format!("{}{}=", request.prefix, name));
    let static_needles: Vec<(String, String)> = request
        .statics
        .iter()
        .map(|(name, _)| (name.clone(), format!("{}{}=", request.prefix, name)))
        .collect();

    let mut pending: Vec<&str> = static_needles.iter().map(|(name, _)| name.as_str()).collect();
    let mut scan_found = request.scanned.is_none();
    let mut out = Vec::with_capacity(lines.len());

    for line in lines {
        let packed: String = line.chars().filter(|c| !c.is_whitespace()).collect();
        let mut emitted: Option<String> = None;

        if let (Some((name, value)), Some(needle)) = (request.scanned, scan_needle.as_ref())
            && packed.contains(needle.as_str())
        {
            scan_found = true;
            emitted = Some(format!("{}{}={}", request.prefix, name, value.render()));
        }

        for (name, needle) in &static_needles {
            if !pending.iter().any(|p| *p == name.as_str()) {
                continue;
            }
            if packed.contains(needle.as_str()) {
                pending.retain(|p| *p != name.as_str());
                let value = &request.statics[name.as_str()];
                emitted = Some(format!("{}{}={}", request.prefix, name, value.render()));
                break;
            }
        }

        out.push(emitted.unwrap_or_else(|| line.clone()));
    }

    let mut missing: Vec<String> = pending.iter().map(|name| (*name).to_string()).collect();
    if !scan_found
        && let Some((name, _)) = request.scanned
    {
        missing.push(name.to_string());
    }

    Substitution { lines: out, missing }
}

/// File name for one generated variant.
///
/// No scan: the original basename. With a scan: `{stem}__{name}={value}`
/// with the original extension re-attached.
pub fn variant_file_name(script_basename: &str, scanned: Option<(&str, &ParamValue)>) -> String {
    let Some((name, value)) = scanned else {
        return script_basename.to_string();
    };
    let suffix = format!("__{name}={}", value.render());
    match script_basename.rsplit_once('.') {
        Some((stem, ext)) => format!("{stem}{suffix}.{ext}"),
        None => format!("{script_basename}{suffix}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &[&str]) -> Vec<String> {
        text.iter().map(|s| (*s).to_string()).collect()
    }

    fn statics(pairs: &[(&str, ParamValue)]) -> IndexMap<String, ParamValue> {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn scanned_line_is_replaced_with_the_current_value() {
        let template = lines(&["# geometry", "$depth = 10", "run()"]);
        let value = ParamValue::Number(15.0);
        let result = substitute(
            &template,
            &SubstitutionRequest {
                prefix: "$",
                scanned: Some(("depth", &value)),
                statics: &IndexMap::new(),
            },
        );
        assert_eq!(result.lines, lines(&["# geometry", "$depth=15", "run()"]));
        assert!(result.missing.is_empty());
    }

    #[test]
    fn matching_ignores_whitespace_inside_the_line() {
        let template = lines(&["$ depth   =  10"]);
        let value = ParamValue::Number(20.0);
        let result = substitute(
            &template,
            &SubstitutionRequest {
                prefix: "$",
                scanned: Some(("depth", &value)),
                statics: &IndexMap::new(),
            },
        );
        assert_eq!(result.lines, lines(&["$depth=20"]));
    }

    #[test]
    fn statics_replace_their_assignment_lines() {
        let template = lines(&["$height=0", "$width = 0"]);
        let result = substitute(
            &template,
            &SubstitutionRequest {
                prefix: "$",
                scanned: None,
                statics: &statics(&[
                    ("height", ParamValue::Number(5.0)),
                    ("width", ParamValue::Number(7.0)),
                ]),
            },
        );
        assert_eq!(result.lines, lines(&["$height=5", "$width=7"]));
        assert!(result.missing.is_empty());
    }

    #[test]
    fn static_substitutes_only_its_first_match() {
        let template = lines(&["$height=0", "$height=1"]);
        let result = substitute(
            &template,
            &SubstitutionRequest {
                prefix: "$",
                scanned: None,
                statics: &statics(&[("height", ParamValue::Number(5.0))]),
            },
        );
        assert_eq!(result.lines, lines(&["$height=5", "$height=1"]));
    }

    #[test]
    fn unmatched_parameters_are_reported_in_order() {
        let template = lines(&["$width=0"]);
        let value = ParamValue::Number(1.0);
        let result = substitute(
            &template,
            &SubstitutionRequest {
                prefix: "$",
                scanned: Some(("depth", &value)),
                statics: &statics(&[
                    ("height", ParamValue::Number(5.0)),
                    ("width", ParamValue::Number(7.0)),
                ]),
            },
        );
        assert_eq!(result.missing, vec!["height".to_string(), "depth".to_string()]);
    }

    #[test]
    fn text_values_substitute_verbatim() {
        let template = lines(&["$mode=slow"]);
        let result = substitute(
            &template,
            &SubstitutionRequest {
                prefix: "$",
                scanned: None,
                statics: &statics(&[("mode", ParamValue::Text("fast".to_string()))]),
            },
        );
        assert_eq!(result.lines, lines(&["$mode=fast"]));
    }

    #[test]
    fn substituted_value_round_trips_through_the_generated_line() {
        let template = lines(&["$depth = 0"]);
        let value = ParamValue::Number(0.1 + 0.2);
        let result = substitute(
            &template,
            &SubstitutionRequest {
                prefix: "$",
                scanned: Some(("depth", &value)),
                statics: &IndexMap::new(),
            },
        );
        let assignment = &result.lines[0];
        let written = assignment
            .split_once('=')
            .expect("assignment")
            .1
            .parse::<f64>()
            .expect("numeric");
        assert!((written - 0.3).abs() < 1e-6);
    }

    #[test]
    fn variant_file_name_inserts_suffix_before_the_extension() {
        let value = ParamValue::Number(15.0);
        assert_eq!(
            variant_file_name("sim.in", Some(("depth", &value))),
            "sim__depth=15.in"
        );
        let text = ParamValue::Text("fine".to_string());
        assert_eq!(
            variant_file_name("sim", Some(("grid", &text))),
            "sim__grid=fine"
        );
        assert_eq!(variant_file_name("sim.in", None), "sim.in");
    }
}
