//! Command-line parameter value grammar.
//!
//! A value string is `segment(',' segment)*`, where a segment is either a
//! bare number, a bare string, or an inclusive range `from..to..step`.
//! Segments concatenate left to right; the resulting order is the order
//! simulations run in.

use std::fmt;

use anyhow::{Context, Result, bail};

/// A single parsed parameter value.
///
/// Numeric-vs-text disambiguation happens once, at parse time; downstream
/// code matches on the variant instead of re-attempting numeric parses.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    Number(f64),
    Text(String),
}

impl ParamValue {
    /// Render for assignment lines, file names, and batch directory names.
    ///
    /// Numbers use `%.6g`-style formatting so generated artifacts match the
    /// precision users see in the batch name; text is verbatim.
    pub fn render(&self) -> String {
        match self {
            ParamValue::Number(n) => format_g6(*n),
            ParamValue::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Parse one command-line value string into an ordered value sequence.
///
/// - `10` → one number
/// - `fine` → one text value
/// - `10..25..5` → `10, 15, 20, 25` (closed interval; the endpoint is kept
///   when it lands within half a step, absorbing float rounding)
/// - `1..3..1,10,rough` → concatenation of all of the above
///
/// Malformed segments (two or four-plus `..` pieces, non-numeric range
/// bounds, zero step) are user errors, reported rather than crashed on.
pub fn parse_values(raw: &str) -> Result<Vec<ParamValue>> {
    let mut values = Vec::new();
    for segment in raw.split(',') {
        let pieces: Vec<&str> = segment.split("..").collect();
        match pieces.as_slice() {
            [single] => {
                let trimmed = single.trim();
                match trimmed.parse::<f64>() {
                    Ok(number) => values.push(ParamValue::Number(number)),
                    Err(_) => values.push(ParamValue::Text(trimmed.to_string())),
                }
            }
            [from, to, step] => {
                let from = parse_bound(from, segment)?;
                let to = parse_bound(to, segment)?;
                let step = parse_bound(step, segment)?;
                extend_with_range(&mut values, from, to, step, segment)?;
            }
            _ => bail!(
                "malformed segment `{}`: expected a single value or `from..to..step`",
                segment.trim()
            ),
        }
    }
    Ok(values)
}

fn parse_bound(piece: &str, segment: &str) -> Result<f64> {
    piece
        .trim()
        .parse::<f64>()
        .with_context(|| format!("range `{}`: `{}` is not a number", segment.trim(), piece.trim()))
}

fn extend_with_range(
    values: &mut Vec<ParamValue>,
    from: f64,
    to: f64,
    step: f64,
    segment: &str,
) -> Result<()> {
    if step == 0.0 || !step.is_finite() {
        bail!("range `{}`: step must be finite and non-zero", segment.trim());
    }
    // Closed interval with half-step tolerance, so `to` is included whenever
    // `step` evenly divides `to - from` despite binary rounding.
    let mut current = from;
    if step > 0.0 {
        while current <= to + step / 2.0 {
            values.push(ParamValue::Number(current));
            current += step;
        }
    } else {
        while current >= to + step / 2.0 {
            values.push(ParamValue::Number(current));
            current += step;
        }
    }
    Ok(())
}

/// Format a float like C's `%.6g` (and Python's `{:.6g}`).
///
/// Six significant digits, trailing zeros stripped, scientific notation with
/// a signed two-digit exponent outside `1e-4..1e6`.
pub fn format_g6(value: f64) -> String {
    const PRECISION: i32 = 6;
    if value == 0.0 {
        return "0".to_string();
    }
    if !value.is_finite() {
        return value.to_string();
    }
    let exponent = value.abs().log10().floor() as i32;
    if exponent < -4 || exponent >= PRECISION {
        let formatted = format!("{:.*e}", (PRECISION - 1) as usize, value);
        let Some((mantissa, exp)) = formatted.split_once('e') else {
            return formatted;
        };
        let mantissa = trim_fraction(mantissa);
        let exp: i32 = exp.parse().unwrap_or(0);
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{mantissa}e{sign}{:02}", exp.abs())
    } else {
        let decimals = (PRECISION - 1 - exponent).max(0) as usize;
        trim_fraction(&format!("{value:.decimals$}")).to_string()
    }
}

fn trim_fraction(formatted: &str) -> &str {
    if formatted.contains('.') {
        formatted.trim_end_matches('0').trim_end_matches('.')
    } else {
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(raw: &str) -> Vec<f64> {
        parse_values(raw)
            .expect("parse")
            .into_iter()
            .map(|v| match v {
                ParamValue::Number(n) => n,
                ParamValue::Text(t) => panic!("expected number, got `{t}`"),
            })
            .collect()
    }

    #[test]
    fn single_number_parses() {
        assert_eq!(
            parse_values("234.56").expect("parse"),
            vec![ParamValue::Number(234.56)]
        );
        assert_eq!(
            parse_values("-5e5").expect("parse"),
            vec![ParamValue::Number(-5e5)]
        );
    }

    #[test]
    fn single_text_parses_trimmed() {
        assert_eq!(
            parse_values(" coarse ").expect("parse"),
            vec![ParamValue::Text("coarse".to_string())]
        );
    }

    #[test]
    fn range_is_inclusive_with_constant_stride() {
        assert_eq!(numbers("10..25..5"), vec![10.0, 15.0, 20.0, 25.0]);
    }

    #[test]
    fn range_endpoint_survives_float_rounding() {
        let values = numbers("0.1..0.3..0.1");
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], 0.1);
        assert!((values[2] - 0.3).abs() < 0.05);
        for pair in values.windows(2) {
            assert!((pair[1] - pair[0] - 0.1).abs() < 1e-12);
        }
    }

    #[test]
    fn descending_range_with_negative_step() {
        assert_eq!(numbers("5..1..-2"), vec![5.0, 3.0, 1.0]);
    }

    #[test]
    fn comma_segments_concatenate_in_order() {
        let values = parse_values("1..3..1,10,rough").expect("parse");
        assert_eq!(
            values,
            vec![
                ParamValue::Number(1.0),
                ParamValue::Number(2.0),
                ParamValue::Number(3.0),
                ParamValue::Number(10.0),
                ParamValue::Text("rough".to_string()),
            ]
        );
    }

    #[test]
    fn two_piece_segment_is_a_reported_error() {
        let err = parse_values("10..20").expect_err("should fail");
        assert!(err.to_string().contains("10..20"));
    }

    #[test]
    fn non_numeric_range_bound_is_a_reported_error() {
        assert!(parse_values("a..b..c").is_err());
    }

    #[test]
    fn zero_step_is_a_reported_error() {
        assert!(parse_values("1..2..0").is_err());
    }

    #[test]
    fn format_g6_matches_reference_cases() {
        assert_eq!(format_g6(10.0), "10");
        assert_eq!(format_g6(234.56), "234.56");
        assert_eq!(format_g6(-5e5), "-500000");
        assert_eq!(format_g6(0.25), "0.25");
        assert_eq!(format_g6(0.0), "0");
        assert_eq!(format_g6(1e7), "1e+07");
        assert_eq!(format_g6(-2.5e-7), "-2.5e-07");
        assert_eq!(format_g6(1.0 / 3.0), "0.333333");
    }
}
