//! Percentage-like values that callers send either as a fraction (`0.3`)
//! or as a percentage (`30`).

use serde::Serialize;
use serde_json::Value;

/// Largest fraction a [`PercentLike`] may hold. Keeps `1 - x` strictly positive.
pub const MAX_FRACTION: f64 = 0.999_999;

/// A ratio normalized to a fraction in `[0, MAX_FRACTION]`.
///
/// Values in `(1, 100]` are read as percentages and divided by 100, values
/// in `[0, 1]` are already fractions, and everything else is clamped.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PercentLike(f64);

impl PercentLike {
    /// Normalize a raw number. `NaN` is rejected.
    #[must_use]
    pub fn from_number(n: f64) -> Option<Self> {
        if n.is_nan() {
            return None;
        }
        let n = if n > 1.0 && n <= 100.0 { n / 100.0 } else { n };
        Some(Self(n.clamp(0.0, MAX_FRACTION)))
    }

    /// Parse an untrusted JSON field.
    ///
    /// Accepts numbers and numeric strings, with an optional trailing `%`.
    /// Null, booleans, blank strings and non-numeric values yield `None`.
    #[must_use]
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(n) => n.as_f64().and_then(Self::from_number),
            Value::String(s) => {
                let s = s.trim();
                let s = s.strip_suffix('%').unwrap_or(s).trim_end();
                if s.is_empty() {
                    return None;
                }
                s.parse::<f64>()
                    .ok()
                    .filter(|n| n.is_finite())
                    .and_then(Self::from_number)
            }
            _ => None,
        }
    }

    /// The normalized fraction
    #[inline]
    #[must_use]
    pub fn fraction(self) -> f64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> Option<f64> {
        PercentLike::from_value(&v).map(PercentLike::fraction)
    }

    #[test]
    fn fraction_and_percentage_forms_agree() {
        assert_eq!(parse(json!(50)), Some(0.5));
        assert_eq!(parse(json!(0.5)), Some(0.5));
        assert_eq!(parse(json!("50")), Some(0.5));
        assert_eq!(parse(json!("50%")), Some(0.5));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        assert_eq!(parse(json!(150)), Some(MAX_FRACTION));
        assert_eq!(parse(json!(1)), Some(1.0_f64.min(MAX_FRACTION)));
        assert_eq!(parse(json!(-4)), Some(0.0));
        assert_eq!(parse(json!(100)), Some(1.0_f64.min(MAX_FRACTION)));
    }

    #[test]
    fn non_numeric_values_are_absent() {
        assert_eq!(parse(json!(null)), None);
        assert_eq!(parse(json!(true)), None);
        assert_eq!(parse(json!("")), None);
        assert_eq!(parse(json!("  ")), None);
        assert_eq!(parse(json!("abc")), None);
        assert_eq!(parse(json!({"v": 1})), None);
        assert_eq!(PercentLike::from_number(f64::NAN), None);
    }
}
