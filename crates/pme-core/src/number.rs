//! Lenient numeric coercion for untrusted JSON fields, and output rounding.

use serde_json::Value;

/// Coerce a JSON value to a finite number.
///
/// Numbers pass through, strings are trimmed and parsed (an empty string is
/// zero), booleans become 1 or 0. Null, arrays, objects and anything that
/// does not parse to a finite number yield `None`.
#[must_use]
pub fn coerce_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                s.parse::<f64>().ok()?
            }
        }
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null | Value::Array(_) | Value::Object(_) => return None,
    };
    n.is_finite().then_some(n)
}

/// Coerce an optional field, flooring at zero. Absent or invalid is zero.
#[must_use]
pub fn non_negative(value: Option<&Value>) -> f64 {
    value.and_then(coerce_number).map_or(0.0, |n| n.max(0.0))
}

/// JSON truthiness: `false`, `0`, `""` and `null` are falsy.
#[must_use]
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
    }
}

/// Round half-up to `decimals` places, nudged by epsilon so that values
/// like `1.005` land on the expected side.
#[must_use]
pub fn round_to(x: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    ((x + f64::EPSILON) * factor + 0.5).floor() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn coerces_numbers_and_numeric_strings() {
        assert_eq!(coerce_number(&json!(12.5)), Some(12.5));
        assert_eq!(coerce_number(&json!(" 42 ")), Some(42.0));
        assert_eq!(coerce_number(&json!("")), Some(0.0));
        assert_eq!(coerce_number(&json!(true)), Some(1.0));
        assert_eq!(coerce_number(&json!("abc")), None);
        assert_eq!(coerce_number(&json!("inf")), None);
        assert_eq!(coerce_number(&json!(null)), None);
        assert_eq!(coerce_number(&json!([1])), None);
    }

    #[test]
    fn non_negative_floors_and_defaults() {
        assert_eq!(non_negative(Some(&json!(-300))), 0.0);
        assert_eq!(non_negative(Some(&json!("x"))), 0.0);
        assert_eq!(non_negative(None), 0.0);
        assert_eq!(non_negative(Some(&json!(7))), 7.0);
    }

    #[test]
    fn truthiness() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(is_truthy(Some(&json!("yes"))));
        assert!(is_truthy(Some(&json!({}))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(None));
    }

    #[test]
    fn rounding_is_half_up() {
        assert_eq!(round_to(1.005, 2), 1.01);
        assert_eq!(round_to(7894.736_842, 2), 7894.74);
        assert_eq!(round_to(0.38, 4), 0.38);
        assert_eq!(round_to(2.25, 1), 2.3);
        assert_eq!(round_to(-2.5, 0), -2.0);
    }
}
