//! Loose value coercions shared by the condition evaluator, the extractors and
//! the template function library.
//!
//! Request documents are authored by users who expect the comparison rules of a
//! dynamically typed scripting environment: `"10"` equals `10`, an empty string
//! is "falsy", and so on. These helpers implement exactly that set of rules on
//! top of [`serde_json::Value`].

use serde_json::Value;

/// Formats a number the way a user expects to see it in a header or URL.
///
/// Integral values have no fractional part, non-finite values use their
/// conventional names.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    if n.fract() == 0.0 && n.abs() < 1e21 {
        return format!("{:.0}", n);
    }
    n.to_string()
}

/// Converts a string into a number using lenient numeric-literal rules.
///
/// Whitespace is trimmed, the empty string is `0`, hexadecimal (`0x`), octal
/// (`0o`) and binary (`0b`) prefixes are understood, and anything else that is
/// not a decimal literal is `NaN`.
pub fn string_to_number(input: &str) -> f64 {
    let s = input.trim();
    if s.is_empty() {
        return 0.0;
    }
    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }
    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }
    // Rust accepts "inf" and "nan" spellings that are not numeric literals here.
    let lower = s.to_ascii_lowercase();
    if lower.contains("inf") || lower.contains("nan") {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Numeric coercion of an arbitrary value.
pub fn to_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => string_to_number(s),
        Value::Array(items) => match items.as_slice() {
            [] => 0.0,
            [single] => to_number(&Value::String(to_js_string(single))),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

/// String coercion of an arbitrary value.
///
/// Arrays are joined with commas and objects collapse to `[object Object]`,
/// which is what users see when they compare against a whole object.
pub fn to_js_string(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if n.is_f64() {
                format_number(n.as_f64().unwrap_or(f64::NAN))
            } else {
                n.to_string()
            }
        }
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => to_js_string(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Whether a value counts as "set".
///
/// `null`, `false`, `0`, `NaN` and the empty string are falsy; everything else,
/// including empty arrays and objects, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0 && !f.is_nan()).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Identity-style equality: same type and same scalar value.
///
/// Arrays and objects are never strictly equal, even to a structural copy.
pub fn strict_equals(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        },
        (Value::String(x), Value::String(y)) => x == y,
        _ => false,
    }
}

/// Converts a JSON value to the string stored in a variable or cookie.
///
/// - Strings: returned as-is (without quotes)
/// - Numbers, booleans, null: converted to string
/// - Objects, arrays: serialized as JSON
pub fn json_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(_) => to_js_string(value),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}
