//! Operator table for loosely-typed comparisons.

use super::Operator;
use crate::coerce::{is_truthy, strict_equals, string_to_number, to_js_string, to_number};
use regex::RegexBuilder;
use serde_json::Value;

/// Checks `value` against `condition` with `operator`.
///
/// Never fails: values that cannot be compared, invalid regular expressions
/// and unknown operators all yield `false`.
///
/// # Examples
///
/// ```
/// use request_actions::conditions::{check_condition, Operator};
/// use serde_json::json;
///
/// assert!(check_condition(&json!("abc"), &Operator::Contains, &json!("b")));
/// assert!(!check_condition(&json!(1), &Operator::GreaterThan, &json!(2)));
/// assert!(check_condition(&json!(200), &Operator::Equal, &json!("200")));
/// ```
pub fn check_condition(value: &Value, operator: &Operator, condition: &Value) -> bool {
    match operator {
        Operator::Equal => is_equal(value, condition),
        Operator::NotEqual => !is_equal(value, condition),
        Operator::GreaterThan => compare(value, condition, |a, b| a > b),
        Operator::GreaterThanEqual => compare(value, condition, |a, b| a >= b),
        Operator::LessThan => compare(value, condition, |a, b| a < b),
        Operator::LessThanEqual => compare(value, condition, |a, b| a <= b),
        Operator::Contains => contains(value, condition),
        Operator::Regex => matches_regex(value, condition),
        Operator::Unknown(name) => {
            log::debug!("Unknown condition operator {}", name);
            false
        }
    }
}

fn is_equal(value: &Value, condition: &Value) -> bool {
    if strict_equals(value, condition) {
        return true;
    }
    let comparator = to_js_string(condition);
    let numeric = string_to_number(&comparator);
    if numeric.is_finite() {
        return to_number(value) == numeric;
    }
    to_js_string(value) == comparator
}

fn compare<F>(value: &Value, condition: &Value, op: F) -> bool
where
    F: Fn(f64, f64) -> bool,
{
    let a = to_number(value);
    let b = to_number(condition);
    if a.is_nan() || b.is_nan() {
        return false;
    }
    op(a, b)
}

fn contains(value: &Value, condition: &Value) -> bool {
    if !is_truthy(value) {
        return false;
    }
    match value {
        Value::String(s) => s.contains(&to_js_string(condition)),
        Value::Array(items) => {
            if !matches!(condition, Value::Number(_)) {
                let numeric = to_number(condition);
                if !numeric.is_nan()
                    && items
                        .iter()
                        .any(|item| matches!(item, Value::Number(n) if n.as_f64() == Some(numeric)))
                {
                    return true;
                }
            }
            items.iter().any(|item| strict_equals(item, condition))
        }
        Value::Object(map) => map.contains_key(&to_js_string(condition)),
        _ => false,
    }
}

fn matches_regex(value: &Value, condition: &Value) -> bool {
    let pattern = to_js_string(condition);
    match RegexBuilder::new(&pattern).multi_line(true).build() {
        Ok(re) => re.is_match(&to_js_string(value)),
        Err(e) => {
            log::debug!("Invalid condition pattern {}: {}", pattern, e);
            false
        }
    }
}
