//! Built-in functions callable from templates.
//!
//! Supported calls:
//! - `now()` / `now(group)` - current time in epoch milliseconds
//! - `random()` / `random(group)` - random non-negative integer below 2^53-1
//! - `encodeURIComponent(v)`, `decodeURIComponent(v)`, `btoa(v)`, `atob(v)`
//! - `Math.<fn>(args...)` - numeric functions (`abs`, `floor`, `max`, `pow`, ...)
//! - `String.<fn>(subject, args...)` - string methods applied to the first argument
//!
//! Arguments are passed as the raw, trimmed text between the parentheses split
//! on commas. Grouped `now` and `random` results are cached in the evaluator's
//! [`FunctionCache`] and replayed for the same group.

use super::cache::FunctionCache;
use super::functions;
use super::EvalError;
use crate::coerce::{format_number, string_to_number};
use chrono::Utc;
use rand::Rng;

/// Exclusive upper bound of `random()` results (2^53 - 1).
const MAX_SAFE_INTEGER: u64 = (1 << 53) - 1;

/// Longest string, in bytes, that `String.repeat`, `String.padStart` and
/// `String.padEnd` may produce.
pub(crate) const MAX_STRING_LENGTH: usize = 1 << 29;

/// Evaluates a single function call and returns its textual result.
pub(crate) fn call_function(
    name: &str,
    args: &[String],
    cache: &FunctionCache,
) -> Result<String, EvalError> {
    if let Some((namespace, function)) = name.split_once('.') {
        return match namespace {
            "Math" => call_math(function, args)
                .ok_or_else(|| EvalError::UnsupportedFunction(name.to_string())),
            "String" => call_string(name, function, args)?
                .ok_or_else(|| EvalError::UnsupportedFunction(name.to_string())),
            _ => Err(EvalError::UnsupportedFunction(name.to_string())),
        };
    }

    match name {
        "now" => Ok(grouped(cache, "now", args, || {
            Utc::now().timestamp_millis().to_string()
        })),
        "random" => Ok(grouped(cache, "random", args, || {
            rand::thread_rng().gen_range(0..MAX_SAFE_INTEGER).to_string()
        })),
        "encodeURIComponent" => Ok(functions::encode_uri_component(first(args))),
        "decodeURIComponent" => functions::decode_uri_component(first(args)),
        "btoa" => Ok(functions::btoa(first(args))),
        "atob" => functions::atob(first(args)),
        _ => Err(EvalError::UnsupportedFunction(name.to_string())),
    }
}

/// Runs `compute` for ungrouped calls, or replays the cached group value.
fn grouped<F>(cache: &FunctionCache, function: &str, args: &[String], compute: F) -> String
where
    F: FnOnce() -> String,
{
    match args.first().filter(|group| !group.is_empty()) {
        Some(group) => cache.get_or_insert_with(function, group, compute),
        None => compute(),
    }
}

fn first(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("")
}

fn number_arg(args: &[String], index: usize) -> f64 {
    args.get(index)
        .map(|arg| string_to_number(arg))
        .unwrap_or(f64::NAN)
}

fn call_math(function: &str, args: &[String]) -> Option<String> {
    let x = number_arg(args, 0);
    let y = number_arg(args, 1);
    let result = match function {
        "abs" => x.abs(),
        "ceil" => x.ceil(),
        "floor" => x.floor(),
        // Half-way values round towards positive infinity.
        "round" => (x + 0.5).floor(),
        "trunc" => x.trunc(),
        "sign" => {
            if x.is_nan() || x == 0.0 {
                x
            } else {
                x.signum()
            }
        }
        "sqrt" => x.sqrt(),
        "cbrt" => x.cbrt(),
        "exp" => x.exp(),
        "expm1" => x.exp_m1(),
        "log" => x.ln(),
        "log1p" => x.ln_1p(),
        "log2" => x.log2(),
        "log10" => x.log10(),
        "sin" => x.sin(),
        "cos" => x.cos(),
        "tan" => x.tan(),
        "asin" => x.asin(),
        "acos" => x.acos(),
        "atan" => x.atan(),
        "sinh" => x.sinh(),
        "cosh" => x.cosh(),
        "tanh" => x.tanh(),
        "atan2" => x.atan2(y),
        "pow" => x.powf(y),
        "hypot" => args
            .iter()
            .map(|arg| string_to_number(arg))
            .fold(0.0_f64, |acc, v| acc.hypot(v)),
        "max" => args
            .iter()
            .map(|arg| string_to_number(arg))
            .fold(f64::NEG_INFINITY, |acc, v| {
                if acc.is_nan() || v.is_nan() {
                    f64::NAN
                } else {
                    acc.max(v)
                }
            }),
        "min" => args
            .iter()
            .map(|arg| string_to_number(arg))
            .fold(f64::INFINITY, |acc, v| {
                if acc.is_nan() || v.is_nan() {
                    f64::NAN
                } else {
                    acc.min(v)
                }
            }),
        "random" => rand::thread_rng().gen::<f64>(),
        _ => return None,
    };
    Some(format_number(result))
}

/// Integer argument, truncated. A missing argument is `default`, `NaN` is `0`.
fn int_arg(args: &[String], index: usize, default: i64) -> i64 {
    match args.get(index) {
        Some(arg) => {
            let n = string_to_number(arg);
            if n.is_nan() {
                0
            } else if n.is_infinite() {
                if n > 0.0 {
                    i64::MAX
                } else {
                    i64::MIN
                }
            } else {
                n.trunc() as i64
            }
        }
        None => default,
    }
}

/// Resolves a possibly negative index against `len`, clamped to `0..=len`.
fn relative_index(index: i64, len: usize) -> usize {
    let len = len as i64;
    let resolved = if index < 0 { len + index } else { index };
    resolved.clamp(0, len) as usize
}

fn char_slice(chars: &[char], start: usize, end: usize) -> String {
    if start >= end {
        return String::new();
    }
    chars[start..end].iter().collect()
}

fn repeat(name: &str, subject: &str, count: i64) -> Result<String, EvalError> {
    let count = usize::try_from(count)
        .map_err(|_| EvalError::invalid_argument(name, "count must not be negative"))?;
    match subject.len().checked_mul(count) {
        Some(total) if total <= MAX_STRING_LENGTH => Ok(subject.repeat(count)),
        _ => Err(EvalError::invalid_argument(name, "result is too long")),
    }
}

fn pad(
    name: &str,
    subject: &str,
    target: i64,
    fill: &str,
    at_start: bool,
) -> Result<String, EvalError> {
    let current = subject.chars().count() as i64;
    if target <= current || fill.is_empty() {
        return Ok(subject.to_string());
    }
    let missing = (target - current) as usize;
    let longest_fill = fill.chars().map(char::len_utf8).max().unwrap_or(1);
    match missing.checked_mul(longest_fill) {
        Some(bytes) if bytes.saturating_add(subject.len()) <= MAX_STRING_LENGTH => {}
        _ => return Err(EvalError::invalid_argument(name, "result is too long")),
    }
    let padding: String = fill.chars().cycle().take(missing).collect();
    Ok(if at_start {
        format!("{}{}", padding, subject)
    } else {
        format!("{}{}", subject, padding)
    })
}

/// Applies a `String.*` method. `Ok(None)` means the method is unknown.
fn call_string(name: &str, function: &str, args: &[String]) -> Result<Option<String>, EvalError> {
    let subject = first(args);
    let rest = args.get(1..).unwrap_or(&[]);
    let chars: Vec<char> = subject.chars().collect();
    let len = chars.len();
    let arg = |i: usize| rest.get(i).map(String::as_str).unwrap_or("");

    let result = match function {
        "toUpperCase" | "toLocaleUpperCase" => subject.to_uppercase(),
        "toLowerCase" | "toLocaleLowerCase" => subject.to_lowercase(),
        "trim" => subject.trim().to_string(),
        "trimStart" | "trimLeft" => subject.trim_start().to_string(),
        "trimEnd" | "trimRight" => subject.trim_end().to_string(),
        "charAt" => {
            let index = int_arg(rest, 0, 0);
            if index < 0 {
                String::new()
            } else {
                chars.get(index as usize).map(|c| c.to_string()).unwrap_or_default()
            }
        }
        "charCodeAt" => {
            let index = int_arg(rest, 0, 0);
            match usize::try_from(index).ok().and_then(|i| chars.get(i)) {
                Some(c) => (*c as u32).to_string(),
                None => "NaN".to_string(),
            }
        }
        "indexOf" => {
            let from = relative_index(int_arg(rest, 1, 0).max(0), len);
            let haystack = char_slice(&chars, from, len);
            match haystack.find(arg(0)) {
                Some(byte) => (from + haystack[..byte].chars().count()).to_string(),
                None => "-1".to_string(),
            }
        }
        "lastIndexOf" => match subject.rfind(arg(0)) {
            Some(byte) => subject[..byte].chars().count().to_string(),
            None => "-1".to_string(),
        },
        "includes" => subject.contains(arg(0)).to_string(),
        "startsWith" => subject.starts_with(arg(0)).to_string(),
        "endsWith" => subject.ends_with(arg(0)).to_string(),
        "substr" => {
            let start = relative_index(int_arg(rest, 0, 0), len);
            let count = int_arg(rest, 1, len as i64).max(0) as usize;
            char_slice(&chars, start, start.saturating_add(count).min(len))
        }
        "substring" => {
            let a = int_arg(rest, 0, 0).clamp(0, len as i64) as usize;
            let b = int_arg(rest, 1, len as i64).clamp(0, len as i64) as usize;
            char_slice(&chars, a.min(b), a.max(b))
        }
        "slice" => {
            let start = relative_index(int_arg(rest, 0, 0), len);
            let end = relative_index(int_arg(rest, 1, len as i64), len);
            char_slice(&chars, start, end)
        }
        "repeat" => repeat(name, subject, int_arg(rest, 0, 0))?,
        "padStart" | "padEnd" => {
            let fill = rest.get(1).map_or(" ", String::as_str);
            pad(name, subject, int_arg(rest, 0, 0), fill, function == "padStart")?
        }
        "replace" => subject.replacen(arg(0), arg(1), 1),
        "replaceAll" => subject.replace(arg(0), arg(1)),
        "concat" => {
            let mut out = subject.to_string();
            rest.iter().for_each(|part| out.push_str(part));
            out
        }
        "split" => {
            if rest.is_empty() {
                subject.to_string()
            } else if arg(0).is_empty() {
                chars.iter().map(char::to_string).collect::<Vec<_>>().join(",")
            } else {
                subject.split(arg(0)).collect::<Vec<_>>().join(",")
            }
        }
        "toString" | "valueOf" => subject.to_string(),
        _ => return Ok(None),
    };
    Ok(Some(result))
}
