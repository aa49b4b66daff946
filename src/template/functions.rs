//! Pure string functions available to templates.
//!
//! These carry no state and are safe to call from anywhere; the evaluator
//! dispatches `encodeURIComponent()`, `decodeURIComponent()`, `btoa()` and
//! `atob()` calls here.

use super::EvalError;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters left untouched by URI component encoding: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encodes a value for use as a single URI component.
///
/// # Examples
///
/// ```
/// use request_actions::template::functions::encode_uri_component;
///
/// assert_eq!(encode_uri_component("a b&c"), "a%20b%26c");
/// ```
pub fn encode_uri_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

/// Reverses [`encode_uri_component`].
///
/// Fails when the decoded bytes are not valid UTF-8.
pub fn decode_uri_component(value: &str) -> Result<String, EvalError> {
    percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| EvalError::invalid_argument("decodeURIComponent", e.to_string()))
}

/// Base64-encodes the UTF-8 bytes of `value`.
pub fn btoa(value: &str) -> String {
    STANDARD.encode(value.as_bytes())
}

/// Decodes a base64 string into text.
///
/// Invalid base64 is an error; non-UTF-8 payloads are decoded lossily.
pub fn atob(value: &str) -> Result<String, EvalError> {
    let bytes = STANDARD
        .decode(value.trim())
        .map_err(|e| EvalError::invalid_argument("atob", e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
