//! JSON body extraction.
//!
//! Paths are dotted (`data.items.0.id`). Integer segments index arrays and a
//! `*` segment selects the element chosen by an [`IterableDescriptor`].
//!
//! Two equivalent conventions exist for iterator lookups:
//!
//! - current: lookup path `items.*.id`, iterator path `name`
//! - legacy: lookup path `id`, iterator path `items.*.name`
//!
//! Legacy descriptors are rewritten into the current form before walking.

use super::iterable::{child, IterableDescriptor};
use serde_json::Value;
use std::borrow::Cow;

/// Reads the value at `path` from a JSON body.
///
/// String bodies are parsed first; a string that is not JSON yields `None`.
/// Without a path the parsed body is returned.
///
/// When a `*` segment meets an array, the first matching element is entered
/// and the rest of the path is applied to it. When it meets an object, the
/// first matching entry is returned whole and the rest of the path is not
/// applied.
///
/// # Examples
///
/// ```
/// use request_actions::conditions::Operator;
/// use request_actions::extractor::{json::get_json_value, IterableDescriptor};
/// use serde_json::json;
///
/// let body = json!(r#"{"items":[{"id":"1","name":"n1"},{"id":"2","name":"n2"}]}"#);
/// let iterator = IterableDescriptor::new("name", Operator::Equal, json!("n2")).unwrap();
///
/// let value = get_json_value(&body, Some("items.*.id"), Some(&iterator));
/// assert_eq!(value, Some(json!("2")));
/// ```
pub fn get_json_value(
    body: &Value,
    path: Option<&str>,
    iterator: Option<&IterableDescriptor>,
) -> Option<Value> {
    let data = parse_body(body)?;
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return Some(data.into_owned());
    };

    let mut segments: Vec<String> = path.split('.').map(str::to_string).collect();
    let descriptor = match iterator {
        Some(descriptor) => match split_legacy(descriptor) {
            Some((prefix, normalized)) => {
                segments = prefix.into_iter().chain(segments).collect();
                Some(Cow::Owned(normalized))
            }
            None => Some(Cow::Borrowed(descriptor)),
        },
        None => None,
    };

    walk(&data, &segments, descriptor.as_deref())
}

fn parse_body(body: &Value) -> Option<Cow<'_, Value>> {
    match body {
        Value::String(text) => match serde_json::from_str(text) {
            Ok(parsed) => Some(Cow::Owned(parsed)),
            Err(e) => {
                log::trace!("Body is not JSON: {}", e);
                None
            }
        },
        Value::Null => None,
        other => Some(Cow::Borrowed(other)),
    }
}

/// Splits a legacy `items.*.name` descriptor into the lookup prefix
/// `items.*` and a descriptor reading `name`.
fn split_legacy(descriptor: &IterableDescriptor) -> Option<(Vec<String>, IterableDescriptor)> {
    let star = descriptor.path.iter().position(|segment| segment == "*")?;
    let normalized = IterableDescriptor {
        path: descriptor.path[star + 1..].to_vec(),
        operator: descriptor.operator.clone(),
        condition: descriptor.condition.clone(),
    };
    Some((descriptor.path[..=star].to_vec(), normalized))
}

fn walk(
    data: &Value,
    segments: &[String],
    descriptor: Option<&IterableDescriptor>,
) -> Option<Value> {
    let mut current = data;
    for segment in segments {
        if segment != "*" {
            current = child(current, segment)?;
            continue;
        }
        let descriptor = descriptor?;
        match current {
            Value::Array(items) => {
                current = items.iter().find(|item| descriptor.matches(item))?;
            }
            Value::Object(map) => {
                return map.values().find(|entry| descriptor.matches(entry)).cloned();
            }
            _ => return None,
        }
    }
    Some(current.clone())
}
