//! XML body extraction.
//!
//! Path segments select element children by local name. An integer segment
//! selects the N-th element child (0-based) and `attr(name)` reads an
//! attribute of the current element. The value at the end of the path is the
//! trimmed text content of the selected element.

use once_cell::sync::Lazy;
use regex::Regex;
use roxmltree::{Document, Node};
use serde_json::Value;

static ATTR_SEGMENT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^attr\((.+)\)$").expect("Failed to compile attribute segment regex"));

/// Reads the value at `path` from an XML document.
///
/// Returns `None` when the document does not parse or the path does not
/// exist. Without a path the body is returned as is.
///
/// # Examples
///
/// ```
/// use request_actions::extractor::xml::get_xml_value;
/// use serde_json::json;
///
/// let body = r#"<feed><entry id="a"><title> First </title></entry></feed>"#;
/// assert_eq!(get_xml_value(body, Some("feed.entry.title")), Some(json!("First")));
/// assert_eq!(get_xml_value(body, Some("feed.entry.attr(id)")), Some(json!("a")));
/// ```
pub fn get_xml_value(body: &str, path: Option<&str>) -> Option<Value> {
    let document = match Document::parse(body) {
        Ok(document) => document,
        Err(e) => {
            log::trace!("Body is not XML: {}", e);
            return None;
        }
    };
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return Some(Value::String(body.to_string()));
    };

    let mut current = document.root();
    for segment in path.split('.') {
        if let Some(captures) = ATTR_SEGMENT_REGEX.captures(segment) {
            let name = captures.get(1)?.as_str();
            return current
                .attribute(name)
                .map(|value| Value::String(value.to_string()));
        }
        current = match segment.parse::<usize>() {
            Ok(index) => current.children().filter(Node::is_element).nth(index)?,
            Err(_) => current
                .children()
                .find(|node| node.is_element() && node.tag_name().name() == segment)?,
        };
    }
    Some(Value::String(text_content(current)))
}

fn text_content(node: Node) -> String {
    node.descendants()
        .filter(Node::is_text)
        .filter_map(|text| text.text())
        .collect::<String>()
        .trim()
        .to_string()
}
