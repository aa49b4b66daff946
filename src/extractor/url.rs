//! URL part extraction.

use super::ExtractError;
use serde_json::Value;
use ::url::{form_urlencoded, Url};

/// Reads a part of `url` selected by `path`.
///
/// The first path segment picks the part: `host` (with port), `protocol`
/// (with the trailing colon), `path`, `query` or `hash`. `query` and `hash`
/// accept a parameter name as second segment. Without a path the whole URL
/// is returned.
///
/// An unknown first segment is an error; a URL that cannot be parsed or a
/// missing part is `None`.
///
/// # Examples
///
/// ```
/// use request_actions::extractor::url::get_url_value;
/// use serde_json::json;
///
/// let url = "https://api.com:8443/v1/items?page=2#top";
/// assert_eq!(get_url_value(url, Some("host")).unwrap(), Some(json!("api.com:8443")));
/// assert_eq!(get_url_value(url, Some("query.page")).unwrap(), Some(json!("2")));
/// assert!(get_url_value(url, Some("fragment")).is_err());
/// ```
pub fn get_url_value(url: &str, path: Option<&str>) -> Result<Option<Value>, ExtractError> {
    let Some(path) = path.filter(|p| !p.is_empty()) else {
        return Ok(Some(Value::String(url.to_string())));
    };
    let (part, param) = match path.split_once('.') {
        Some((part, param)) => (part, Some(param)),
        None => (path, None),
    };
    if !matches!(part, "host" | "protocol" | "path" | "query" | "hash") {
        return Err(ExtractError::UnknownUrlPath(path.to_string()));
    }

    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            log::debug!("Unable to parse url {}: {}", url, e);
            return Ok(None);
        }
    };

    let value = match part {
        "host" => parsed.host_str().map(|host| match parsed.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        }),
        "protocol" => Some(format!("{}:", parsed.scheme())),
        "path" => Some(parsed.path().to_string()),
        "query" => parsed
            .query()
            .and_then(|query| select_param(query, param)),
        _ => parsed
            .fragment()
            .and_then(|fragment| select_param(fragment, param)),
    };
    Ok(value.map(Value::String))
}

fn select_param(encoded: &str, param: Option<&str>) -> Option<String> {
    match param {
        None => Some(encoded.to_string()),
        Some(name) => form_urlencoded::parse(encoded.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned()),
    }
}
