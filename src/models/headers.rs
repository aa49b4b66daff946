//! Parsing of raw header blocks.
//!
//! Requests and responses carry their headers as the text the user edits:
//! one `Name: Value` pair per line.

/// Parses a header block into `(name, value)` pairs in source order.
///
/// Blank lines and lines without a colon or without a name are skipped.
///
/// # Examples
///
/// ```
/// use request_actions::models::headers::parse_headers;
///
/// let headers = parse_headers("Content-Type: application/json\nX-Id: 1");
/// assert_eq!(headers[1], ("X-Id".to_string(), "1".to_string()));
/// ```
pub fn parse_headers(block: &str) -> Vec<(String, String)> {
    block
        .lines()
        .filter_map(|line| {
            let trimmed = line.trim();
            let (name, value) = trimmed.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Case-insensitive lookup of the first header named `name`.
pub fn get_header(block: &str, name: &str) -> Option<String> {
    parse_headers(block)
        .into_iter()
        .find(|(header, _)| header.eq_ignore_ascii_case(name))
        .map(|(_, value)| value)
}
