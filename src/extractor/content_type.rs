//! Content type classification for body extraction.

/// Body format as announced by the Content-Type header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentType {
    /// JSON data (application/json, application/vnd.api+json, ...)
    Json,
    /// XML data (application/xml, text/xml)
    Xml,
    /// HTML content (text/html)
    Html,
    /// Anything else, including a missing header
    Other,
}

impl ContentType {
    /// Classifies a Content-Type header value, ignoring charset and other
    /// parameters.
    ///
    /// # Examples
    ///
    /// ```
    /// use request_actions::extractor::content_type::ContentType;
    ///
    /// assert_eq!(ContentType::from_header("application/json; charset=utf-8"), ContentType::Json);
    /// assert_eq!(ContentType::from_header("text/plain"), ContentType::Other);
    /// ```
    pub fn from_header(value: &str) -> Self {
        let lower = value.to_lowercase();
        let mime_type = lower.split(';').next().unwrap_or(&lower).trim();

        if mime_type.contains("json") {
            ContentType::Json
        } else if mime_type.contains("xml") {
            ContentType::Xml
        } else if mime_type.contains("html") {
            ContentType::Html
        } else {
            ContentType::Other
        }
    }

    /// Classifies an optional header value.
    pub fn detect(header: Option<&str>) -> Self {
        header.map_or(ContentType::Other, Self::from_header)
    }

    /// Whether the body is read with the XML extractor.
    pub fn is_markup(&self) -> bool {
        matches!(self, ContentType::Xml | ContentType::Html)
    }
}
