//! Error types for data extraction.
//!
//! Missing or malformed data is not an error: extractors return `None` for
//! it. Only configuration mistakes that should surface early are reported.

use thiserror::Error;

/// Errors raised while reading a value out of a request or response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    /// The first segment of a URL path is not a known URL part.
    #[error("Unknown url path: {0}")]
    UnknownUrlPath(String),
}
