//! Reading values out of requests and responses.
//!
//! [`RequestDataExtractor`] is the entry point used by conditions and actions.
//! It selects the request or response side of an exchange and delegates to the
//! URL, header, JSON or XML readers.

pub mod content_type;
pub mod error;
pub mod iterable;
pub mod json;
pub mod source;
pub mod url;
pub mod xml;

pub use content_type::ContentType;
pub use error::ExtractError;
pub use iterable::IterableDescriptor;
pub use source::{DataSourceConfiguration, DataSourceKind, IteratorConfiguration};

use crate::models::headers::get_header;
use crate::models::{ActionType, EditorRequest, Response, TransportRequest};
use serde_json::Value;

/// The records of one exchange available to conditions and actions.
///
/// Before a request is sent only `request` is set.
#[derive(Debug, Clone, Default)]
pub struct RequestData {
    pub request: EditorRequest,
    pub executed: Option<TransportRequest>,
    pub response: Option<Response>,
}

impl RequestData {
    /// Data for the request phase.
    pub fn for_request(request: EditorRequest) -> Self {
        Self {
            request,
            executed: None,
            response: None,
        }
    }

    /// Data for the response phase.
    pub fn for_response(
        request: EditorRequest,
        executed: TransportRequest,
        response: Response,
    ) -> Self {
        Self {
            request,
            executed: Some(executed),
            response: Some(response),
        }
    }

    /// The URL the exchange was made against, preferring the transport URL.
    pub fn effective_url(&self) -> &str {
        self.executed
            .as_ref()
            .map_or(self.request.url.as_str(), |executed| executed.url.as_str())
    }
}

/// Reads configured values from a [`RequestData`].
///
/// # Examples
///
/// ```
/// use request_actions::extractor::{
///     DataSourceConfiguration, DataSourceKind, RequestData, RequestDataExtractor,
/// };
/// use request_actions::models::{ActionType, EditorRequest};
/// use serde_json::json;
///
/// let request = EditorRequest::new("GET", "https://api.com/items?page=3");
/// let data = RequestData::for_request(request);
/// let config = DataSourceConfiguration::new(ActionType::Request, DataSourceKind::Url)
///     .with_path("query.page");
///
/// let value = RequestDataExtractor::new(&data).extract(&config).unwrap();
/// assert_eq!(value, Some(json!("3")));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequestDataExtractor<'a> {
    data: &'a RequestData,
}

impl<'a> RequestDataExtractor<'a> {
    pub fn new(data: &'a RequestData) -> Self {
        Self { data }
    }

    /// Reads the value described by `config`.
    ///
    /// Missing data is `Ok(None)`. The only error is an unknown URL part.
    pub fn extract(&self, config: &DataSourceConfiguration) -> Result<Option<Value>, ExtractError> {
        if config.source == DataSourceKind::Value {
            return Ok(config.value.clone());
        }
        match config.kind {
            ActionType::Request => self.extract_request(config),
            ActionType::Response => self.extract_response(config),
        }
    }

    fn extract_request(
        &self,
        config: &DataSourceConfiguration,
    ) -> Result<Option<Value>, ExtractError> {
        let request = &self.data.request;
        let path = config.path();
        match config.source {
            DataSourceKind::Url => url::get_url_value(&request.url, path),
            DataSourceKind::Headers => Ok(read_header(&request.headers, path)),
            DataSourceKind::Method => Ok(Some(Value::String(request.method.clone()))),
            DataSourceKind::Body => Ok(read_body(
                &request.headers,
                request.payload.as_ref(),
                config,
            )),
            DataSourceKind::Status | DataSourceKind::Value => Ok(None),
        }
    }

    fn extract_response(
        &self,
        config: &DataSourceConfiguration,
    ) -> Result<Option<Value>, ExtractError> {
        let path = config.path();
        match config.source {
            DataSourceKind::Url => match &self.data.executed {
                Some(executed) => url::get_url_value(&executed.url, path),
                None => Ok(None),
            },
            DataSourceKind::Method => Ok(self
                .data
                .executed
                .as_ref()
                .map(|executed| Value::String(executed.method.clone()))),
            DataSourceKind::Headers => Ok(self
                .data
                .response
                .as_ref()
                .and_then(|response| read_header(&response.headers, path))),
            DataSourceKind::Status => Ok(self
                .data
                .response
                .as_ref()
                .map(|response| Value::from(response.status))),
            DataSourceKind::Body => Ok(self.data.response.as_ref().and_then(|response| {
                read_body(&response.headers, response.payload.as_ref(), config)
            })),
            DataSourceKind::Value => Ok(None),
        }
    }
}

fn read_header(headers: &str, path: Option<&str>) -> Option<Value> {
    match path {
        Some(name) => get_header(headers, name).map(Value::String),
        None => Some(Value::String(headers.to_string())),
    }
}

fn read_body(
    headers: &str,
    payload: Option<&Value>,
    config: &DataSourceConfiguration,
) -> Option<Value> {
    let payload = payload?;
    let content_type = ContentType::detect(get_header(headers, "content-type").as_deref());
    match content_type {
        ContentType::Json => {
            let iterator = config.active_iterator().and_then(IterableDescriptor::from_config);
            json::get_json_value(payload, config.path(), iterator.as_ref())
        }
        ContentType::Xml | ContentType::Html => match payload {
            Value::String(body) => xml::get_xml_value(body, config.path()),
            _ => None,
        },
        ContentType::Other => {
            log::trace!("Unsupported body content type for extraction");
            None
        }
    }
}
