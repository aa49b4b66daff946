//! Data extraction across the editor request, transport request and
//! response of one exchange.

use request_actions::conditions::Operator;
use request_actions::extractor::{
    DataSourceConfiguration, DataSourceKind, ExtractError, IteratorConfiguration, RequestData,
    RequestDataExtractor,
};
use request_actions::models::{ActionType, EditorRequest, Response, TransportRequest};
use serde_json::{json, Value};

const ITEMS: &str = r#"{"items":[{"id":"1","name":"n1"},{"id":"2","name":"n2"}]}"#;

fn exchange(content_type: &str, body: &str) -> RequestData {
    RequestData::for_response(
        EditorRequest::new("GET", "{baseUrl}/items").with_headers("Accept: */*"),
        TransportRequest::new("GET", "https://api.example.com/v1/items?page=1#top"),
        Response::new(200, "OK")
            .with_headers(format!("Content-Type: {}\nX-Total: 2", content_type))
            .with_payload(body),
    )
}

fn response_source(source: DataSourceKind, path: &str) -> DataSourceConfiguration {
    DataSourceConfiguration::new(ActionType::Response, source).with_path(path)
}

fn iterator(path: &str, operator: Operator, condition: &str) -> IteratorConfiguration {
    IteratorConfiguration {
        path: path.to_string(),
        operator: Some(operator),
        condition: Some(json!(condition)),
    }
}

fn extract(data: &RequestData, config: &DataSourceConfiguration) -> Option<Value> {
    RequestDataExtractor::new(data).extract(config).unwrap()
}

#[test]
fn test_iterator_conventions_are_equivalent() {
    let data = exchange("application/json", ITEMS);

    let current = response_source(DataSourceKind::Body, "items.*.id")
        .with_iterator(iterator("name", Operator::Equal, "n2"));
    let legacy = response_source(DataSourceKind::Body, "id")
        .with_iterator(iterator("items.*.name", Operator::Equal, "n2"));

    assert_eq!(extract(&data, &current), Some(json!("2")));
    assert_eq!(extract(&data, &legacy), Some(json!("2")));
}

#[test]
fn test_iterator_must_be_enabled() {
    let data = exchange("application/json", ITEMS);
    let mut config = response_source(DataSourceKind::Body, "items.*.id")
        .with_iterator(iterator("name", Operator::Equal, "n1"));
    assert_eq!(extract(&data, &config), Some(json!("1")));

    config.iterator_enabled = Some(false);
    assert_eq!(extract(&data, &config), None);
}

#[test]
fn test_invalid_iterator_is_inert() {
    let data = exchange("application/json", ITEMS);
    let config = response_source(DataSourceKind::Body, "items.*.id")
        .with_iterator(iterator("name", Operator::Regex, "n1"));
    assert_eq!(extract(&data, &config), None);
}

#[test]
fn test_iterator_from_document() {
    let data = exchange("application/json", ITEMS);
    let config: DataSourceConfiguration = serde_json::from_value(json!({
        "type": "response",
        "source": "body",
        "path": "items.*.name",
        "iteratorEnabled": true,
        "iterator": {"path": "id", "operator": "greater-than", "condition": "1"}
    }))
    .unwrap();
    assert_eq!(extract(&data, &config), Some(json!("n2")));
}

#[test]
fn test_url_of_each_side() {
    let data = exchange("application/json", ITEMS);

    let request_url = DataSourceConfiguration::new(ActionType::Request, DataSourceKind::Url);
    assert_eq!(extract(&data, &request_url), Some(json!("{baseUrl}/items")));

    assert_eq!(
        extract(&data, &response_source(DataSourceKind::Url, "query.page")),
        Some(json!("1"))
    );
    assert_eq!(
        extract(&data, &response_source(DataSourceKind::Url, "hash")),
        Some(json!("top"))
    );

    let origin = response_source(DataSourceKind::Url, "origin");
    let result = RequestDataExtractor::new(&data).extract(&origin);
    assert_eq!(result, Err(ExtractError::UnknownUrlPath("origin".to_string())));
}

#[test]
fn test_headers_of_each_side() {
    let data = exchange("application/json", ITEMS);
    let request_header = DataSourceConfiguration::new(ActionType::Request, DataSourceKind::Headers)
        .with_path("accept");
    assert_eq!(extract(&data, &request_header), Some(json!("*/*")));
    assert_eq!(
        extract(&data, &response_source(DataSourceKind::Headers, "x-total")),
        Some(json!("2"))
    );
    assert_eq!(
        extract(&data, &response_source(DataSourceKind::Headers, "x-missing")),
        None
    );
}

#[test]
fn test_html_body_uses_xml_reader() {
    let data = exchange("text/html", "<html><body><h1 class=\"t\">Title</h1></body></html>");
    assert_eq!(
        extract(&data, &response_source(DataSourceKind::Body, "html.body.h1")),
        Some(json!("Title"))
    );
    assert_eq!(
        extract(&data, &response_source(DataSourceKind::Body, "html.0.0.attr(class)")),
        Some(json!("t"))
    );
}

#[test]
fn test_unsupported_body_type() {
    let data = exchange("text/plain", ITEMS);
    assert_eq!(extract(&data, &response_source(DataSourceKind::Body, "items")), None);
}

#[test]
fn test_status_only_on_response_side() {
    let data = exchange("application/json", ITEMS);
    let request_status = DataSourceConfiguration::new(ActionType::Request, DataSourceKind::Status);
    assert_eq!(extract(&data, &request_status), None);
    assert_eq!(
        extract(&data, &DataSourceConfiguration::new(ActionType::Response, DataSourceKind::Status)),
        Some(json!(200))
    );
}
