//! End-to-end tests of the actions runner.

use super::{test_environment, test_runner};
use request_actions::actions::{
    map_runnables, Action, ActionCondition, ActionEvent, ActionsRunner, ChannelSink, Cookie,
    RecordingSink,
};
use request_actions::config::{load_config, ProcessOptions};
use request_actions::models::{
    ActionType, EditorRequest, RequestActions, Response, TransportRequest,
};
use request_actions::template::{ConcatEngine, TemplateEvaluator};
use serde_json::json;
use std::sync::Arc;

fn login_request(response: Vec<ActionCondition>) -> EditorRequest {
    EditorRequest::new("POST", "${baseUrl}/login")
        .with_headers("Content-Type: application/json")
        .with_payload(r#"{"user": "demo"}"#)
        .with_actions(RequestActions {
            request: vec![],
            response,
        })
}

fn login_exchange(status: u16) -> (TransportRequest, Response) {
    let executed = TransportRequest::new("POST", "https://api.example.com/v1/login");
    let response = Response::new(status, "")
        .with_headers("Content-Type: application/json; charset=utf-8")
        .with_payload(r#"{"token": "abc123", "user": {"id": 7}}"#);
    (executed, response)
}

fn runnables(value: serde_json::Value) -> Vec<ActionCondition> {
    let serde_json::Value::Array(values) = value else {
        panic!("expected an array");
    };
    map_runnables(values)
}

#[tokio::test]
async fn test_login_flow_sets_variable_and_cookie() {
    let sink = Arc::new(RecordingSink::new());
    let runner = test_runner(sink.clone());

    let request = login_request(runnables(json!([{
        "type": "response",
        "enabled": true,
        "condition": {
            "type": "response",
            "source": "status",
            "operator": "equal",
            "predictedValue": 200
        },
        "actions": [
            {
                "type": "response",
                "name": "set-cookie",
                "enabled": true,
                "priority": 2,
                "config": {
                    "name": "session",
                    "useRequestUrl": true,
                    "source": {"type": "response", "source": "body", "path": "{tokenField}"}
                }
            },
            {
                "type": "response",
                "name": "set-variable",
                "enabled": true,
                "priority": 1,
                "config": {
                    "name": "userId",
                    "source": {"type": "response", "source": "body", "path": "user.id"}
                }
            }
        ]
    }])));
    let (executed, response) = login_exchange(200);

    runner
        .process_response_actions(Some(&request), Some(&executed), Some(&response), None)
        .await
        .unwrap();

    assert_eq!(
        sink.events(),
        vec![
            ActionEvent::VariableSet {
                name: "userId".to_string(),
                value: "7".to_string()
            },
            ActionEvent::CookieUpdate(Cookie {
                name: "session".to_string(),
                value: "abc123".to_string(),
                domain: "api.example.com".to_string(),
                path: "/v1/login".to_string(),
                session: true,
                ..Cookie::default()
            }),
        ]
    );
}

#[tokio::test]
async fn test_failed_condition_skips_runnable() {
    let sink = Arc::new(RecordingSink::new());
    let runner = test_runner(sink.clone());
    let request = login_request(runnables(json!([{
        "type": "response",
        "enabled": true,
        "condition": {
            "type": "response",
            "source": "status",
            "operator": "less-than",
            "predictedValue": 300
        },
        "actions": [{
            "type": "response",
            "name": "delete-cookie",
            "enabled": true,
            "config": {"removeAll": true, "useRequestUrl": true}
        }]
    }])));

    let (executed, response) = login_exchange(401);
    runner
        .process_response_actions(Some(&request), Some(&executed), Some(&response), None)
        .await
        .unwrap();
    assert!(sink.events().is_empty());

    let (executed, response) = login_exchange(204);
    runner
        .process_response_actions(Some(&request), Some(&executed), Some(&response), None)
        .await
        .unwrap();
    assert_eq!(
        sink.events(),
        vec![ActionEvent::CookieDelete {
            url: "https://api.example.com/v1/login".to_string(),
            name: None
        }]
    );
}

#[tokio::test]
async fn test_request_actions_only_run_for_request_phase() {
    let sink = Arc::new(RecordingSink::new());
    let runner = test_runner(sink.clone());

    let mut runnable = ActionCondition::new(
        ActionType::Request,
        ActionCondition::default_condition(ActionType::Request),
    );
    runnable.add(Action::new(ActionType::Request, "set-variable").with_config(json!({
        "name": "method",
        "source": {"type": "request", "source": "method"}
    })));
    let request =
        EditorRequest::new("PATCH", "https://api.example.com").with_actions(RequestActions {
            request: vec![runnable],
            response: vec![],
        });

    let (executed, response) = login_exchange(200);
    runner
        .process_response_actions(Some(&request), Some(&executed), Some(&response), None)
        .await
        .unwrap();
    assert!(sink.events().is_empty());

    runner.process_request_actions(Some(&request), None).await.unwrap();
    assert_eq!(
        sink.take(),
        vec![ActionEvent::VariableSet {
            name: "method".to_string(),
            value: "PATCH".to_string()
        }]
    );
}

#[tokio::test]
async fn test_fail_on_error_with_empty_body() {
    let sink = Arc::new(RecordingSink::new());
    let runner = test_runner(sink.clone());

    let build = |fail_on_error: bool| {
        let mut action = Action::new(ActionType::Request, "set-variable").with_config(json!({
            "name": "value",
            "source": {"source": "body", "path": "missing.path"}
        }));
        action.fail_on_error = fail_on_error;
        EditorRequest::new("GET", "https://api.example.com").with_actions(RequestActions {
            request: vec![ActionCondition::import_action(action)],
            response: vec![],
        })
    };

    let error = runner
        .process_request_actions(Some(&build(true)), None)
        .await
        .unwrap_err();
    assert_eq!(
        error.to_string(),
        "Cannot read value for the action \"set-variable\""
    );

    runner.process_request_actions(Some(&build(false)), None).await.unwrap();
    assert!(sink.events().is_empty());
}

#[tokio::test]
async fn test_configuration_disables_evaluation() {
    let sink = Arc::new(RecordingSink::new());
    let settings = json!({"request-actions": {"evaluateVariables": false}});
    let evaluator =
        TemplateEvaluator::new(Arc::new(ConcatEngine)).with_environment(test_environment());
    let runner = ActionsRunner::new(evaluator, sink.clone(), load_config(Some(&settings)));

    let action = Action::new(ActionType::Request, "set-variable").with_config(json!({
        "name": "{tokenField}",
        "source": {"source": "value", "value": "x"}
    }));
    let request = EditorRequest::new("GET", "https://api.example.com").with_actions(RequestActions {
        request: vec![ActionCondition::import_action(action)],
        response: vec![],
    });

    runner.process_request_actions(Some(&request), None).await.unwrap();
    runner
        .process_request_actions(
            Some(&request),
            Some(&ProcessOptions {
                evaluate_variables: Some(true),
            }),
        )
        .await
        .unwrap();

    assert_eq!(
        sink.events(),
        vec![
            ActionEvent::VariableSet {
                name: "{tokenField}".to_string(),
                value: "x".to_string()
            },
            ActionEvent::VariableSet {
                name: "token".to_string(),
                value: "x".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn test_mixed_sync_and_async_actions() {
    let (sink, mut receiver) = ChannelSink::channel();
    let runner = test_runner(Arc::new(sink));

    let mut background = Action::new(ActionType::Request, "set-variable").with_config(json!({
        "name": "background",
        "source": {"source": "value", "value": "1"}
    }));
    background.sync = false;
    background.priority = 1;
    let foreground = Action::new(ActionType::Request, "set-variable")
        .with_priority(2)
        .with_config(json!({
            "name": "foreground",
            "source": {"source": "value", "value": "2"}
        }));

    let mut runnable = ActionCondition::new(
        ActionType::Request,
        ActionCondition::default_condition(ActionType::Request),
    );
    runnable.add(background);
    runnable.add(foreground);
    let request = EditorRequest::new("GET", "https://api.example.com").with_actions(RequestActions {
        request: vec![runnable],
        response: vec![],
    });

    runner.process_request_actions(Some(&request), None).await.unwrap();

    let mut names = Vec::new();
    for _ in 0..2 {
        if let Some(ActionEvent::VariableSet { name, .. }) = receiver.recv().await {
            names.push(name);
        }
    }
    names.sort();
    assert_eq!(names, vec!["background".to_string(), "foreground".to_string()]);
}
