//! Template evaluation tests against an environment provider.

use super::{init_test_env, test_environment, test_evaluator};
use request_actions::template::{ContextMap, EvalError, EvaluateOptions};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

fn context(pairs: &[(&str, &str)]) -> EvaluateOptions {
    let map: ContextMap = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    EvaluateOptions::with_context(map)
}

#[tokio::test]
async fn test_evaluate_examples() {
    init_test_env();
    let evaluator = test_evaluator();
    let options = context(&[("a", "x")]);

    assert_eq!(
        evaluator.evaluate_variable("Test: ${a}", &options).await.unwrap(),
        "Test: x"
    );
    assert_eq!(evaluator.evaluate_variable("{a}", &options).await.unwrap(), "x");
}

#[tokio::test]
async fn test_environment_context_resolves_references() {
    let evaluator = test_evaluator();
    let value = evaluator
        .evaluate_variable("${baseUrl}/users", &EvaluateOptions::default())
        .await
        .unwrap();
    assert_eq!(value, "https://api.example.com/v1/users");
}

#[tokio::test]
async fn test_disabled_variables_are_not_in_context() {
    let evaluator = test_evaluator();
    let context = evaluator.build_context(None).await.unwrap();
    assert!(!context.contains_key("disabled"));

    let value = evaluator
        .evaluate_variable("{disabled}", &EvaluateOptions::default())
        .await
        .unwrap();
    assert_eq!(value, "{disabled}");
}

#[tokio::test]
async fn test_override_values() {
    let evaluator = test_evaluator();
    let overrides = HashMap::from([("host".to_string(), "localhost".to_string())]);
    let value = evaluator
        .evaluate_variable("${baseUrl}", &EvaluateOptions::with_override(overrides))
        .await
        .unwrap();
    assert_eq!(value, "https://localhost/v1");
}

#[tokio::test]
async fn test_environment_updates_are_visible() {
    let environment = test_environment();
    let evaluator = request_actions::template::TemplateEvaluator::new(std::sync::Arc::new(
        request_actions::template::ConcatEngine,
    ))
    .with_environment(environment.clone());

    environment.set_variable("tokenField", "access_token");
    let value = evaluator
        .evaluate_variable("{tokenField}", &EvaluateOptions::default())
        .await
        .unwrap();
    assert_eq!(value, "access_token");
}

#[tokio::test]
async fn test_idempotent_for_resolved_values() {
    let evaluator = test_evaluator();
    for value in ["plain text", "https://api.example.com/v1?x=1", ""] {
        assert_eq!(
            evaluator.evaluate_variable(value, &context(&[])).await.unwrap(),
            value
        );
    }
}

#[tokio::test]
async fn test_grouped_functions() {
    let evaluator = test_evaluator();
    let options = context(&[]);

    let first = evaluator.evaluate_variable("${now(1)}", &options).await.unwrap();
    let second = evaluator.evaluate_variable("${now(1)}", &options).await.unwrap();
    assert_eq!(first, second);

    let a = evaluator.evaluate_variable("random(1)", &options).await.unwrap();
    let b = evaluator.evaluate_variable("random(2)", &options).await.unwrap();
    assert_ne!(a, b);
    assert!(a.parse::<u64>().is_ok());

    let legacy = evaluator.evaluate_variable("${random:1}", &options).await.unwrap();
    assert_eq!(legacy, a);

    evaluator.clear_cache();
    assert!(evaluator.cache().is_empty());
}

#[tokio::test]
async fn test_function_library() {
    let evaluator = test_evaluator();
    let options = context(&[]);

    let value = evaluator
        .evaluate_variable("encodeURIComponent(a b&c)", &options)
        .await
        .unwrap();
    assert_eq!(value, "a%20b%26c");

    let value = evaluator.evaluate_variable("btoa(user:pass)", &options).await.unwrap();
    assert_eq!(value, "dXNlcjpwYXNz");

    let value = evaluator.evaluate_variable("Math.max(1, 7, 3)", &options).await.unwrap();
    assert_eq!(value, "7");
}

#[tokio::test]
async fn test_unsupported_function() {
    let evaluator = test_evaluator();
    let result = evaluator
        .evaluate_variable("${doSomething(1)}", &context(&[]))
        .await;
    assert!(matches!(result, Err(EvalError::UnsupportedFunction(name)) if name == "doSomething"));
}

#[tokio::test]
async fn test_evaluate_variables_shallow() {
    let evaluator = test_evaluator();
    let mut object: Map<String, Value> = serde_json::from_value(json!({
        "url": "${baseUrl}",
        "empty": "",
        "count": 3,
        "nested": {"url": "${baseUrl}"}
    }))
    .unwrap();

    evaluator
        .evaluate_variables(&mut object, &EvaluateOptions::default())
        .await
        .unwrap();

    assert_eq!(object["url"], "https://api.example.com/v1");
    assert_eq!(object["empty"], "");
    assert_eq!(object["count"], 3);
    assert_eq!(object["nested"]["url"], "${baseUrl}");
}
