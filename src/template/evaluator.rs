//! Template evaluation engine.
//!
//! Resolves `${name}` (script style) and `{name}` (API style) placeholders and
//! built-in function calls in request values. Evaluation runs in this order:
//!
//! 1. Legacy `${now}`, `${now:1}`, `${random}`, `${random:1}` forms are
//!    rewritten to call syntax (`${now()}`, `${now(1)}`).
//! 2. Function calls are evaluated and replaced with their results.
//! 3. Placeholders are rewritten into an expression (`'Bearer ' + token`)
//!    and passed to the injected [`ExpressionEngine`].
//!
//! Malformed placeholders and failed expressions leave the value unchanged.
//! Only unsupported function names are reported as errors.

use super::builtins::call_function;
use super::cache::FunctionCache;
use super::engine::ExpressionEngine;
use super::tokenizer::Tokenizer;
use super::{ContextMap, EvalError};
use crate::coerce::{is_truthy, to_js_string};
use crate::environment::{EnvironmentProvider, EnvironmentSnapshot};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use std::borrow::Cow;
use std::sync::Arc;

/// Number of passes spent resolving variables that reference other variables.
///
/// Resolution is best-effort: chains deeper than these rounds can reach keep
/// their remaining placeholders as literal text.
pub const MAX_CONTEXT_ROUNDS: usize = 2;

/// `${now}`, `${now:1}`, `${random}`, `${random:1}`
static LEGACY_FUNCTION_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$\{(random|now):?([0-9]+)?\}").expect("Failed to compile legacy function regex")
});

/// `name(args)` optionally wrapped in `${...}` or `{...}`
static FUNCTION_CALL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\$?\{)?([.a-zA-Z0-9_-]+)\(([^)]*)?\)(?:\})?")
        .expect("Failed to compile function call regex")
});

static IDENTIFIER_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_]+$").expect("Failed to compile identifier regex"));

/// Options accepted by the evaluation entry points.
#[derive(Debug, Clone, Default)]
pub struct EvaluateOptions {
    /// Ready-made context. When set, no context is built.
    pub context: Option<ContextMap>,

    /// Values merged over the environment when a context is built.
    pub override_values: Option<ContextMap>,

    /// Restricts [`TemplateEvaluator::evaluate_variables`] to these keys.
    pub names: Option<Vec<String>>,
}

impl EvaluateOptions {
    /// Options that reuse an existing context.
    pub fn with_context(context: ContextMap) -> Self {
        Self {
            context: Some(context),
            ..Self::default()
        }
    }

    /// Options that build a context with `override_values` applied.
    pub fn with_override(override_values: ContextMap) -> Self {
        Self {
            override_values: Some(override_values),
            ..Self::default()
        }
    }

    /// Restricts object evaluation to `names`.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }
}

/// Evaluates templates against variables of the current environment.
///
/// Each evaluator owns the cache of grouped `now(group)` / `random(group)`
/// results, so two evaluators never share those values.
///
/// # Examples
///
/// ```
/// use request_actions::template::{ConcatEngine, EvaluateOptions, TemplateEvaluator};
/// use std::collections::HashMap;
/// use std::sync::Arc;
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let evaluator = TemplateEvaluator::new(Arc::new(ConcatEngine));
/// let context = HashMap::from([("a".to_string(), "x".to_string())]);
///
/// let options = EvaluateOptions::with_context(context);
/// let value = rt
///     .block_on(evaluator.evaluate_variable("Test: ${a}", &options))
///     .unwrap();
/// assert_eq!(value, "Test: x");
/// ```
pub struct TemplateEvaluator {
    engine: Arc<dyn ExpressionEngine>,
    environment: Option<Arc<dyn EnvironmentProvider>>,
    cache: FunctionCache,
    include_system_variables: bool,
}

impl std::fmt::Debug for TemplateEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEvaluator")
            .field("has_environment", &self.environment.is_some())
            .field("cache", &self.cache)
            .field("include_system_variables", &self.include_system_variables)
            .finish()
    }
}

impl TemplateEvaluator {
    /// Creates an evaluator without an environment; contexts start empty.
    pub fn new(engine: Arc<dyn ExpressionEngine>) -> Self {
        Self {
            engine,
            environment: None,
            cache: FunctionCache::new(),
            include_system_variables: true,
        }
    }

    /// Reads variables from `provider` whenever a context is built.
    pub fn with_environment(mut self, provider: Arc<dyn EnvironmentProvider>) -> Self {
        self.environment = Some(provider);
        self
    }

    /// Whether system variables are part of built contexts (default `true`).
    pub fn with_system_variables(mut self, include: bool) -> Self {
        self.include_system_variables = include;
        self
    }

    /// Cache of grouped function results owned by this evaluator.
    pub fn cache(&self) -> &FunctionCache {
        &self.cache
    }

    /// Forgets all grouped `now` / `random` results.
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Builds a context from the environment provider.
    ///
    /// Enabled variables (and system variables, when configured) are collected,
    /// `override_values` replaces or extends them, and variables referencing
    /// other variables are resolved in at most [`MAX_CONTEXT_ROUNDS`] passes.
    pub async fn build_context(
        &self,
        override_values: Option<&ContextMap>,
    ) -> Result<ContextMap, EvalError> {
        let snapshot = match &self.environment {
            Some(provider) => provider.snapshot().await?,
            None => EnvironmentSnapshot::default(),
        };
        Ok(self.build_context_from(&snapshot, override_values).await)
    }

    /// Builds a context from an explicit snapshot.
    pub async fn build_context_from(
        &self,
        snapshot: &EnvironmentSnapshot,
        override_values: Option<&ContextMap>,
    ) -> ContextMap {
        let mut context = ContextMap::new();
        if self.include_system_variables {
            context.extend(
                snapshot
                    .system_variables
                    .iter()
                    .map(|(k, v)| (k.clone(), v.clone())),
            );
        }
        for variable in snapshot.enabled_variables() {
            context.insert(variable.name.clone(), variable.value.clone());
        }
        if let Some(override_values) = override_values {
            context.extend(override_values.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        self.process_context_variables(&mut context).await;
        context
    }

    /// Resolves variables whose values contain placeholders.
    ///
    /// Each round evaluates pending values against a snapshot of what is known
    /// at the start of the round. Values still containing markers are retried
    /// once more, then left as they are.
    async fn process_context_variables(&self, context: &mut ContextMap) {
        let mut pending: Vec<String> = context
            .iter()
            .filter(|(_, value)| has_marker(value))
            .map(|(name, _)| name.clone())
            .collect();
        pending.sort();

        for round in 0..MAX_CONTEXT_ROUNDS {
            if pending.is_empty() {
                return;
            }
            let known = context.clone();
            let mut requeued = Vec::new();
            for name in pending {
                let Some(raw) = known.get(&name) else {
                    continue;
                };
                match self.evaluate_with_context(raw, &known).await {
                    Ok(resolved) => {
                        if has_marker(&resolved) {
                            requeued.push(name.clone());
                        }
                        context.insert(name, resolved);
                    }
                    Err(e) => {
                        log::warn!(
                            "Unable to resolve variable {} (round {}): {}",
                            name,
                            round + 1,
                            e
                        );
                    }
                }
            }
            pending = requeued;
        }

        if !pending.is_empty() {
            log::debug!("Variables left partially resolved: {}", pending.join(", "));
        }
    }

    /// Evaluates a single value.
    ///
    /// Uses `options.context` when present, otherwise builds a context with
    /// `options.override_values` applied.
    pub async fn evaluate_variable(
        &self,
        value: &str,
        options: &EvaluateOptions,
    ) -> Result<String, EvalError> {
        let context = self.context_for(options).await?;
        self.evaluate_with_context(value, &context).await
    }

    /// Evaluates a JSON value. Only strings are evaluated; every other value
    /// is returned unchanged.
    pub async fn evaluate_value(
        &self,
        value: Value,
        options: &EvaluateOptions,
    ) -> Result<Value, EvalError> {
        match value {
            Value::String(raw) => self.evaluate_variable(&raw, options).await.map(Value::String),
            other => Ok(other),
        }
    }

    /// Evaluates the string properties of `object` in place.
    ///
    /// Only own keys are visited (or `options.names` when set); falsy and
    /// non-string values are skipped. Nested objects are not entered.
    pub async fn evaluate_variables(
        &self,
        object: &mut Map<String, Value>,
        options: &EvaluateOptions,
    ) -> Result<(), EvalError> {
        let context = self.context_for(options).await?;
        let names: Vec<String> = match &options.names {
            Some(names) => names.clone(),
            None => object.keys().cloned().collect(),
        };
        for name in names {
            let raw = match object.get(&name) {
                Some(value @ Value::String(raw)) if is_truthy(value) => raw.clone(),
                _ => continue,
            };
            let evaluated = self.evaluate_with_context(&raw, &context).await?;
            object.insert(name, Value::String(evaluated));
        }
        Ok(())
    }

    async fn context_for<'a>(
        &self,
        options: &'a EvaluateOptions,
    ) -> Result<Cow<'a, ContextMap>, EvalError> {
        match &options.context {
            Some(context) => Ok(Cow::Borrowed(context)),
            None => Ok(Cow::Owned(
                self.build_context(options.override_values.as_ref()).await?,
            )),
        }
    }

    /// Evaluates `value` against a ready context.
    pub async fn evaluate_with_context(
        &self,
        value: &str,
        context: &ContextMap,
    ) -> Result<String, EvalError> {
        let value = upgrade_legacy(value);
        let value = self.evaluate_functions(&value)?;
        if value.is_empty() {
            return Ok(value);
        }

        let script_style = value.contains("${");
        if !script_style && !value.contains('{') {
            return Ok(value);
        }

        if !value.contains('\n') {
            return Ok(self.evaluate_line(&value, context, script_style).await);
        }

        let mut lines = Vec::new();
        for line in value.split('\n') {
            let trimmed = line.trim();
            if trimmed == "{" || trimmed == "}" {
                lines.push(line.to_string());
            } else {
                lines.push(self.evaluate_line(line, context, script_style).await);
            }
        }
        Ok(lines.join("\n"))
    }

    /// Replaces every function call with its result.
    fn evaluate_functions(&self, value: &str) -> Result<String, EvalError> {
        let mut result = value.to_string();
        let mut cursor = 0;
        while cursor <= result.len() {
            let Some(captures) = FUNCTION_CALL_REGEX.captures_at(&result, cursor) else {
                break;
            };
            let (Some(whole), Some(name)) = (captures.get(0), captures.get(1)) else {
                break;
            };
            let args: Vec<String> = captures
                .get(2)
                .map(|m| m.as_str())
                .filter(|args| !args.trim().is_empty())
                .map(|args| args.split(',').map(|arg| arg.trim().to_string()).collect())
                .unwrap_or_default();
            let replacement = call_function(name.as_str(), &args, &self.cache)?;
            let range = whole.range();
            let start = range.start;
            result.replace_range(range, &replacement);
            cursor = start + replacement.len();
        }
        Ok(result)
    }

    async fn evaluate_line(&self, line: &str, context: &ContextMap, script_style: bool) -> String {
        let Some(expression) = build_expression(line, script_style) else {
            return line.to_string();
        };
        match self.engine.evaluate(&expression, context).await {
            Ok(Value::String(result)) => result,
            Ok(Value::Null) => String::new(),
            Ok(other) => to_js_string(&other),
            Err(e) => {
                log::trace!("Expression {} left unresolved: {}", expression, e);
                line.to_string()
            }
        }
    }
}

fn has_marker(value: &str) -> bool {
    value.contains('{')
}

/// Rewrites legacy `${now}` / `${random:1}` forms into call syntax.
fn upgrade_legacy(value: &str) -> Cow<'_, str> {
    LEGACY_FUNCTION_REGEX.replace_all(value, |caps: &regex::Captures| {
        let group = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        format!("${{{}({})}}", &caps[1], group)
    })
}

fn quote(literal: &str) -> String {
    let escaped = literal
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r");
    format!("'{}'", escaped)
}

fn is_json_object(line: &str) -> bool {
    line.starts_with('{')
        && line.ends_with('}')
        && serde_json::from_str::<Value>(line).is_ok_and(|value| value.is_object())
}

/// Converts a line with placeholders into an engine expression.
///
/// Returns `None` when the line has no placeholders or contains a malformed
/// one; the caller keeps the line unchanged in both cases.
fn build_expression(line: &str, script_style: bool) -> Option<String> {
    let wrapped = line.len() >= 2 && is_json_object(line);
    let body = if wrapped { &line[1..line.len() - 1] } else { line };

    let mut parts = Vec::new();
    if wrapped {
        parts.push(quote("{"));
    }

    let mut tokenizer = Tokenizer::new(body);
    let mut literal = String::new();
    let mut found = false;
    while let Some(ch) = tokenizer.next_char() {
        let opens = if script_style {
            ch == '$' && tokenizer.peek() == Some('{')
        } else {
            ch == '{'
        };
        if !opens {
            literal.push(ch);
            continue;
        }
        if script_style {
            tokenizer.next_char();
        }
        let name = tokenizer.next_until('}')?;
        if !IDENTIFIER_REGEX.is_match(&name) {
            return None;
        }
        if !literal.is_empty() {
            parts.push(quote(&literal));
            literal.clear();
        }
        parts.push(name);
        found = true;
    }
    if !literal.is_empty() {
        parts.push(quote(&literal));
    }
    if wrapped {
        parts.push(quote("}"));
    }

    if found {
        Some(parts.join(" + "))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{StaticEnvironment, Variable};
    use crate::template::ConcatEngine;

    fn evaluator() -> TemplateEvaluator {
        TemplateEvaluator::new(Arc::new(ConcatEngine))
    }

    fn context(pairs: &[(&str, &str)]) -> ContextMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    async fn eval(value: &str, pairs: &[(&str, &str)]) -> String {
        evaluator()
            .evaluate_variable(value, &EvaluateOptions::with_context(context(pairs)))
            .await
            .unwrap()
    }

    #[test]
    fn test_upgrade_legacy() {
        assert_eq!(upgrade_legacy("${now}"), "${now()}");
        assert_eq!(upgrade_legacy("a ${random:2} b"), "a ${random(2)} b");
        assert_eq!(upgrade_legacy("${now:10}"), "${now(10)}");
        assert_eq!(upgrade_legacy("${other}"), "${other}");
    }

    #[test]
    fn test_build_expression_script_style() {
        assert_eq!(
            build_expression("Test: ${a}", true),
            Some("'Test: ' + a".to_string())
        );
        assert_eq!(build_expression("${a}${b}", true), Some("a + b".to_string()));
        assert_eq!(build_expression("no placeholders", true), None);
        assert_eq!(build_expression("${a-b}", true), None);
        assert_eq!(build_expression("${}", true), None);
        assert_eq!(build_expression("${open", true), None);
    }

    #[test]
    fn test_build_expression_api_style_and_json() {
        assert_eq!(build_expression("{a}", false), Some("a".to_string()));
        assert_eq!(
            build_expression(r#"{"k":"{a}"}"#, false),
            Some(r#"'{' + '"k":"' + a + '"' + '}'"#.to_string())
        );
        assert_eq!(build_expression("it's {a}", false), Some(r"'it\'s ' + a".to_string()));
    }

    #[tokio::test]
    async fn test_evaluate_script_style() {
        assert_eq!(eval("Test: ${a}", &[("a", "x")]).await, "Test: x");
    }

    #[tokio::test]
    async fn test_evaluate_api_style() {
        assert_eq!(eval("{a}", &[("a", "x")]).await, "x");
        assert_eq!(eval("{a}/{b}", &[("a", "x"), ("b", "y")]).await, "x/y");
    }

    #[tokio::test]
    async fn test_script_style_takes_precedence() {
        assert_eq!(eval("${a} {a}", &[("a", "x")]).await, "x {a}");
    }

    #[tokio::test]
    async fn test_resolved_value_is_unchanged() {
        assert_eq!(eval("plain text", &[]).await, "plain text");
        assert_eq!(eval("", &[]).await, "");
    }

    #[tokio::test]
    async fn test_undefined_variable_is_left_unchanged() {
        assert_eq!(eval("Test: ${missing}", &[]).await, "Test: ${missing}");
    }

    #[tokio::test]
    async fn test_malformed_placeholder_is_left_unchanged() {
        assert_eq!(eval("${a b} and ${a}", &[("a", "x")]).await, "${a b} and ${a}");
    }

    #[tokio::test]
    async fn test_json_object_value() {
        let value = eval(r#"{"id":"${a}"}"#, &[("a", "1")]).await;
        assert_eq!(value, r#"{"id":"1"}"#);

        let value = eval(r#"{"id":"{a}"}"#, &[("a", "1")]).await;
        assert_eq!(value, r#"{"id":"1"}"#);
    }

    #[tokio::test]
    async fn test_multiline_json_body() {
        let body = "{\n  \"token\": \"${token}\",\n  \"nested\": {\n    \"a\": 1\n  }\n}";
        let value = eval(body, &[("token", "abc")]).await;
        assert_eq!(
            value,
            "{\n  \"token\": \"abc\",\n  \"nested\": {\n    \"a\": 1\n  }\n}"
        );
    }

    #[tokio::test]
    async fn test_functions() {
        assert_eq!(eval("${encodeURIComponent(a b)}", &[]).await, "a%20b");
        assert_eq!(eval("x=Math.max(1, 5)", &[]).await, "x=5");
        assert_eq!(eval("String.toUpperCase(abc)-${a}", &[("a", "z")]).await, "ABC-z");
    }

    #[tokio::test]
    async fn test_unsupported_function_is_an_error() {
        let result = evaluator()
            .evaluate_variable("${unknownFn()}", &EvaluateOptions::with_context(ContextMap::new()))
            .await;
        assert!(matches!(result, Err(EvalError::UnsupportedFunction(name)) if name == "unknownFn"));
    }

    #[tokio::test]
    async fn test_oversized_repeat_is_an_error() {
        let options = EvaluateOptions::with_context(ContextMap::new());
        let result = evaluator().evaluate_variable("String.repeat(ab, 1e20)", &options).await;
        assert!(matches!(
            result,
            Err(EvalError::InvalidArgument { function, .. }) if function == "String.repeat"
        ));
    }

    #[tokio::test]
    async fn test_grouped_functions_replay() {
        let evaluator = evaluator();
        let options = EvaluateOptions::with_context(ContextMap::new());
        let first = evaluator.evaluate_variable("${now(1)}", &options).await.unwrap();
        let legacy = evaluator.evaluate_variable("${now:1}", &options).await.unwrap();
        assert_eq!(first, legacy);

        let a = evaluator.evaluate_variable("${random(1)}", &options).await.unwrap();
        let b = evaluator.evaluate_variable("${random(2)}", &options).await.unwrap();
        assert_ne!(a, b);

        evaluator.clear_cache();
        assert!(evaluator.cache().is_empty());
    }

    #[tokio::test]
    async fn test_build_context_filters_and_overrides() {
        let provider = StaticEnvironment::new(EnvironmentSnapshot {
            variables: vec![
                Variable::new("a", "1"),
                Variable::new("b", "2").with_enabled(false),
                Variable::new("c", "3"),
            ],
            system_variables: ContextMap::from([("HOME".to_string(), "/root".to_string())]),
        });
        let evaluator = evaluator().with_environment(Arc::new(provider));

        let context = evaluator
            .build_context(Some(&context(&[("c", "override"), ("d", "4")])))
            .await
            .unwrap();
        assert_eq!(context.get("a"), Some(&"1".to_string()));
        assert_eq!(context.get("b"), None);
        assert_eq!(context.get("c"), Some(&"override".to_string()));
        assert_eq!(context.get("d"), Some(&"4".to_string()));
        assert_eq!(context.get("HOME"), Some(&"/root".to_string()));
    }

    #[tokio::test]
    async fn test_build_context_without_system_variables() {
        let snapshot = EnvironmentSnapshot {
            variables: vec![Variable::new("a", "1")],
            system_variables: ContextMap::from([("HOME".to_string(), "/root".to_string())]),
        };
        let evaluator = evaluator().with_system_variables(false);
        let context = evaluator.build_context_from(&snapshot, None).await;
        assert_eq!(context.get("HOME"), None);
        assert_eq!(context.get("a"), Some(&"1".to_string()));
    }

    #[tokio::test]
    async fn test_context_variables_resolve_references() {
        let snapshot = EnvironmentSnapshot::new(vec![
            Variable::new("host", "api.com"),
            Variable::new("base", "https://${host}"),
            Variable::new("users", "${base}/users"),
        ]);
        let context = evaluator().build_context_from(&snapshot, None).await;
        assert_eq!(context["base"], "https://api.com");
        assert_eq!(context["users"], "https://api.com/users");
    }

    #[tokio::test]
    async fn test_context_resolution_stops_after_two_rounds() {
        let snapshot = EnvironmentSnapshot::new(vec![
            Variable::new("a", "{b}"),
            Variable::new("b", "{c}"),
            Variable::new("c", "{d}"),
            Variable::new("d", "{e}"),
            Variable::new("e", "end"),
        ]);
        let context = evaluator().build_context_from(&snapshot, None).await;
        assert_eq!(context["d"], "end");
        assert_eq!(context["c"], "end");
        assert_eq!(context["b"], "end");
        assert_eq!(context["a"], "{e}");
    }

    #[tokio::test]
    async fn test_evaluate_variables_object() {
        let mut object = serde_json::json!({
            "name": "${a}",
            "empty": "",
            "number": 5,
            "nested": {"value": "${a}"}
        })
        .as_object()
        .cloned()
        .unwrap();

        evaluator()
            .evaluate_variables(&mut object, &EvaluateOptions::with_context(context(&[("a", "x")])))
            .await
            .unwrap();

        assert_eq!(object["name"], "x");
        assert_eq!(object["empty"], "");
        assert_eq!(object["number"], 5);
        assert_eq!(object["nested"]["value"], "${a}");
    }

    #[tokio::test]
    async fn test_evaluate_variables_names_subset() {
        let mut object = serde_json::json!({"a": "${v}", "b": "${v}"})
            .as_object()
            .cloned()
            .unwrap();
        let options = EvaluateOptions::with_context(context(&[("v", "1")])).names(["b"]);
        evaluator().evaluate_variables(&mut object, &options).await.unwrap();
        assert_eq!(object["a"], "${v}");
        assert_eq!(object["b"], "1");
    }

    #[tokio::test]
    async fn test_evaluate_value_passes_objects_through() {
        let value = serde_json::json!({"a": "${x}"});
        let result = evaluator()
            .evaluate_value(value.clone(), &EvaluateOptions::with_context(ContextMap::new()))
            .await
            .unwrap();
        assert_eq!(result, value);
    }
}
