//! Expression engine seam.
//!
//! The evaluator rewrites a template such as `Bearer ${token}` into the
//! expression `'Bearer ' + token` and hands it to an [`ExpressionEngine`]
//! together with the context. Hosts may plug in a full scripting engine;
//! [`ConcatEngine`] understands exactly the expressions the evaluator emits.

use super::{ContextMap, EngineError};
use crate::coerce::{format_number, string_to_number};
use async_trait::async_trait;
use serde_json::Value;

/// Evaluates a rewritten placeholder expression against a context.
#[async_trait]
pub trait ExpressionEngine: Send + Sync {
    /// Evaluates `expression`. Any error leaves the template unresolved.
    async fn evaluate(&self, expression: &str, context: &ContextMap) -> Result<Value, EngineError>;
}

/// Engine for `+`-joined string literals, identifiers and integer literals.
///
/// Identifiers resolve from the context; an identifier consisting only of
/// digits that is not in the context is a number. Adding two numbers sums
/// them, any other pair is concatenated as text.
///
/// # Examples
///
/// ```
/// use request_actions::template::{ConcatEngine, ContextMap, ExpressionEngine};
///
/// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let mut context = ContextMap::new();
/// context.insert("name".to_string(), "world".to_string());
///
/// let value = rt
///     .block_on(ConcatEngine.evaluate("'hello ' + name", &context))
///     .unwrap();
/// assert_eq!(value, "hello world");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatEngine;

#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Text(String),
    Number(f64),
}

impl Operand {
    fn plus(self, other: Operand) -> Operand {
        match (self, other) {
            (Operand::Number(a), Operand::Number(b)) => Operand::Number(a + b),
            (a, b) => Operand::Text(format!("{}{}", a.into_text(), b.into_text())),
        }
    }

    fn into_text(self) -> String {
        match self {
            Operand::Text(text) => text,
            Operand::Number(n) => format_number(n),
        }
    }
}

struct Parser<'a> {
    chars: Vec<char>,
    index: usize,
    context: &'a ContextMap,
}

impl Parser<'_> {
    fn skip_whitespace(&mut self) {
        while self.chars.get(self.index).is_some_and(|c| c.is_whitespace()) {
            self.index += 1;
        }
    }

    fn syntax(&self, message: &str) -> EngineError {
        EngineError::Syntax {
            position: self.index,
            message: message.to_string(),
        }
    }

    fn expression(&mut self) -> Result<Operand, EngineError> {
        let mut result = self.term()?;
        loop {
            self.skip_whitespace();
            match self.chars.get(self.index) {
                None => return Ok(result),
                Some('+') => {
                    self.index += 1;
                    let next = self.term()?;
                    result = result.plus(next);
                }
                Some(_) => return Err(self.syntax("expected '+'")),
            }
        }
    }

    fn term(&mut self) -> Result<Operand, EngineError> {
        self.skip_whitespace();
        match self.chars.get(self.index).copied() {
            Some(quote @ ('\'' | '"')) => {
                self.index += 1;
                self.string_literal(quote).map(Operand::Text)
            }
            Some(c) if c.is_ascii_alphanumeric() || c == '_' => self.identifier(),
            Some(_) => Err(self.syntax("unexpected character")),
            None => Err(self.syntax("unexpected end of expression")),
        }
    }

    fn string_literal(&mut self, quote: char) -> Result<String, EngineError> {
        let mut out = String::new();
        while let Some(c) = self.chars.get(self.index).copied() {
            self.index += 1;
            if c == quote {
                return Ok(out);
            }
            if c != '\\' {
                out.push(c);
                continue;
            }
            let escaped = self
                .chars
                .get(self.index)
                .copied()
                .ok_or_else(|| self.syntax("unterminated escape"))?;
            self.index += 1;
            out.push(match escaped {
                'n' => '\n',
                'r' => '\r',
                't' => '\t',
                other => other,
            });
        }
        Err(self.syntax("unterminated string literal"))
    }

    fn identifier(&mut self) -> Result<Operand, EngineError> {
        let start = self.index;
        while self
            .chars
            .get(self.index)
            .is_some_and(|c| c.is_ascii_alphanumeric() || *c == '_')
        {
            self.index += 1;
        }
        let name: String = self.chars[start..self.index].iter().collect();
        match self.context.get(&name) {
            Some(value) => Ok(Operand::Text(value.clone())),
            None if name.chars().all(|c| c.is_ascii_digit()) => {
                Ok(Operand::Number(string_to_number(&name)))
            }
            None => Err(EngineError::UndefinedReference(name)),
        }
    }
}

#[async_trait]
impl ExpressionEngine for ConcatEngine {
    async fn evaluate(&self, expression: &str, context: &ContextMap) -> Result<Value, EngineError> {
        let mut parser = Parser {
            chars: expression.chars().collect(),
            index: 0,
            context,
        };
        let result = parser.expression()?;
        Ok(Value::String(result.into_text()))
    }
}
