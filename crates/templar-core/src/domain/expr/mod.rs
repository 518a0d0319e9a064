//! Computed-tag expression language.
//!
//! A small, self-contained boolean/relational language evaluated against a
//! [`TagEnvironment`]: literals (`true`, `3.5`, `"mvc"`), variable references
//! (tag keys), `!`, `&&`, `||`, the comparison operators, parentheses and one
//! builtin variadic function, `Count(bool...)`, returning the number of true
//! arguments.
//!
//! The pipeline is tokenizer → recursive-descent parser → AST → evaluator;
//! there is deliberately no embedded general-purpose interpreter, which keeps
//! the grammar auditable.
//!
//! ```rust
//! use templar_core::domain::{expr, TagEnvironment, TagValue};
//!
//! let env = TagEnvironment::new()
//!     .with("mongo", TagValue::Bool(true))
//!     .with("postgres", TagValue::Bool(false));
//!
//! let value = expr::evaluate("Count(mongo, postgres) == 1", &env).unwrap();
//! assert_eq!(value, expr::Value::Bool(true));
//! ```

mod eval;
mod lexer;
mod parser;

use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use super::environment::TagEnvironment;
use super::error::DomainError;
use super::metadata::TemplateMetadata;

pub use eval::Value;

/// Parse/evaluation failure inside a single expression. Wrapped into
/// [`DomainError::Computation`] (with the tag key and expression text) before
/// leaving the domain.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExprError {
    #[error("unexpected character `{ch}` at offset {pos}")]
    UnexpectedChar { ch: char, pos: usize },

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("invalid number literal `{literal}`")]
    InvalidNumber { literal: String },

    #[error("unexpected token {token}")]
    TrailingInput { token: String },

    #[error("expected {what}")]
    Expected { what: &'static str },

    #[error("unknown variable `{name}`")]
    UnknownVariable { name: String },

    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },

    #[error("{detail}")]
    TypeMismatch { detail: String },
}

/// Parse and evaluate one expression against the environment.
pub fn evaluate(expression: &str, env: &TagEnvironment) -> Result<Value, ExprError> {
    let tokens = lexer::tokenize(expression)?;
    let ast = parser::parse(&tokens)?;
    eval::eval(&ast, env)
}

/// Evaluate every computed tag declared by `metadata` against `env`.
///
/// All-or-nothing: the first expression that fails to parse or evaluate
/// aborts the whole call with [`DomainError::Computation`]. An expression
/// that evaluates successfully to a *non-boolean* value is silently omitted
/// from the result — callers treat the missing key as unresolved, which the
/// exclusion logic later reads as `false`.
pub fn evaluate_computed_tags(
    metadata: &TemplateMetadata,
    env: &TagEnvironment,
) -> Result<HashMap<String, bool>, DomainError> {
    let mut result = HashMap::new();

    for tag in &metadata.computed_tags {
        match evaluate(&tag.expression, env) {
            Ok(Value::Bool(value)) => {
                result.insert(tag.key.clone(), value);
            }
            Ok(other) => {
                debug!(key = %tag.key, value = ?other, "computed tag is not boolean, omitted");
            }
            Err(cause) => {
                return Err(DomainError::Computation {
                    key: tag.key.clone(),
                    expression: tag.expression.clone(),
                    cause: cause.to_string(),
                });
            }
        }
    }

    Ok(result)
}
