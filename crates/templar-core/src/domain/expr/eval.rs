//! Evaluation of parsed expressions against a tag environment.

use crate::domain::environment::{TagEnvironment, TagValue};

use super::ExprError;
use super::parser::{BinOp, Expr};

/// Result of evaluating an expression. Mirrors [`TagValue`]'s kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Num(f64),
    Str(String),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Num(_) => "number",
            Self::Str(_) => "string",
        }
    }
}

impl From<&TagValue> for Value {
    fn from(value: &TagValue) -> Self {
        match value {
            TagValue::Str(s) => Self::Str(s.clone()),
            TagValue::Bool(b) => Self::Bool(*b),
            TagValue::Num(n) => Self::Num(*n),
        }
    }
}

pub(crate) fn eval(expr: &Expr, env: &TagEnvironment) -> Result<Value, ExprError> {
    match expr {
        Expr::Bool(b) => Ok(Value::Bool(*b)),
        Expr::Num(n) => Ok(Value::Num(*n)),
        Expr::Str(s) => Ok(Value::Str(s.clone())),

        Expr::Var(name) => env
            .get(name)
            .map(Value::from)
            .ok_or_else(|| ExprError::UnknownVariable { name: name.clone() }),

        Expr::Not(inner) => match eval(inner, env)? {
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(type_mismatch("!", &other)),
        },

        Expr::Binary { op, lhs, rhs } => eval_binary(*op, lhs, rhs, env),

        Expr::Call { name, args } => eval_call(name, args, env),
    }
}

fn eval_binary(
    op: BinOp,
    lhs: &Expr,
    rhs: &Expr,
    env: &TagEnvironment,
) -> Result<Value, ExprError> {
    // Logical operators short-circuit; everything else evaluates both sides.
    match op {
        BinOp::And => {
            return match eval(lhs, env)? {
                Value::Bool(false) => Ok(Value::Bool(false)),
                Value::Bool(true) => match eval(rhs, env)? {
                    Value::Bool(b) => Ok(Value::Bool(b)),
                    other => Err(type_mismatch("&&", &other)),
                },
                other => Err(type_mismatch("&&", &other)),
            };
        }
        BinOp::Or => {
            return match eval(lhs, env)? {
                Value::Bool(true) => Ok(Value::Bool(true)),
                Value::Bool(false) => match eval(rhs, env)? {
                    Value::Bool(b) => Ok(Value::Bool(b)),
                    other => Err(type_mismatch("||", &other)),
                },
                other => Err(type_mismatch("||", &other)),
            };
        }
        _ => {}
    }

    let left = eval(lhs, env)?;
    let right = eval(rhs, env)?;

    match op {
        BinOp::Eq => equals(&left, &right).map(Value::Bool),
        BinOp::Ne => equals(&left, &right).map(|b| Value::Bool(!b)),
        BinOp::Lt | BinOp::Le | BinOp::Gt | BinOp::Ge => {
            let (Value::Num(a), Value::Num(b)) = (&left, &right) else {
                return Err(ExprError::TypeMismatch {
                    detail: format!(
                        "ordering compares numbers, got {} and {}",
                        left.kind(),
                        right.kind()
                    ),
                });
            };
            let result = match op {
                BinOp::Lt => a < b,
                BinOp::Le => a <= b,
                BinOp::Gt => a > b,
                BinOp::Ge => a >= b,
                _ => unreachable!(),
            };
            Ok(Value::Bool(result))
        }
        BinOp::And | BinOp::Or => unreachable!(),
    }
}

fn equals(left: &Value, right: &Value) -> Result<bool, ExprError> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Ok(a == b),
        (Value::Num(a), Value::Num(b)) => Ok(a == b),
        (Value::Str(a), Value::Str(b)) => Ok(a == b),
        _ => Err(ExprError::TypeMismatch {
            detail: format!(
                "cannot compare {} with {}",
                left.kind(),
                right.kind()
            ),
        }),
    }
}

/// The single builtin: `Count(bool...)` — number of `true` arguments.
fn eval_call(name: &str, args: &[Expr], env: &TagEnvironment) -> Result<Value, ExprError> {
    if name != "Count" {
        return Err(ExprError::UnknownFunction { name: name.to_owned() });
    }

    let mut count = 0u32;
    for arg in args {
        match eval(arg, env)? {
            Value::Bool(true) => count += 1,
            Value::Bool(false) => {}
            other => {
                return Err(ExprError::TypeMismatch {
                    detail: format!("Count takes bool arguments, got {}", other.kind()),
                });
            }
        }
    }
    Ok(Value::Num(f64::from(count)))
}

fn type_mismatch(op: &str, value: &Value) -> ExprError {
    ExprError::TypeMismatch {
        detail: format!("`{op}` needs a bool operand, got {}", value.kind()),
    }
}
