//! Sandboxed evaluation of placeholder default values
//!
//! A placeholder such as `{{ total : price * quantity }}` can compute its
//! default from the render context when default evaluation is enabled. The
//! built-in [`ExprEvaluator`] understands a small expression language:
//!
//! - Paths into the scope: `user.name`, `items[0]`, `meta['content-type']`
//! - Literals: `'text'`, `"text"`, `42`, `1.5`, `true`, `false`, `null`
//! - Math: `a + b`, `a - b`, `a * b`, `a / b`, `a % b` (`+` concatenates strings)
//! - Comparisons: `a == b`, `a != b`, `a < b`, `a <= b`, `a > b`, `a >= b`
//! - Logic: `a && b`, `a || b`, `!a`
//! - Ternary conditionals: `cond ? then : else`
//! - Null coalesce: `a ?? b ?? 'default'`
//!
//! Expressions can only read the scope they are given. A Lua-backed
//! evaluator is available with the `lua` feature.

mod ast;
mod eval;
#[cfg(feature = "lua")]
mod lua;
mod parser;

pub use ast::{CompareOp, Expr, LogicalOp, MathOp};
pub use eval::evaluate;
#[cfg(feature = "lua")]
pub use lua::LuaEvaluator;
pub use parser::{ParseError, parse_expression};

use crate::value::Value;

/// Computes a value from expression source and a read-only scope
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, source: &str, scope: &Value) -> Result<Value, EvalError>;
}

/// Error from evaluating a default-value expression
#[derive(Debug, Clone, PartialEq)]
pub enum EvalError {
    /// The source is not a valid expression
    Parse(ParseError),
    /// The expression failed while running
    Eval(String),
}

impl std::fmt::Display for EvalError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvalError::Parse(err) => write!(f, "invalid expression {}", err),
            EvalError::Eval(message) => write!(f, "evaluation failed: {}", message),
        }
    }
}

impl std::error::Error for EvalError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EvalError::Parse(err) => Some(err),
            EvalError::Eval(_) => None,
        }
    }
}

impl From<ParseError> for EvalError {
    fn from(err: ParseError) -> Self {
        EvalError::Parse(err)
    }
}

/// The built-in expression evaluator
#[derive(Debug, Clone, Copy, Default)]
pub struct ExprEvaluator;

impl Evaluator for ExprEvaluator {
    fn evaluate(&self, source: &str, scope: &Value) -> Result<Value, EvalError> {
        let expr = parse_expression(source)?;
        evaluate(&expr, scope).map_err(EvalError::Eval)
    }
}
