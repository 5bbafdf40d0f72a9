//! Evaluator for default-value expressions

use std::cmp::Ordering;

use super::ast::*;
use crate::path;
use crate::value::Value;

/// Evaluate an expression against a scope value
///
/// The first segment of every path must exist in the scope; deeper segments
/// that are missing evaluate to null.
pub fn evaluate(expr: &Expr, scope: &Value) -> Result<Value, String> {
    match expr {
        Expr::Path(segments) => resolve(segments, scope),

        Expr::Constant(value) => Ok(value.clone()),

        Expr::Math { left, op, right } => {
            let left_val = evaluate(left, scope)?;
            let right_val = evaluate(right, scope)?;
            eval_math(&left_val, *op, &right_val)
        }

        Expr::Compare { left, op, right } => {
            let left_val = evaluate(left, scope)?;
            let right_val = evaluate(right, scope)?;
            eval_compare(&left_val, *op, &right_val).map(Value::Bool)
        }

        Expr::Logical { left, op, right } => {
            let left_val = evaluate(left, scope)?;
            match (op, is_truthy(&left_val)) {
                (LogicalOp::And, false) | (LogicalOp::Or, true) => Ok(left_val),
                _ => evaluate(right, scope),
            }
        }

        Expr::Ternary {
            condition,
            then_expr,
            else_expr,
        } => {
            let cond_val = evaluate(condition, scope)?;
            if is_truthy(&cond_val) {
                evaluate(then_expr, scope)
            } else {
                evaluate(else_expr, scope)
            }
        }

        Expr::Coalesce { exprs } => {
            for e in exprs {
                let val = evaluate(e, scope)?;
                if !val.is_null() {
                    return Ok(val);
                }
            }
            // All values were null
            Ok(Value::Null)
        }

        Expr::Negate(inner) => {
            let val = evaluate(inner, scope)?;
            eval_negate(&val)
        }

        Expr::Not(inner) => {
            let val = evaluate(inner, scope)?;
            Ok(Value::Bool(!is_truthy(&val)))
        }
    }
}

/// Resolve a path, requiring the root name to be defined in the scope
fn resolve(segments: &[String], scope: &Value) -> Result<Value, String> {
    let Some(root) = segments.first() else {
        return Err("empty path".to_string());
    };

    let defined = scope
        .as_object()
        .is_some_and(|map| map.contains_key(root.as_str()));
    if !defined {
        return Err(format!("'{}' is not defined", root));
    }

    Ok(path::get_segments(scope, segments)
        .cloned()
        .unwrap_or(Value::Null))
}

/// Numeric view of a value
#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i64),
    Float(f64),
}

impl Num {
    fn of(val: &Value) -> Option<Self> {
        match val {
            Value::Number(n) => n
                .as_i64()
                .map(Num::Int)
                .or_else(|| n.as_f64().map(Num::Float)),
            _ => None,
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            Num::Int(n) => n as f64,
            Num::Float(n) => n,
        }
    }
}

/// Evaluate a math operation
fn eval_math(left: &Value, op: MathOp, right: &Value) -> Result<Value, String> {
    // String concatenation
    if op == MathOp::Add && (left.as_str().is_some() || right.as_str().is_some()) {
        return Ok(Value::String(format!("{}{}", left, right)));
    }

    if left.is_null() || right.is_null() {
        return Err("null value in math operation".to_string());
    }

    let (a, b) = match (Num::of(left), Num::of(right)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            return Err(format!(
                "cannot perform {} on {} and {}",
                op,
                type_name(left),
                type_name(right)
            ));
        }
    };

    match (a, b) {
        (Num::Int(a), Num::Int(b)) => {
            let result = match op {
                MathOp::Add => a.checked_add(b).ok_or("integer overflow")?,
                MathOp::Sub => a.checked_sub(b).ok_or("integer underflow")?,
                MathOp::Mul => a.checked_mul(b).ok_or("integer overflow")?,
                MathOp::Div => {
                    if b == 0 {
                        return Err("division by zero".to_string());
                    }
                    // Inexact division falls through to float
                    if a.checked_rem(b).ok_or("integer overflow")? != 0 {
                        return Ok(Value::from(a as f64 / b as f64));
                    }
                    a.checked_div(b).ok_or("integer overflow")?
                }
                MathOp::Rem => {
                    if b == 0 {
                        return Err("division by zero".to_string());
                    }
                    a.checked_rem(b).ok_or("integer overflow")?
                }
            };
            Ok(Value::from(result))
        }
        (a, b) => {
            let (a, b) = (a.as_f64(), b.as_f64());
            let result = match op {
                MathOp::Add => a + b,
                MathOp::Sub => a - b,
                MathOp::Mul => a * b,
                MathOp::Div | MathOp::Rem => {
                    if b == 0.0 {
                        return Err("division by zero".to_string());
                    }
                    if op == MathOp::Div { a / b } else { a % b }
                }
            };
            Ok(Value::from(result))
        }
    }
}

/// Evaluate a comparison operation
fn eval_compare(left: &Value, op: CompareOp, right: &Value) -> Result<bool, String> {
    // Equality/inequality works across types
    match op {
        CompareOp::Eq => Ok(values_equal(left, right)),
        CompareOp::Ne => Ok(!values_equal(left, right)),
        CompareOp::Lt | CompareOp::Le | CompareOp::Gt | CompareOp::Ge => {
            let ordering = compare_ordered(left, right).ok_or_else(|| {
                format!(
                    "cannot compare {} and {} with {}",
                    type_name(left),
                    type_name(right),
                    op
                )
            })?;

            Ok(match op {
                CompareOp::Lt => ordering == Ordering::Less,
                CompareOp::Le => ordering != Ordering::Greater,
                CompareOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
    }
}

/// Check if two values are equal (with numeric coercion)
fn values_equal(left: &Value, right: &Value) -> bool {
    match (Num::of(left), Num::of(right)) {
        (Some(Num::Int(a)), Some(Num::Int(b))) => a == b,
        (Some(a), Some(b)) => (a.as_f64() - b.as_f64()).abs() < f64::EPSILON,
        _ => left == right,
    }
}

/// Order values of the same type
fn compare_ordered(left: &Value, right: &Value) -> Option<Ordering> {
    if let (Some(a), Some(b)) = (Num::of(left), Num::of(right)) {
        return match (a, b) {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
            (a, b) => a.as_f64().partial_cmp(&b.as_f64()),
        };
    }

    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Negate a value
fn eval_negate(val: &Value) -> Result<Value, String> {
    match Num::of(val) {
        Some(Num::Int(n)) => n
            .checked_neg()
            .map(Value::from)
            .ok_or_else(|| "integer overflow".to_string()),
        Some(Num::Float(n)) => Ok(Value::from(-n)),
        None => Err(format!("cannot negate {}", type_name(val))),
    }
}

/// Truthiness for conditions and logical operators
fn is_truthy(val: &Value) -> bool {
    match val {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        // Collections, dates and functions are always truthy
        _ => true,
    }
}

/// Get a type name for error messages
fn type_name(val: &Value) -> &'static str {
    match val {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::DateTime(_) => "datetime",
        Value::Function(_) => "function",
    }
}
