//! AST types for default-value expressions

use crate::value::Value;

/// An expression used to compute a default value
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// A path into the scope: `user.name`, `items[0]`
    Path(Vec<String>),
    /// A constant value: `'string'`, `123`, `true`, `null`
    Constant(Value),
    /// Math operation: `a + b`, `a % b`
    Math {
        left: Box<Expr>,
        op: MathOp,
        right: Box<Expr>,
    },
    /// Comparison: `a == b`, `a < b`
    Compare {
        left: Box<Expr>,
        op: CompareOp,
        right: Box<Expr>,
    },
    /// Short-circuit logic: `a && b`, `a || b`
    Logical {
        left: Box<Expr>,
        op: LogicalOp,
        right: Box<Expr>,
    },
    /// Ternary conditional: `cond ? then : else`
    Ternary {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    /// Null coalesce: `a ?? b ?? c`
    Coalesce { exprs: Vec<Expr> },
    /// Negation: `-expr`
    Negate(Box<Expr>),
    /// Logical not: `!expr`
    Not(Box<Expr>),
}

/// Math operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
}

impl std::fmt::Display for MathOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MathOp::Add => write!(f, "+"),
            MathOp::Sub => write!(f, "-"),
            MathOp::Mul => write!(f, "*"),
            MathOp::Div => write!(f, "/"),
            MathOp::Rem => write!(f, "%"),
        }
    }
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompareOp::Eq => write!(f, "=="),
            CompareOp::Ne => write!(f, "!="),
            CompareOp::Lt => write!(f, "<"),
            CompareOp::Le => write!(f, "<="),
            CompareOp::Gt => write!(f, ">"),
            CompareOp::Ge => write!(f, ">="),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}
