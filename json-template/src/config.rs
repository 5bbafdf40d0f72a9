//! Compile-time options

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::expr::{Evaluator, ExprEvaluator};

/// Which evaluator computes default values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluatorKind {
    /// The built-in expression language
    #[default]
    Expr,
    /// Lua expressions in a sandboxed state
    #[cfg(feature = "lua")]
    Lua,
}

/// Options threaded through compilation
///
/// Loadable from TOML:
///
/// ```toml
/// eval_defaults = true
/// evaluator = "expr"
/// ```
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Evaluate placeholder defaults as expressions instead of using them as text
    pub eval_defaults: bool,
    pub evaluator: EvaluatorKind,
    /// Overrides `evaluator` when set
    #[serde(skip)]
    custom_evaluator: Option<Arc<dyn Evaluator>>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            eval_defaults: false,
            evaluator: EvaluatorKind::default(),
            custom_evaluator: None,
        }
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("eval_defaults", &self.eval_defaults)
            .field("evaluator", &self.evaluator)
            .field("custom_evaluator", &self.custom_evaluator.is_some())
            .finish()
    }
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eval_defaults(mut self, enabled: bool) -> Self {
        self.eval_defaults = enabled;
        self
    }

    /// Use a custom evaluator for default values
    ///
    /// Only consulted when default evaluation is enabled.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn Evaluator>) -> Self {
        self.custom_evaluator = Some(evaluator);
        self
    }

    /// Parse options from a TOML document
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse template options")
    }

    /// The evaluator to use for defaults, or `None` when evaluation is off
    pub(crate) fn active_evaluator(&self) -> Option<Arc<dyn Evaluator>> {
        if !self.eval_defaults {
            return None;
        }

        if let Some(custom) = &self.custom_evaluator {
            return Some(Arc::clone(custom));
        }

        Some(match self.evaluator {
            EvaluatorKind::Expr => Arc::new(ExprEvaluator),
            #[cfg(feature = "lua")]
            EvaluatorKind::Lua => Arc::new(crate::expr::LuaEvaluator::new()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::EvalError;
    use crate::value::Value;

    struct Constant;

    impl Evaluator for Constant {
        fn evaluate(&self, _source: &str, _scope: &Value) -> Result<Value, EvalError> {
            Ok(Value::from("constant"))
        }
    }

    #[test]
    fn test_default_options_disable_evaluation() {
        let options = Options::default();
        assert!(!options.eval_defaults);
        assert_eq!(options.evaluator, EvaluatorKind::Expr);
        assert!(options.active_evaluator().is_none());
    }

    #[test]
    fn test_from_toml() {
        let options = Options::from_toml("eval_defaults = true\nevaluator = \"expr\"").unwrap();
        assert!(options.eval_defaults);
        assert!(options.active_evaluator().is_some());

        let options = Options::from_toml("").unwrap();
        assert!(!options.eval_defaults);
    }

    #[test]
    fn test_from_toml_rejects_unknown_evaluator() {
        let err = Options::from_toml("evaluator = \"python\"").unwrap_err();
        assert!(err.to_string().contains("Failed to parse template options"));
    }

    #[test]
    fn test_custom_evaluator_requires_eval_defaults() {
        let options = Options::new().with_evaluator(Arc::new(Constant));
        assert!(options.active_evaluator().is_none());

        let options = options.eval_defaults(true);
        let evaluator = options.active_evaluator().unwrap();
        assert_eq!(
            evaluator.evaluate("anything", &Value::Null).unwrap(),
            Value::from("constant")
        );
    }
}
