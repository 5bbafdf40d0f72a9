//! String compilation and placeholder resolution

use std::fmt;
use std::sync::Arc;

use super::{Compiled, Node};
use crate::expr::Evaluator;
use crate::path;
use crate::placeholder::{self, Parameter, Placeholder};
use crate::template::RenderError;
use crate::value::Value;

/// A string containing one or more placeholders
#[derive(Clone)]
pub(crate) struct StringTemplate {
    source: String,
    placeholders: Vec<Placeholder>,
    /// Present only when defaults are evaluated
    evaluator: Option<Arc<dyn Evaluator>>,
}

impl fmt::Debug for StringTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringTemplate")
            .field("source", &self.source)
            .field("placeholders", &self.placeholders)
            .field("eval_defaults", &self.evaluator.is_some())
            .finish()
    }
}

/// Compile a string; placeholder-free strings become constants
pub(crate) fn compile(source: &str, evaluator: Option<&Arc<dyn Evaluator>>) -> Compiled {
    let placeholders = placeholder::scan(source);
    if placeholders.is_empty() {
        return Compiled {
            node: Node::Constant(Value::String(source.to_string())),
            parameters: Vec::new(),
        };
    }

    let parameters = placeholders.iter().map(|p| p.parameter.clone()).collect();

    Compiled {
        node: Node::Text(StringTemplate {
            source: source.to_string(),
            placeholders,
            evaluator: evaluator.cloned(),
        }),
        parameters,
    }
}

impl StringTemplate {
    /// The whole string is a single placeholder, so its value keeps its type
    fn is_single_placeholder(&self) -> bool {
        self.placeholders.len() == 1 && self.source.starts_with("{{") && self.source.ends_with("}}")
    }

    pub(crate) fn render(&self, context: &Value) -> Result<Value, RenderError> {
        let keep_type = self.is_single_placeholder();
        let mut output = self.source.clone();

        for placeholder in &self.placeholders {
            let value = self.resolve(&placeholder.parameter, context)?;

            // Objects, arrays and dates replace the whole string
            if value.is_composite() || keep_type {
                return Ok(value);
            }

            // Only the first occurrence of the matched text is replaced
            output = output.replacen(&placeholder.text, &value.to_string(), 1);
        }

        Ok(Value::String(output))
    }

    /// Look up a parameter's value, falling back to its default
    fn resolve(&self, parameter: &Parameter, context: &Value) -> Result<Value, RenderError> {
        let value = match path::get(context, &parameter.key) {
            Some(found) if !found.is_null() => found.clone(),
            _ => self.default_value(parameter, context),
        };

        match value {
            Value::Function(function) => function.call().map_err(|source| RenderError::Callable {
                key: parameter.key.clone(),
                source,
            }),
            value => Ok(value),
        }
    }

    fn default_value(&self, parameter: &Parameter, context: &Value) -> Value {
        let Some(raw) = &parameter.default_value else {
            return Value::Null;
        };

        if let Some(evaluator) = &self.evaluator {
            match evaluator.evaluate(raw, context) {
                Ok(value) => return value,
                Err(err) => {
                    log::debug!("Default for '{}' used as text: {}", parameter.key, err);
                }
            }
        }

        Value::String(raw.clone())
    }
}
