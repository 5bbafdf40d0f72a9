//! Compilation of template values into render trees
//!
//! The dispatcher classifies each value and hands it to the compiler for its
//! shape. Strings may contain placeholders, objects and arrays recurse, and
//! everything else compiles to a constant.

mod array;
mod object;
mod string;

use std::sync::Arc;

use crate::config::Options;
use crate::expr::Evaluator;
use crate::placeholder::Parameter;
use crate::template::{RenderError, Template};
use crate::value::Value;

use self::object::ObjectEntry;
use self::string::StringTemplate;

/// A compiled node, mirroring the shape of the source value
#[derive(Debug, Clone)]
pub(crate) enum Node {
    /// Rendered as-is
    Constant(Value),
    /// A string with at least one placeholder
    Text(StringTemplate),
    Object(Vec<ObjectEntry>),
    Array(Vec<Node>),
}

impl Node {
    pub(crate) fn render(&self, context: &Value) -> Result<Value, RenderError> {
        match self {
            Node::Constant(value) => Ok(value.clone()),
            Node::Text(template) => template.render(context),
            Node::Object(entries) => object::render(entries, context),
            Node::Array(items) => array::render(items, context),
        }
    }
}

/// A node together with the parameters it references, in traversal order
///
/// Parameters are not yet deduplicated.
#[derive(Debug, Clone)]
pub(crate) struct Compiled {
    pub node: Node,
    pub parameters: Vec<Parameter>,
}

impl Compiled {
    fn constant(value: Value) -> Self {
        Self {
            node: Node::Constant(value),
            parameters: Vec::new(),
        }
    }
}

/// Compile a template value, using defaults as literal text
///
/// With `eval_defaults`, defaults are evaluated with the built-in expression
/// evaluator and fall back to their text when evaluation fails.
pub fn parse(template: &Value, eval_defaults: bool) -> Template {
    parse_with(template, &Options::new().eval_defaults(eval_defaults))
}

/// Compile a template value with explicit options
pub fn parse_with(template: &Value, options: &Options) -> Template {
    let evaluator = options.active_evaluator();
    let compiled = compile(template, evaluator.as_ref());

    log::debug!(
        "Compiled {:?} template with {} parameter occurrence(s)",
        template.kind(),
        compiled.parameters.len()
    );

    Template::new(compiled.node, compiled.parameters)
}

/// Dispatch on the value's shape
pub(crate) fn compile(value: &Value, evaluator: Option<&Arc<dyn Evaluator>>) -> Compiled {
    log::trace!("Compiling {:?} value", value.kind());

    match value {
        Value::String(text) => string::compile(text, evaluator),
        Value::Object(entries) => object::compile(entries, evaluator),
        Value::Array(items) => array::compile(items, evaluator),
        // Scalars, null, dates and functions
        _ => Compiled::constant(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Map;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn render(template: serde_json::Value, context: serde_json::Value) -> Value {
        parse(&Value::from(template), false)
            .render(&Value::from(context))
            .unwrap()
    }

    #[test]
    fn test_placeholder_free_values_render_unchanged() {
        let source = json!({
            "name": "plain",
            "count": 3,
            "ratio": 0.5,
            "enabled": true,
            "missing": null,
            "nested": {"list": [1, "two", {"three": 3}], "braces": "{ not a placeholder }"}
        });

        let template = parse(&Value::from(source.clone()), false);
        assert!(template.parameters().is_empty());
        assert_eq!(
            template.render(&Value::from(json!({"name": "ignored"}))).unwrap(),
            Value::from(source)
        );
    }

    #[test]
    fn test_scalars_compile_to_constants() {
        for scalar in [json!(1), json!(2.5), json!(false), json!(null), json!("text")] {
            let template = parse(&Value::from(scalar.clone()), false);
            assert!(template.parameters().is_empty());
            assert_eq!(template.render(&Value::Null).unwrap(), Value::from(scalar));
        }
    }

    #[test]
    fn test_dates_compile_to_constants() {
        let date = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let template = parse(&Value::from(date), false);
        assert!(template.parameters().is_empty());
        assert_eq!(template.render(&Value::Null).unwrap(), Value::from(date));
    }

    #[test]
    fn test_key_and_value_placeholders() {
        let result = render(json!({"{{k}}": "{{v}}"}), json!({"k": "id", "v": 42}));
        assert_eq!(result, Value::from(json!({"id": 42})));
    }

    #[test]
    fn test_nested_array_and_object() {
        let template = parse(&Value::from(json!([{"a": "{{x}}"}, "{{y}}"])), false);
        assert_eq!(
            template.parameters(),
            &[Parameter::new("x"), Parameter::new("y")]
        );
        assert_eq!(
            template.render(&Value::from(json!({"x": 1, "y": 2}))).unwrap(),
            Value::from(json!([{"a": 1}, 2]))
        );
    }

    #[test]
    fn test_object_parameter_order_values_before_keys() {
        let template = parse(
            &Value::from(json!({
                "{{k1}}": "{{v1}}",
                "static": ["{{v2}}", "{{v3}}"],
                "{{k2}}": "plain"
            })),
            false,
        );
        let keys: Vec<&str> = template.parameters().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["v1", "k1", "v2", "v3", "k2"]);
    }

    #[test]
    fn test_parameters_deduplicated_across_tree() {
        let template = parse(
            &Value::from(json!({"a": "{{x:1}}", "b": ["{{y}}", "{{x:2}}"], "c": "{{y:3}}"})),
            false,
        );
        assert_eq!(
            template.parameters(),
            &[Parameter::with_default("x", "1"), Parameter::new("y")]
        );
    }

    #[test]
    fn test_compiling_twice_renders_identically() {
        let source = Value::from(json!({"greeting": "Hi {{name}}", "n": "{{n}}"}));
        let first = parse(&source, false);
        let second = parse(&source, false);

        for context in [json!({"name": "A", "n": 1}), json!({"name": "B"}), json!({})] {
            let context = Value::from(context);
            assert_eq!(first.render(&context).unwrap(), second.render(&context).unwrap());
        }
    }

    #[test]
    fn test_render_does_not_mutate_source() {
        let source = Value::from(json!({"list": ["{{a}}"], "obj": {"k": "{{b}}"}}));
        let snapshot = source.clone();
        let template = parse(&source, false);
        template.render(&Value::from(json!({"a": 1, "b": 2}))).unwrap();
        assert_eq!(source, snapshot);
    }

    #[test]
    fn test_object_key_order_preserved() {
        let result = render(
            json!({"z": "{{a}}", "{{k}}": 1, "m": 2}),
            json!({"a": 0, "k": "b"}),
        );
        let keys: Vec<&String> = result.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "b", "m"]);
    }

    #[test]
    fn test_function_values_compile_to_constants() {
        let f = Value::function(|| Ok(Value::from(1)));
        let source: Value = Map::from_iter([("f".to_string(), f.clone())]).into();
        let template = parse(&source, false);
        assert!(template.parameters().is_empty());
        assert_eq!(template.render(&Value::Null).unwrap(), source);
    }

    #[test]
    fn test_eval_defaults_threaded_through_recursion() {
        let source = Value::from(json!({"outer": [{"inner": "{{a:1+1}}"}]}));
        let evaluated = parse(&source, true).render(&Value::from(json!({}))).unwrap();
        assert_eq!(evaluated, Value::from(json!({"outer": [{"inner": 2}]})));

        let raw = parse(&source, false).render(&Value::from(json!({}))).unwrap();
        assert_eq!(raw, Value::from(json!({"outer": [{"inner": "1+1"}]})));
    }
}
