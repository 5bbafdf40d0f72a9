//! Compile JSON-like values containing `{{placeholders}}` into reusable templates
//!
//! A template is authored once as a value (strings, objects, arrays and
//! scalars) and rendered many times against different contexts:
//!
//! ```
//! use json_template::{Value, parse};
//! use serde_json::json;
//!
//! let template = parse(&Value::from(json!({
//!     "{{kind}}_id": "{{id}}",
//!     "label": "Item {{id}} ({{status:draft}})"
//! })), false);
//!
//! let rendered = template.render_json(&json!({"kind": "order", "id": 7})).unwrap();
//! assert_eq!(rendered, json!({"order_id": 7, "label": "Item 7 (draft)"}));
//! ```
//!
//! # Placeholder syntax
//!
//! - `{{ key }}`: look up `key` in the context. Keys are paths such as
//!   `user.name` or `items[0].id`.
//! - `{{ key : default }}`: use `default` when the key is missing or null.
//!   With default evaluation enabled the default is an expression, e.g.
//!   `{{ total : price * quantity }}`.
//!
//! A string that is exactly one placeholder renders to the value's own type;
//! otherwise values are spliced in as text. Objects, arrays and dates always
//! replace the whole string. Functions in the context are called and their
//! result used.

mod compile;
pub mod config;
pub mod dedupe;
pub mod expr;
pub mod path;
pub mod placeholder;
mod template;
pub mod value;

pub use compile::{parse, parse_with};
pub use config::{EvaluatorKind, Options};
pub use expr::{EvalError, Evaluator, ExprEvaluator};
pub use placeholder::Parameter;
pub use template::{RenderError, Template};
pub use value::{Function, Kind, Map, Value};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(source: serde_json::Value) -> Template {
        parse(&Value::from(source), false)
    }

    #[test]
    fn test_whole_placeholder_preserves_number() {
        let rendered = template(json!("{{a}}")).render(&Value::from(json!({"a": 5}))).unwrap();
        assert_eq!(rendered, Value::from(5));
    }

    #[test]
    fn test_embedded_placeholder_stringifies() {
        let rendered = template(json!("x {{a}} y")).render(&Value::from(json!({"a": 5}))).unwrap();
        assert_eq!(rendered, Value::from("x 5 y"));
    }

    #[test]
    fn test_defaults_raw_and_evaluated() {
        let empty = Value::from(json!({}));
        assert_eq!(template(json!("{{a:hello}}")).render(&empty).unwrap(), Value::from("hello"));

        let source = Value::from("{{a:1+1}}");
        assert_eq!(parse(&source, true).render(&empty).unwrap(), Value::from(2));
        assert_eq!(parse(&source, false).render(&empty).unwrap(), Value::from("1+1"));
    }

    #[test]
    fn test_object_substitution() {
        let rendered = template(json!("{{obj}}"))
            .render(&Value::from(json!({"obj": {"n": 1}})))
            .unwrap();
        assert_eq!(rendered, Value::from(json!({"n": 1})));
    }

    #[test]
    fn test_parameters_serialize_for_callers() {
        let template = template(json!({"to": "{{email}}", "subject": "{{subject:Hello}}"}));
        assert_eq!(
            serde_json::to_value(template.parameters()).unwrap(),
            json!([{"key": "email"}, {"key": "subject", "defaultValue": "Hello"}])
        );
    }

    #[test]
    fn test_parse_with_options_from_toml() {
        let options = Options::from_toml("eval_defaults = true").unwrap();
        let template = parse_with(&Value::from("{{n:2 * 21}}"), &options);
        assert_eq!(template.render(&Value::Null).unwrap(), Value::from(42));
    }

    #[test]
    fn test_parse_with_custom_evaluator() {
        use std::sync::Arc;

        struct Upper;
        impl Evaluator for Upper {
            fn evaluate(&self, source: &str, _scope: &Value) -> Result<Value, EvalError> {
                Ok(Value::from(source.trim().to_uppercase()))
            }
        }

        let options = Options::new().eval_defaults(true).with_evaluator(Arc::new(Upper));
        let template = parse_with(&Value::from("{{name: anon}}"), &options);
        assert_eq!(template.render(&Value::Null).unwrap(), Value::from("ANON"));
    }
}
