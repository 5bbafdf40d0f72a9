//! Array compilation

use std::sync::Arc;

use super::{Compiled, Node};
use crate::expr::Evaluator;
use crate::template::RenderError;
use crate::value::Value;

/// Compile each element, collecting parameters in element order
pub(crate) fn compile(items: &[Value], evaluator: Option<&Arc<dyn Evaluator>>) -> Compiled {
    let mut parameters = Vec::new();
    let mut nodes = Vec::with_capacity(items.len());

    for item in items {
        let compiled = super::compile(item, evaluator);
        parameters.extend(compiled.parameters);
        nodes.push(compiled.node);
    }

    Compiled {
        node: Node::Array(nodes),
        parameters,
    }
}

pub(crate) fn render(items: &[Node], context: &Value) -> Result<Value, RenderError> {
    items
        .iter()
        .map(|node| node.render(context))
        .collect::<Result<Vec<_>, _>>()
        .map(Value::Array)
}

#[cfg(test)]
mod tests {
    use crate::compile::parse;
    use crate::value::Value;
    use serde_json::json;

    #[test]
    fn test_elements_render_in_order() {
        let template = parse(&Value::from(json!(["{{a}}", "lit", 3, ["{{b}}"]])), false);
        let result = template.render(&Value::from(json!({"a": "A", "b": "B"}))).unwrap();
        assert_eq!(result, Value::from(json!(["A", "lit", 3, ["B"]])));
    }

    #[test]
    fn test_parameters_in_element_order() {
        let template = parse(&Value::from(json!(["{{z}}", {"k": "{{a}}"}, "{{m}}"])), false);
        let keys: Vec<&str> = template.parameters().iter().map(|p| p.key.as_str()).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_element_object_substitution() {
        let template = parse(&Value::from(json!(["{{items}}", "{{items}}"])), false);
        let result = template.render(&Value::from(json!({"items": [1, 2]}))).unwrap();
        assert_eq!(result, Value::from(json!([[1, 2], [1, 2]])));
    }

    #[test]
    fn test_empty_array() {
        let template = parse(&Value::from(json!([])), false);
        assert!(template.parameters().is_empty());
        assert_eq!(template.render(&Value::Null).unwrap(), Value::from(json!([])));
    }
}
