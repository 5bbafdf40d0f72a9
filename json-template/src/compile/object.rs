//! Object compilation

use std::sync::Arc;

use super::{Compiled, Node, string};
use crate::expr::Evaluator;
use crate::template::RenderError;
use crate::value::{Map, Value};

/// A compiled key/value pair; keys may themselves contain placeholders
#[derive(Debug, Clone)]
pub(crate) struct ObjectEntry {
    key: Node,
    value: Node,
}

/// Compile each entry in insertion order
///
/// Parameters are collected per entry, value parameters before key parameters.
pub(crate) fn compile(entries: &Map, evaluator: Option<&Arc<dyn Evaluator>>) -> Compiled {
    let mut parameters = Vec::new();
    let mut compiled = Vec::with_capacity(entries.len());

    for (key, value) in entries {
        let key = string::compile(key, evaluator);
        let value = super::compile(value, evaluator);

        parameters.extend(value.parameters);
        parameters.extend(key.parameters);
        compiled.push(ObjectEntry {
            key: key.node,
            value: value.node,
        });
    }

    Compiled {
        node: Node::Object(compiled),
        parameters,
    }
}

/// Render into a fresh object; when two keys render equal the later value wins
pub(crate) fn render(entries: &[ObjectEntry], context: &Value) -> Result<Value, RenderError> {
    let mut object = Map::with_capacity(entries.len());

    for entry in entries {
        let key = key_string(entry.key.render(context)?);
        let value = entry.value.render(context)?;
        object.insert(key, value);
    }

    Ok(Value::Object(object))
}

/// Rendered keys that are not strings use their text form
fn key_string(key: Value) -> String {
    match key {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
