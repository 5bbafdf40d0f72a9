//! The compiled template artifact

use std::sync::Arc;

use crate::compile::Node;
use crate::dedupe::dedupe_by_key;
use crate::placeholder::Parameter;
use crate::value::Value;

/// Error raised while rendering a template
#[derive(Debug)]
pub enum RenderError {
    /// A function found in the context failed when invoked
    Callable { key: String, source: anyhow::Error },
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Callable { key, source } => {
                write!(f, "function at '{}' failed: {}", key, source)
            }
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Callable { source, .. } => Some(&**source),
        }
    }
}

/// A compiled template
///
/// Cheap to clone and safe to render from several threads at once; rendering
/// never changes the template.
#[derive(Debug, Clone)]
pub struct Template {
    root: Arc<Node>,
    parameters: Vec<Parameter>,
}

impl Template {
    /// Wrap a compiled tree, keeping the first parameter seen for each key
    pub(crate) fn new(root: Node, parameters: Vec<Parameter>) -> Self {
        let parameters = dedupe_by_key(parameters, |p| p.key.clone());
        Self {
            root: Arc::new(root),
            parameters,
        }
    }

    /// Parameters referenced anywhere in the template, in document order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// Render the template against a context
    pub fn render(&self, context: &Value) -> Result<Value, RenderError> {
        self.root.render(context)
    }

    /// Render with a plain JSON context, producing plain JSON
    pub fn render_json(&self, context: &serde_json::Value) -> Result<serde_json::Value, RenderError> {
        let context = Value::from(context);
        self.render(&context).map(|value| value.to_json())
    }
}
