//! Value representation for templates and render contexts

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde_json::Number;

/// Insertion-ordered object entries
pub type Map = IndexMap<String, Value>;

/// A JSON-like value, used both as template source and as render context
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Null/empty value
    #[default]
    Null,
    /// Boolean
    Bool(bool),
    /// Integer or floating point number
    Number(Number),
    /// String value
    String(String),
    /// Ordered sequence
    Array(Vec<Value>),
    /// Key/value mapping, iterated in insertion order
    Object(Map),
    /// Date and time
    DateTime(DateTime<Utc>),
    /// Callable resolved lazily at render time
    Function(Function),
}

/// The shape of a value, used to pick a compilation strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Array,
    Object,
    Date,
    Null,
    /// Numbers, booleans and functions
    Other,
}

/// A zero-argument callable stored in a context
///
/// Equality is identity: two functions are equal only if they share the same
/// underlying closure.
#[derive(Clone)]
pub struct Function(Arc<dyn Fn() -> anyhow::Result<Value> + Send + Sync>);

impl Function {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Function(Arc::new(f))
    }

    /// Invoke the function
    pub fn call(&self) -> anyhow::Result<Value> {
        (self.0)()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Function")
    }
}

impl Value {
    /// Wrap a closure as a function value
    pub fn function<F>(f: F) -> Self
    where
        F: Fn() -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Value::Function(Function::new(f))
    }

    /// Classify this value
    pub fn kind(&self) -> Kind {
        match self {
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
            Value::DateTime(_) => Kind::Date,
            Value::Null => Kind::Null,
            Value::Bool(_) | Value::Number(_) | Value::Function(_) => Kind::Other,
        }
    }

    /// Check if this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Objects, arrays and dates replace the whole string they are spliced into
    pub fn is_composite(&self) -> bool {
        matches!(self.kind(), Kind::Object | Kind::Array | Kind::Date)
    }

    /// Try to get as string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as object entries
    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Convert to a plain JSON value
    ///
    /// Dates become RFC 3339 strings and functions become null.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null | Value::Function(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(items) => serde_json::Value::Array(items.iter().map(Value::to_json).collect()),
            Value::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::DateTime(dt) => serde_json::Value::String(dt.to_rfc3339()),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Value::from(json.clone())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON representation and become null
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(dt: DateTime<Utc>) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Object(map)
    }
}

impl FromIterator<(String, Value)> for Value {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Value::Object(iter.into_iter().collect())
    }
}

/// Text form used when a value is spliced into a surrounding string
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => match n.as_f64() {
                // Larger magnitudes keep the exponent form
                Some(fl) if n.is_f64() && fl.fract() == 0.0 && fl.abs() < 1e21 => {
                    write!(f, "{:.0}", fl)
                }
                _ => write!(f, "{}", n),
            },
            Value::String(s) => write!(f, "{}", s),
            Value::Array(_) | Value::Object(_) => write!(f, "{}", self.to_json()),
            Value::DateTime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::Function(_) => write!(f, "[function]"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_kind_classification() {
        assert_eq!(Value::from("x").kind(), Kind::String);
        assert_eq!(Value::from(json!([1, 2])).kind(), Kind::Array);
        assert_eq!(Value::from(json!({"a": 1})).kind(), Kind::Object);
        assert_eq!(Value::Null.kind(), Kind::Null);
        assert_eq!(Value::from(3).kind(), Kind::Other);
        assert_eq!(Value::from(true).kind(), Kind::Other);
        assert_eq!(Value::function(|| Ok(Value::Null)).kind(), Kind::Other);

        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(Value::from(date).kind(), Kind::Date);
    }

    #[test]
    fn test_json_preserves_key_order() {
        let value = Value::from(json!({"z": 1, "a": 2, "m": 3}));
        let keys: Vec<&str> = value.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_to_json_roundtrip_with_dates() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let value: Value = vec![
            ("when".to_string(), Value::from(date)),
            ("n".to_string(), Value::from(1)),
        ]
        .into_iter()
        .collect();

        assert_eq!(
            value.to_json(),
            json!({"when": "2024-01-02T03:04:05+00:00", "n": 1})
        );
    }

    #[test]
    fn test_display_for_splicing() {
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::from(5).to_string(), "5");
        assert_eq!(Value::from(2.0).to_string(), "2");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::from(false).to_string(), "false");
        assert_eq!(Value::from("text").to_string(), "text");
        assert_eq!(Value::from(json!([1, "a"])).to_string(), r#"[1,"a"]"#);
    }

    #[test]
    fn test_display_large_floats_use_exponent() {
        assert_eq!(Value::from(1e20).to_string(), "100000000000000000000");
        assert_eq!(Value::from(1e300).to_string(), "1e300");
        assert_eq!(Value::from(-1e21).to_string(), "-1e21");
    }

    #[test]
    fn test_scalar_accessors() {
        assert_eq!(Value::from(true).as_bool(), Some(true));
        assert_eq!(Value::from("true").as_bool(), None);
        assert_eq!(Value::from(7).as_i64(), Some(7));
        assert_eq!(Value::from(7).as_f64(), Some(7.0));
        assert_eq!(Value::from("s").as_str(), Some("s"));
        assert_eq!(Value::Null.as_str(), None);
    }

    #[test]
    fn test_function_identity_equality() {
        let f = Value::function(|| Ok(Value::from(1)));
        let g = Value::function(|| Ok(Value::from(1)));
        assert_eq!(f, f.clone());
        assert_ne!(f, g);
    }

    #[test]
    fn test_non_finite_float_is_null() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
    }
}
