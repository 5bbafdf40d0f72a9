//! Path resolution into context values
//!
//! Paths use dotted segments with optional bracketed indexes or quoted keys:
//! `user.name`, `items[0].id`, `items.0.id`, `meta["content-type"]`.

use crate::value::Value;

/// Resolve a path against a value
///
/// An object key equal to the whole path wins over segment traversal, so
/// `{"a.b": 1}` resolves `a.b` to `1`. Returns `None` when any segment is
/// missing or the path is empty.
pub fn get<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return None;
    }

    // Try exact match first
    if let Some(val) = value.as_object().and_then(|map| map.get(path)) {
        return Some(val);
    }

    get_segments(value, &segments(path))
}

/// Resolve pre-split path segments against a value
pub fn get_segments<'a, S: AsRef<str>>(value: &'a Value, segments: &[S]) -> Option<&'a Value> {
    if segments.is_empty() {
        return None;
    }

    let mut current = value;
    for segment in segments {
        current = step(current, segment.as_ref())?;
    }
    Some(current)
}

/// Navigate one segment down from a value
fn step<'a>(value: &'a Value, segment: &str) -> Option<&'a Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

/// Split a path string into segments
///
/// `a.b[0]["c.d"]` becomes `["a", "b", "0", "c.d"]`. A leading dot yields an
/// empty first segment, which never matches anything but an empty key.
pub fn segments(path: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars().peekable();

    if path.starts_with('.') {
        segments.push(String::new());
    }

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }
            }
            '[' => {
                if !current.is_empty() {
                    segments.push(std::mem::take(&mut current));
                }

                let quote = match chars.peek() {
                    Some(&q @ ('"' | '\'')) => {
                        chars.next();
                        Some(q)
                    }
                    _ => None,
                };

                let mut inner = String::new();
                while let Some(c) = chars.next() {
                    match (quote, c) {
                        (Some(q), c) if c == q => {
                            // Skip to the closing bracket
                            for c in chars.by_ref() {
                                if c == ']' {
                                    break;
                                }
                            }
                            break;
                        }
                        (Some(_), '\\') => {
                            if let Some(escaped) = chars.next() {
                                inner.push(escaped);
                            }
                        }
                        (None, ']') => break,
                        (_, c) => inner.push(c),
                    }
                }
                segments.push(inner);
            }
            c => current.push(c),
        }
    }

    if !current.is_empty() {
        segments.push(current);
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ctx(json: serde_json::Value) -> Value {
        Value::from(json)
    }

    #[test]
    fn test_get_simple_key() {
        let record = ctx(json!({"name": "Contoso", "revenue": 1000000}));
        assert_eq!(get(&record, "name"), Some(&Value::from("Contoso")));
        assert_eq!(get(&record, "revenue"), Some(&Value::from(1000000)));
    }

    #[test]
    fn test_get_missing_key() {
        let record = ctx(json!({"name": "Contoso"}));
        assert_eq!(get(&record, "missing"), None);
        assert_eq!(get(&record, ""), None);
    }

    #[test]
    fn test_get_nested_path() {
        let record = ctx(json!({
            "user": {
                "contact": {
                    "email": "user@example.com"
                }
            }
        }));
        assert_eq!(
            get(&record, "user.contact.email"),
            Some(&Value::from("user@example.com"))
        );
    }

    #[test]
    fn test_get_null_midway() {
        let record = ctx(json!({"user": {"contact": null}}));
        assert_eq!(get(&record, "user.contact.email"), None);
        assert_eq!(get(&record, "user.contact"), Some(&Value::Null));
    }

    #[test]
    fn test_get_bracket_and_dotted_indexes() {
        let record = ctx(json!({"items": [{"id": "a"}, {"id": "b"}]}));
        assert_eq!(get(&record, "items[1].id"), Some(&Value::from("b")));
        assert_eq!(get(&record, "items.0.id"), Some(&Value::from("a")));
        assert_eq!(get(&record, "items[2].id"), None);
        assert_eq!(get(&record, "items[x]"), None);
    }

    #[test]
    fn test_get_quoted_bracket_key() {
        let record = ctx(json!({"meta": {"content-type": "json", "a.b": 2}}));
        assert_eq!(get(&record, "meta['content-type']"), Some(&Value::from("json")));
        assert_eq!(get(&record, "meta[\"a.b\"]"), Some(&Value::from(2)));
    }

    #[test]
    fn test_get_prefers_exact_key() {
        let record = ctx(json!({"a.b": 1, "a": {"b": 2}}));
        assert_eq!(get(&record, "a.b"), Some(&Value::from(1)));
    }

    #[test]
    fn test_get_on_scalar_root() {
        assert_eq!(get(&Value::from(5), "a"), None);
    }

    #[test]
    fn test_segments() {
        assert_eq!(segments("a.b[0]"), vec!["a", "b", "0"]);
        assert_eq!(segments("a[0][1].c"), vec!["a", "0", "1", "c"]);
        assert_eq!(segments("a['x.y'].z"), vec!["a", "x.y", "z"]);
        assert_eq!(segments(".a"), vec!["", "a"]);
    }
}
