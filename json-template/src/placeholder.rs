//! Placeholder lexer
//!
//! A placeholder is `{{`, one or more placeholder characters, then `}}`. The
//! body ends at the first `}}` after its first character. Inside the braces
//! the text is `key` or `key:default`; the key is trimmed, the default is
//! kept verbatim.

use std::ops::Range;

use serde::{Deserialize, Serialize};

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A parameter referenced by a template
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Dotted/bracketed path into the render context
    pub key: String,
    /// Raw text after the first `:`, used literally or as an expression
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

impl Parameter {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default_value: None,
        }
    }

    pub fn with_default(key: impl Into<String>, default_value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            default_value: Some(default_value.into()),
        }
    }
}

/// One placeholder occurrence within a string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// The matched text, braces included
    pub text: String,
    /// Byte range of the match in the scanned string
    pub span: Range<usize>,
    pub parameter: Parameter,
}

impl Placeholder {
    fn from_match(input: &str, span: Range<usize>) -> Self {
        let text = input[span.clone()].to_string();
        let body = text[OPEN.len()..text.len() - CLOSE.len()].trim();

        let parameter = match body.split_once(':') {
            Some((key, default)) => Parameter::with_default(key.trim(), default),
            None => Parameter::new(body),
        };

        Self {
            text,
            span,
            parameter,
        }
    }
}

/// Characters allowed between the braces
fn is_placeholder_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || c.is_whitespace()
        || matches!(
            c,
            '_' | ':'
                | '{'
                | '}'
                | '\''
                | '"'
                | '['
                | ']'
                | '-'
                | '+'
                | '.'
                | ','
                | '@'
                | '/'
                | '('
                | ')'
                | '?'
                | '='
                | '*'
                | '$'
        )
}

/// Find every placeholder in a string, left to right, without overlap
pub fn scan(input: &str) -> Vec<Placeholder> {
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(offset) = input[pos..].find(OPEN) {
        let start = pos + offset;
        match match_at(input, start) {
            Some(end) => {
                found.push(Placeholder::from_match(input, start..end));
                pos = end;
            }
            // '{' is one byte, so this stays on a char boundary
            None => pos = start + 1,
        }
    }

    found
}

/// Try to match a placeholder whose `{{` starts at `start`, returning the end
fn match_at(input: &str, start: usize) -> Option<usize> {
    let body_start = start + OPEN.len();
    let body = &input[body_start..];

    let first = body.chars().next()?;
    if !is_placeholder_char(first) {
        return None;
    }

    let mut offset = first.len_utf8();
    loop {
        let rest = &body[offset..];
        if rest.starts_with(CLOSE) {
            return Some(body_start + offset + CLOSE.len());
        }
        let c = rest.chars().next()?;
        if !is_placeholder_char(c) {
            return None;
        }
        offset += c.len_utf8();
    }
}
