//! JSON literals written after `=` in a pattern.
//!
//! Parsing is strict JSON, so single-quoted strings, bare words and trailing
//! commas are all rejected.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

/// Why the text after `=` is not a JSON value.
#[derive(Debug, Clone)]
pub struct LiteralError(Arc<serde_json::Error>);

impl LiteralError {
    pub fn line(&self) -> usize {
        self.0.line()
    }

    pub fn column(&self) -> usize {
        self.0.column()
    }

    /// True if the literal ended before the value was complete.
    pub fn is_eof(&self) -> bool {
        self.0.is_eof()
    }
}

impl From<serde_json::Error> for LiteralError {
    fn from(err: serde_json::Error) -> Self {
        Self(Arc::new(err))
    }
}

impl PartialEq for LiteralError {
    fn eq(&self, other: &Self) -> bool {
        self.0.classify() == other.0.classify() && self.0.to_string() == other.0.to_string()
    }
}

impl fmt::Display for LiteralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for LiteralError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.0)
    }
}

/// Parse the JSON text of a literal argument.
pub fn parse_literal(text: &str) -> Result<Value, LiteralError> {
    let json: serde_json::Value = serde_json::from_str(text)?;
    Ok(Value::from(json))
}

/// JSON text for `value`, ready to splice into a pattern after `=`.
///
/// Returns `None` for values JSON cannot express: instances, functions and
/// non-finite numbers.
pub fn literal_text(value: &Value) -> Option<String> {
    serde_json::to_string(&value.to_json()?).ok()
}
