//! Dynamically typed values that flow through matching.
//!
//! Instances of registered variants are just another kind of value, so a field
//! may hold a nested instance that a sub-pattern destructures further.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use itertools::Itertools;

use crate::registry::Instance;

/// 2^53, the bound below which every integer is exact in an `f64`.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A JSON-like value, extended with variant instances and functions.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    /// Keys are kept sorted.
    Object(BTreeMap<String, Value>),
    Data(Instance),
    Function(Function),
}

/// A shared callable value.
#[derive(Clone)]
pub struct Function(Rc<dyn Fn(&[Value]) -> Value>);

impl Function {
    pub fn new(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self, args: &[Value]) -> Value {
        (self.0)(args)
    }

    /// True when both handles point at the same closure.
    pub fn ptr_eq(&self, other: &Function) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<function>")
    }
}

/// Structural equality used by literal patterns.
///
/// Values of different kinds are never equal. Arrays compare element-wise,
/// objects compare their sorted key sets and then each value. A function is
/// only equal to another handle of the same closure, and an instance is equal
/// to one of the same variant with equal constructor fields.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.keys().eq(ys.keys())
                && xs
                    .values()
                    .zip(ys.values())
                    .all(|(x, y)| deep_equal(x, y))
        }
        (Value::Data(x), Value::Data(y)) => {
            x.ptr_eq(y)
                || (x.variant() == y.variant()
                    && x.fields().len() == y.fields().len()
                    && x.fields()
                        .iter()
                        .zip(y.fields())
                        .all(|(x, y)| deep_equal(x, y)))
        }
        (Value::Function(f), Value::Function(g)) => f.ptr_eq(g),
        _ => false,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        deep_equal(self, other)
    }
}

impl Value {
    pub fn function(f: impl Fn(&[Value]) -> Value + 'static) -> Self {
        Value::Function(Function::new(f))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Data(inst) => Some(inst),
            _ => None,
        }
    }

    /// The value as JSON, or `None` if it holds an instance, a function or a
    /// non-finite number.
    pub fn to_json(&self) -> Option<serde_json::Value> {
        use serde_json::Value as Json;

        Some(match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            // Integral numbers print without a fraction, as JSON.stringify does.
            Value::Number(n) if n.fract() == 0.0 && n.abs() < MAX_SAFE_INTEGER => {
                Json::from(*n as i64)
            }
            Value::Number(n) => Json::Number(serde_json::Number::from_f64(*n)?),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(items) => {
                Json::Array(items.iter().map(Value::to_json).collect::<Option<_>>()?)
            }
            Value::Object(map) => Json::Object(
                map.iter()
                    .map(|(k, v)| Some((k.clone(), v.to_json()?)))
                    .collect::<Option<_>>()?,
            ),
            Value::Data(_) | Value::Function(_) => return None,
        })
    }

    /// Short name of the value's kind, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Data(_) => "data",
            Value::Function(_) => "function",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => write_json_str(f, s),
            Value::Array(items) => write!(f, "[{}]", items.iter().join(", ")),
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write_json_str(f, k)?;
                    write!(f, ": {v}")?;
                }
                write!(f, "}}")
            }
            Value::Data(inst) => write!(f, "{inst}"),
            Value::Function(_) => write!(f, "<function>"),
        }
    }
}

/// Strings use JSON escaping so the output can be pasted back into a pattern.
fn write_json_str(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    let quoted = serde_json::to_string(s).map_err(|_| fmt::Error)?;
    f.write_str(&quoted)
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        use serde_json::Value as Json;

        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
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

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(items)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Value::Object(map)
    }
}

impl From<Instance> for Value {
    fn from(inst: Instance) -> Self {
        Value::Data(inst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(pairs: &[(&str, Value)]) -> Value {
        Value::Object(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn primitives_compare_by_value() {
        assert!(deep_equal(&Value::from(1), &Value::from(1.0)));
        assert!(deep_equal(&Value::from("a"), &Value::from("a")));
        assert!(!deep_equal(&Value::from("a"), &Value::from("b")));
        assert!(deep_equal(&Value::Null, &Value::Null));
    }

    #[test]
    fn differing_kinds_are_unequal() {
        assert!(!deep_equal(&Value::from(1), &Value::from("1")));
        assert!(!deep_equal(&Value::Null, &Value::from(false)));
        assert!(!deep_equal(&Value::Array(vec![]), &Value::Object(BTreeMap::new())));
    }

    #[test]
    fn nan_is_not_equal_to_itself() {
        assert!(!deep_equal(&Value::from(f64::NAN), &Value::from(f64::NAN)));
    }

    #[test]
    fn arrays_compare_in_order() {
        let a = Value::from(vec![Value::from(1), Value::from(2)]);
        let b = Value::from(vec![Value::from(1), Value::from(2)]);
        let c = Value::from(vec![Value::from(2), Value::from(1)]);
        let d = Value::from(vec![Value::from(1)]);
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
        assert!(!deep_equal(&a, &d));
    }

    #[test]
    fn objects_compare_key_sets_and_values() {
        let a = object(&[("a", object(&[("b", Value::from(1))]))]);
        let b = object(&[("a", object(&[("b", Value::from(1))]))]);
        let c = object(&[("a", object(&[("b", Value::from(2))]))]);
        let d = object(&[
            ("a", object(&[("b", Value::from(1))])),
            ("z", Value::Null),
        ]);
        assert!(deep_equal(&a, &b));
        assert!(!deep_equal(&a, &c));
        assert!(!deep_equal(&a, &d));
    }

    #[test]
    fn functions_only_equal_themselves() {
        let f = Function::new(|_| Value::Null);
        let g = Function::new(|_| Value::Null);
        assert!(deep_equal(
            &Value::Function(f.clone()),
            &Value::Function(f.clone())
        ));
        assert!(!deep_equal(&Value::Function(f), &Value::Function(g)));
    }

    #[test]
    fn display_is_json_like() {
        let v = object(&[
            ("list", Value::from(vec![Value::from(1), Value::from(2.5)])),
            ("name", Value::from("x")),
        ]);
        assert_eq!(v.to_string(), r#"{"list": [1, 2.5], "name": "x"}"#);
    }

    #[test]
    fn display_escapes_strings_as_json() {
        assert_eq!(Value::from("\u{1}").to_string(), r#""\u0001""#);
        let v = object(&[("tab\t", Value::from("é"))]);
        assert_eq!(v.to_string(), r#"{"tab\t": "é"}"#);
    }

    #[test]
    fn json_conversion_keeps_structure() {
        let json = serde_json::json!({"a": [1, 2.5, null], "b": {"c": true}});
        let value = Value::from(json.clone());
        assert_eq!(
            value,
            object(&[
                (
                    "a",
                    Value::from(vec![Value::from(1), Value::from(2.5), Value::Null])
                ),
                ("b", object(&[("c", Value::from(true))])),
            ])
        );
        assert_eq!(value.to_json(), Some(json));
    }

    #[test]
    fn non_json_values_have_no_json_form() {
        assert_eq!(Value::from(f64::INFINITY).to_json(), None);
        assert_eq!(Value::from(vec![Value::function(|_| Value::Null)]).to_json(), None);
    }
}
