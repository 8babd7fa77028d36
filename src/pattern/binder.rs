//! Binds a [`PatternAst`] against a value.
//!
//! Binding has three outcomes. A soft mismatch means "this pattern does not
//! apply" and sends the dispatcher on to the next candidate. A failure is a
//! reportable error that aborts the whole dispatch.

use std::collections::HashMap;
use std::collections::hash_map;
use std::ops::Index;

use crate::error::MatchError;
use crate::registry::Registry;
use crate::value::{Value, deep_equal};

use super::ast::{ArgPattern, PatternAst};

/// Names captured by a successful match.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings(HashMap<String, Value>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Remove and return the value bound to `name`.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        self.0.remove(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Later bindings of the same name replace earlier ones.
    fn insert(&mut self, name: String, value: Value) {
        self.0.insert(name, value);
    }

    fn merge(&mut self, other: Bindings) {
        self.0.extend(other.0);
    }
}

impl Index<&str> for Bindings {
    type Output = Value;

    fn index(&self, name: &str) -> &Value {
        match self.0.get(name) {
            Some(value) => value,
            None => panic!("no binding named {name:?}"),
        }
    }
}

impl IntoIterator for Bindings {
    type Item = (String, Value);
    type IntoIter = hash_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Outcome of binding one pattern against one value.
#[derive(Debug)]
pub(crate) enum Bind {
    Matched(Bindings),
    /// The pattern does not apply; try the next one.
    Mismatch,
    Failure(MatchError),
}

/// Match `value` against `ast`, recursing into nested sub-patterns.
pub(crate) fn bind(registry: &Registry, ast: &PatternAst, value: &Value) -> Bind {
    let shape = registry.shape_name_of(value);
    if shape != Some(ast.name.as_str()) {
        tracing::trace!(pattern = %ast.name, found = ?shape, "shape mismatch");
        return Bind::Mismatch;
    }
    let Some(instance) = value.as_instance() else {
        return Bind::Mismatch;
    };

    let extracted = registry.extract(instance);
    if extracted.len() != ast.args.len() {
        return Bind::Failure(MatchError::Arity {
            expected: extracted.len(),
            found: ast.args.len(),
        });
    }

    let mut bindings = Bindings::new();
    for (arg, field) in ast.args.iter().zip(extracted) {
        match arg {
            ArgPattern::Binding(name) => bindings.insert(name.clone(), field),
            ArgPattern::Wildcard => {}
            ArgPattern::Literal(expected) => {
                if !deep_equal(expected, &field) {
                    tracing::trace!(pattern = %ast, %expected, found = %field, "literal mismatch");
                    return Bind::Mismatch;
                }
            }
            ArgPattern::Nested(sub) => match bind(registry, sub, &field) {
                Bind::Matched(inner) => bindings.merge(inner),
                other => return other,
            },
        }
    }
    Bind::Matched(bindings)
}
