//! AST types for match patterns.

use std::fmt;

use itertools::Itertools;

use crate::value::Value;

/// A parsed pattern such as `Cons(head, Cons(=2, *))`.
///
/// A bare `Name` and `Name()` both have no arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct PatternAst {
    pub name: String,
    pub args: Vec<ArgPattern>,
}

/// One argument position of a pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgPattern {
    /// Capture the value under this name.
    Binding(String),
    /// `*`: accept and discard the value.
    Wildcard,
    /// `=json`: the value must deep-equal this literal.
    Literal(Value),
    /// The value must itself match a sub-pattern.
    Nested(PatternAst),
}

impl PatternAst {
    pub fn nullary(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: vec![],
        }
    }

    /// Names bound by this pattern, outermost first, including duplicates.
    pub fn binding_names(&self) -> Vec<&str> {
        self.args
            .iter()
            .flat_map(|arg| match arg {
                ArgPattern::Binding(name) => vec![name.as_str()],
                ArgPattern::Nested(sub) => sub.binding_names(),
                ArgPattern::Wildcard | ArgPattern::Literal(_) => vec![],
            })
            .collect()
    }
}

impl fmt::Display for PatternAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}({})", self.name, self.args.iter().join(", "))
        }
    }
}

impl fmt::Display for ArgPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgPattern::Binding(name) => write!(f, "{name}"),
            ArgPattern::Wildcard => write!(f, "*"),
            ArgPattern::Literal(value) => write!(f, "={value}"),
            ArgPattern::Nested(sub) => write!(f, "{sub}"),
        }
    }
}
