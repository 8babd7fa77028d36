//! Errors reported by the matching engine.

use std::fmt;

use crate::pattern::literal::LiteralError;

/// Errors raised while parsing a pattern or dispatching a subject.
#[derive(Debug, Clone, PartialEq)]
pub enum MatchError {
    /// No handler matched the subject.
    NotExhaustive,
    /// The pattern's argument count differs from the extracted field count.
    Arity { expected: usize, found: usize },
    /// Malformed pattern text (parentheses, commas, trailing text).
    InvalidPattern(String),
    /// The text after `=` is not a valid JSON literal.
    InvalidLiteral { token: String, reason: LiteralError },
    /// A subject term contains bindings or wildcards.
    NotGround(String),
    /// A subject term names a shape nobody registered.
    UnknownShape(String),
    /// A subject term names a shape whose custom extractor cannot be inverted.
    NotInvertible(String),
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotExhaustive => write!(f, "match was not exhaustive"),
            Self::Arity { expected, found } => {
                write!(f, "expected {expected} parameters, found {found}")
            }
            Self::InvalidPattern(text) => write!(f, "provided pattern {text} is invalid"),
            Self::InvalidLiteral { token, reason } => {
                write!(f, "invalid JSON in pattern {token}: {reason}")
            }
            Self::NotGround(text) => {
                write!(f, "subject {text} must only contain literals and shapes")
            }
            Self::UnknownShape(name) => write!(f, "no variant is registered as {name:?}"),
            Self::NotInvertible(name) => {
                write!(f, "shape {name} uses a custom extractor and cannot be built from a term")
            }
        }
    }
}

impl std::error::Error for MatchError {}

/// Errors raised while registering a variant shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternError {
    /// The registration template is not a well-formed `Name(...)` shape.
    InvalidTemplate(String),
    /// A template argument is not a `$n` placeholder.
    NotAPlaceholder { template: String, token: String },
    /// The shape name already belongs to another variant type.
    ShapeTaken { shape: String, owner: String },
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidTemplate(text) => write!(f, "shape template {text} is invalid"),
            Self::NotAPlaceholder { template, token } => write!(
                f,
                "shape template {template} is invalid: {token} is not a $n placeholder"
            ),
            Self::ShapeTaken { shape, owner } => {
                write!(f, "shape {shape} is already registered by {owner}")
            }
        }
    }
}

impl std::error::Error for PatternError {}
