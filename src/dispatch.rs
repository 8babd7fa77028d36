//! First-match dispatch over an ordered list of pattern handlers.

use anyhow::Result;

use crate::error::MatchError;
use crate::pattern::ast::PatternAst;
use crate::pattern::binder::{Bind, Bindings, bind};
use crate::pattern::parser;
use crate::registry::Registry;
use crate::value::Value;

/// A parsed pattern paired with the callback to run when it matches.
pub struct PatternHandler<'a, R> {
    pattern: PatternAst,
    handler: Box<dyn Fn(Bindings) -> Result<R> + 'a>,
}

impl<'a, R> PatternHandler<'a, R> {
    pub fn new(pattern: PatternAst, handler: impl Fn(Bindings) -> Result<R> + 'a) -> Self {
        Self {
            pattern,
            handler: Box::new(handler),
        }
    }

    pub fn pattern(&self) -> &PatternAst {
        &self.pattern
    }
}

/// A subject waiting for its list of handlers.
pub struct Subject<'a> {
    registry: &'a Registry,
    value: &'a Value,
}

impl Subject<'_> {
    /// Run the first handler whose pattern matches.
    pub fn cases<R>(self, handlers: &[PatternHandler<'_, R>]) -> Result<R> {
        self.registry.dispatch(self.value, handlers)
    }
}

impl Registry {
    /// Parse `text` against the shapes registered so far.
    pub fn parse(&self, text: &str) -> Result<PatternAst, MatchError> {
        parser::parse(self, text)
    }

    /// Parse `text` and pair it with `handler`.
    pub fn pattern<'a, R>(
        &self,
        text: &str,
        handler: impl Fn(Bindings) -> Result<R> + 'a,
    ) -> Result<PatternHandler<'a, R>, MatchError> {
        Ok(PatternHandler::new(self.parse(text)?, handler))
    }

    /// Start a match on `subject`; supply the handlers with [`Subject::cases`].
    pub fn match_on<'a>(&'a self, subject: &'a Value) -> Subject<'a> {
        Subject {
            registry: self,
            value: subject,
        }
    }

    /// Try `handlers` in order and return the result of the first that matches.
    ///
    /// Handlers whose pattern names another shape are skipped. A structural
    /// error such as an arity mismatch stops the search. An error returned by
    /// the chosen handler is passed through untouched. If nothing matches the
    /// result is [`MatchError::NotExhaustive`].
    pub fn dispatch<R>(&self, subject: &Value, handlers: &[PatternHandler<'_, R>]) -> Result<R> {
        let shape = self.shape_name_of(subject);
        for (index, case) in handlers.iter().enumerate() {
            if shape != Some(case.pattern.name.as_str()) {
                continue;
            }
            match bind(self, &case.pattern, subject) {
                Bind::Matched(bindings) => {
                    tracing::debug!(pattern = %case.pattern, index, "matched");
                    return (case.handler)(bindings);
                }
                Bind::Mismatch => {
                    tracing::trace!(pattern = %case.pattern, index, "no match, trying next");
                }
                Bind::Failure(err) => {
                    tracing::debug!(pattern = %case.pattern, index, %err, "dispatch failed");
                    return Err(err.into());
                }
            }
        }
        tracing::debug!(%subject, candidates = handlers.len(), "no pattern matched");
        Err(MatchError::NotExhaustive.into())
    }
}

/// Match a subject against `"pattern" => handler` arms, parsing every pattern
/// each time the expression is evaluated.
///
/// Evaluates to `datamatch::Result<R>`. A malformed pattern is reported before
/// any handler runs.
///
/// ```
/// use datamatch::{Registry, Value, VariantType, match_data};
///
/// let mut registry = Registry::new();
/// let some = registry.register(VariantType::new("Some", 1), None).unwrap();
/// registry.register(VariantType::new("None", 0), None).unwrap();
///
/// let subject = some.construct(vec![Value::from(3)]);
/// let found = match_data!(registry, subject, {
///     "None" => |_| Ok(None),
///     "Some(x)" => |b| Ok(b["x"].as_f64()),
/// });
/// assert_eq!(found.unwrap(), Some(3.0));
/// ```
#[macro_export]
macro_rules! match_data {
    ($registry:expr, $subject:expr, { $($pattern:expr => $handler:expr),* $(,)? }) => {
        (|| -> $crate::Result<_> {
            let registry = &$registry;
            let handlers = [$(registry.pattern($pattern, $handler)?),*];
            registry.dispatch(&$subject, &handlers)
        })()
    };
}
