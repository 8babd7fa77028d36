//! Parser for `Name(arg, arg, ...)` pattern strings.
//!
//! Arguments are split at top-level commas, then each token is classified as
//! a nested pattern, a reference to a registered nullary shape, a wildcard, a
//! literal or a binding.

use crate::error::MatchError;
use crate::registry::Registry;

use super::ast::{ArgPattern, PatternAst};
use super::literal::parse_literal;

/// Parse `text` into a [`PatternAst`].
///
/// Bare words that name a registered shape become nullary sub-patterns, so
/// the result depends on what `registry` holds at the time of the call.
pub fn parse(registry: &Registry, text: &str) -> Result<PatternAst, MatchError> {
    let text = text.trim();
    let invalid = || MatchError::InvalidPattern(text.to_string());

    let (name, body) = match text.split_once('(') {
        Some((name, rest)) => (name, rest.strip_suffix(')').ok_or_else(invalid)?),
        None => (text, ""),
    };
    if name.contains(')') {
        return Err(invalid());
    }

    // Any number of trailing commas is accepted.
    let body = body.trim_end_matches(',');

    let args = split_top_level(body)
        .ok_or_else(invalid)?
        .into_iter()
        .map(|token| {
            let token = token.trim();
            if token.is_empty() {
                return Err(invalid());
            }
            parse_arg(registry, token).map_err(|err| match err {
                literal @ MatchError::InvalidLiteral { .. } => literal,
                _ => invalid(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(PatternAst {
        name: name.to_string(),
        args,
    })
}

fn parse_arg(registry: &Registry, token: &str) -> Result<ArgPattern, MatchError> {
    if token.contains('(') {
        // Failures inside a sub-pattern surface as the outer pattern's error.
        return parse(registry, token)
            .map(ArgPattern::Nested)
            .map_err(|_| MatchError::InvalidPattern(token.to_string()));
    }
    if registry.has_shape(token) {
        return Ok(ArgPattern::Nested(PatternAst::nullary(token)));
    }
    if token == "*" {
        return Ok(ArgPattern::Wildcard);
    }
    if let Some(json) = token.strip_prefix('=') {
        return parse_literal(json)
            .map(ArgPattern::Literal)
            .map_err(|reason| MatchError::InvalidLiteral {
                token: token.to_string(),
                reason,
            });
    }
    Ok(ArgPattern::Binding(token.to_string()))
}

/// Split `body` at commas outside parentheses.
///
/// Inside a token that starts with `=`, commas within JSON brackets and
/// strings do not split either. Parentheses are counted everywhere.
///
/// Returns `None` if the parentheses are unbalanced. An empty body has no
/// tokens.
fn split_top_level(body: &str) -> Option<Vec<&str>> {
    let mut tokens = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut literal = LiteralScan::default();

    for (i, c) in body.char_indices() {
        if literal.active {
            literal.feed(c);
        } else if c == '=' && body[start..i].trim().is_empty() {
            literal.active = true;
        }
        match c {
            '(' => depth += 1,
            ')' => depth = depth.checked_sub(1)?,
            ',' if depth == 0 && literal.at_top() => {
                tokens.push(&body[start..i]);
                start = i + 1;
                literal = LiteralScan::default();
            }
            _ => {}
        }
    }

    if depth != 0 {
        return None;
    }
    if !body.is_empty() {
        tokens.push(&body[start..]);
    }
    Some(tokens)
}

/// Bracket and string state of the `=` literal being tokenized.
#[derive(Default)]
struct LiteralScan {
    active: bool,
    brackets: usize,
    in_string: bool,
    escaped: bool,
}

impl LiteralScan {
    fn feed(&mut self, c: char) {
        if self.in_string {
            match c {
                _ if self.escaped => self.escaped = false,
                '\\' => self.escaped = true,
                '"' => self.in_string = false,
                _ => {}
            }
            return;
        }
        match c {
            '"' => self.in_string = true,
            '[' | '{' => self.brackets += 1,
            ']' | '}' => self.brackets = self.brackets.saturating_sub(1),
            _ => {}
        }
    }

    fn at_top(&self) -> bool {
        !self.in_string && self.brackets == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::literal::literal_text;
    use crate::registry::VariantType;
    use crate::value::Value;

    fn registry() -> Registry {
        let mut registry = Registry::new();
        registry.register(VariantType::new("Cons", 2), None).unwrap();
        registry.register(VariantType::new("Empty", 0), None).unwrap();
        registry
    }

    fn parse_ok(s: &str) -> PatternAst {
        parse(&registry(), s).expect("parse should succeed")
    }
    fn parse_err(s: &str) -> MatchError {
        parse(&registry(), s).expect_err("parse should fail")
    }

    fn binding(name: &str) -> ArgPattern {
        ArgPattern::Binding(name.to_string())
    }

    // --- Names and bindings ---

    #[test]
    fn test_bare_name_has_no_args() {
        assert_eq!(parse_ok("Empty"), PatternAst::nullary("Empty"));
        assert_eq!(parse_ok("Empty()"), parse_ok("Empty"));
        assert_eq!(parse_ok("  Empty  "), parse_ok("Empty"));
    }

    #[test]
    fn test_bindings() {
        let p = parse_ok("Cons(head, tail)");
        assert_eq!(p.name, "Cons");
        assert_eq!(p.args, vec![binding("head"), binding("tail")]);
    }

    #[test]
    fn test_tokens_are_trimmed() {
        assert_eq!(parse_ok("Cons(  a ,b  )"), parse_ok("Cons(a, b)"));
    }

    #[test]
    fn test_wildcard() {
        let p = parse_ok("Cons(*, tail)");
        assert_eq!(p.args, vec![ArgPattern::Wildcard, binding("tail")]);
    }

    #[test]
    fn test_numeric_words_are_bindings() {
        let p = parse_ok("Cons(1, 2)");
        assert_eq!(p.args, vec![binding("1"), binding("2")]);
    }

    // --- Literals ---

    #[test]
    fn test_literals() {
        let p = parse_ok(r#"Cons(=1, ="a")"#);
        assert_eq!(
            p.args,
            vec![
                ArgPattern::Literal(Value::from(1)),
                ArgPattern::Literal(Value::from("a"))
            ]
        );
    }

    #[test]
    fn test_literal_with_commas() {
        let p = parse_ok(r#"Cons(=[1, 2], ={"a": 1, "b": [2, 3]})"#);
        assert_eq!(p.args.len(), 2);
        assert_eq!(
            p.args[0],
            ArgPattern::Literal(Value::from(vec![Value::from(1), Value::from(2)]))
        );
        assert_eq!(p.to_string(), r#"Cons(=[1, 2], ={"a": 1, "b": [2, 3]})"#);
    }

    #[test]
    fn test_literal_string_may_hold_commas() {
        let p = parse_ok(r#"Cons(="a, b", tail)"#);
        assert_eq!(p.args[0], ArgPattern::Literal(Value::from("a, b")));
        assert_eq!(p.args[1], binding("tail"));
    }

    #[test]
    fn test_parens_inside_literals_still_count() {
        for text in [r#"Cons(=")", b)"#, r#"Cons(="(a)", b)"#, r#"Cons(=["(", 1], b)"#] {
            assert_eq!(
                parse_err(text),
                MatchError::InvalidPattern(text.to_string()),
                "{text} should be invalid"
            );
        }
    }

    #[test]
    fn test_brackets_outside_literals_do_not_group() {
        let p = parse_ok("Cons(a[, b)");
        assert_eq!(p.args, vec![binding("a["), binding("b")]);
        let p = parse_ok("Cons({, ])");
        assert_eq!(p.args, vec![binding("{"), binding("]")]);
    }

    #[test]
    fn test_canonical_form_reparses() {
        let text = r#"Cons(="\u0001\"", Cons(=[1, "x,y"], Empty))"#;
        let ast = parse_ok(text);
        assert_eq!(ast.to_string(), r#"Cons(="\u0001\"", Cons(=[1, "x,y"], Empty))"#);
        assert_eq!(parse_ok(&ast.to_string()), ast);
    }

    #[test]
    fn test_spliced_literal_text() {
        let needle = Value::from(vec![Value::from("a, b"), Value::from(2.5)]);
        let text = format!("Cons(={}, tail)", literal_text(&needle).unwrap());
        assert_eq!(parse_ok(&text).args[0], ArgPattern::Literal(needle));
    }

    #[test]
    fn test_invalid_literal() {
        assert!(matches!(
            parse_err("Cons(=a, b)"),
            MatchError::InvalidLiteral { .. }
        ));
        assert!(matches!(
            parse_err("Cons(='a', b)"),
            MatchError::InvalidLiteral { .. }
        ));
    }

    #[test]
    fn test_invalid_nested_literal_is_invalid_pattern() {
        assert_eq!(
            parse_err("Cons(a, Cons(=x, b))"),
            MatchError::InvalidPattern("Cons(a, Cons(=x, b))".into())
        );
    }

    // --- Nesting ---

    #[test]
    fn test_nested_pattern() {
        let p = parse_ok("Cons(first, Cons(second, third))");
        match &p.args[1] {
            ArgPattern::Nested(sub) => {
                assert_eq!(sub.name, "Cons");
                assert_eq!(sub.args, vec![binding("second"), binding("third")]);
            }
            other => panic!("expected Nested, got {other:?}"),
        }
        assert_eq!(p.binding_names(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_registered_name_is_nullary_reference() {
        let p = parse_ok("Cons(head, Empty)");
        assert_eq!(
            p.args[1],
            ArgPattern::Nested(PatternAst::nullary("Empty"))
        );
    }

    #[test]
    fn test_unregistered_name_is_binding() {
        let p = parse_ok("Cons(head, Nil)");
        assert_eq!(p.args[1], binding("Nil"));
    }

    // --- Commas ---

    #[test]
    fn test_trailing_commas_are_ignored() {
        let expected = parse_ok("Cons(a,b)");
        assert_eq!(parse_ok("Cons(a,b,)"), expected);
        assert_eq!(parse_ok("Cons(a,b,,)"), expected);
        assert_eq!(parse_ok("Cons(a,b,,,,,,,,,)"), expected);
    }

    #[test]
    fn test_empty_tokens_are_invalid() {
        for text in ["Cons(a,,b)", "Cons(,a,b)", "Cons(1, , 2)", "Cons( )", "Cons(a, b, )"] {
            assert!(
                matches!(parse_err(text), MatchError::InvalidPattern(_)),
                "{text} should be invalid"
            );
        }
    }

    // --- Parentheses ---

    #[test]
    fn test_unbalanced_parens_are_invalid() {
        for text in [
            "Cons(first, Cons second, third)))",
            "Cons(first, Cons(second, third)",
            "Cons(first, second",
            "Cons first, second)",
            "Cons(first)(second)",
            "Co)ns(a)",
            "Cons)",
            "Cons(",
            "Cons(a, Cons(b, (c))",
        ] {
            assert_eq!(
                parse_err(text),
                MatchError::InvalidPattern(text.to_string()),
                "{text} should be invalid"
            );
        }
    }

    #[test]
    fn test_error_message_mentions_invalid() {
        assert!(parse_err("Cons(a,,b)").to_string().contains("invalid"));
    }

    // --- Tokenizer ---

    #[test]
    fn test_split_top_level() {
        assert_eq!(split_top_level(""), Some(vec![]));
        assert_eq!(split_top_level("a"), Some(vec!["a"]));
        assert_eq!(
            split_top_level("a, B(c, d), e"),
            Some(vec!["a", " B(c, d)", " e"])
        );
        assert_eq!(
            split_top_level(r#"=[1, 2], ="x,y", [a, b]"#),
            Some(vec!["=[1, 2]", r#" ="x,y""#, " [a", " b]"])
        );
        assert_eq!(split_top_level("a)("), None);
        assert_eq!(split_top_level("(a"), None);
    }
}
