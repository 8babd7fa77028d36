//! Pattern language for destructuring registered variants.
//!
//! # Pattern syntax
//!
//! | Form            | Meaning                                               |
//! |-----------------|-------------------------------------------------------|
//! | `Name`          | A variant with no fields (same as `Name()`)           |
//! | `Name(a, b)`    | Bind each extracted field, in order                   |
//! | `ident`         | Bind the field to `ident`                             |
//! | `*`             | Accept any field without binding it                   |
//! | `=json`         | The field must deep-equal the JSON literal            |
//! | `Inner(x, ...)` | The field must itself match the sub-pattern           |
//! | `Shape`         | A registered shape name is a nullary sub-pattern      |
//!
//! Any number of trailing commas is ignored; other empty arguments are errors.
//! Parentheses must balance everywhere, including inside literals. Commas
//! inside a literal's brackets or strings do not separate arguments.
//!
//! Runtime values can be spliced into a pattern with [`literal_text`]:
//!
//! ```
//! use datamatch::{Registry, Value, VariantType, literal_text};
//!
//! let mut registry = Registry::new();
//! registry.register(VariantType::new("Pair", 2), None).unwrap();
//!
//! let wanted = Value::from(vec![Value::from("a, b"), Value::from(2)]);
//! let text = format!("Pair(={}, rest)", literal_text(&wanted).unwrap());
//! assert_eq!(text, r#"Pair(=["a, b",2], rest)"#);
//! assert!(registry.parse(&text).is_ok());
//! ```

pub mod ast;
pub mod binder;
pub mod literal;
pub mod parser;

pub use ast::{ArgPattern, PatternAst};
pub use binder::Bindings;
pub use literal::{LiteralError, literal_text, parse_literal};
pub use parser::parse;
