//! Structural pattern matching over registered variant shapes.
//!
//! Variant types are registered once under a shape name. Values are then
//! destructured by an ordered list of `pattern => handler` arms; the first arm
//! whose pattern fits runs with the names it bound.
//!
//! # Example
//!
//! ```rust
//! use datamatch::{MatchError, Registry, Value, VariantType, match_data};
//!
//! let mut registry = Registry::new();
//! let cons = registry.register(VariantType::new("Cons", 2), None).unwrap();
//! let empty = registry.register(VariantType::new("Empty", 0), None).unwrap();
//!
//! let list = cons.construct(vec![
//!     Value::from(1),
//!     cons.construct(vec![Value::from(2), empty.construct(vec![])]),
//! ]);
//!
//! let second = match_data!(registry, list, {
//!     "Cons(*, Empty)" => |_| Ok(None),
//!     "Cons(=1, Cons(x, *))" => |b| Ok(b["x"].as_f64()),
//! });
//! assert_eq!(second.unwrap(), Some(2.0));
//!
//! let err = match_data!(registry, list, { "Empty" => |_| Ok(()) }).unwrap_err();
//! assert_eq!(err.downcast_ref::<MatchError>(), Some(&MatchError::NotExhaustive));
//! ```

mod dispatch;
mod error;
pub mod pattern;
mod registry;
mod value;

pub use anyhow::{Error, Result};
pub use dispatch::{PatternHandler, Subject};
pub use error::{MatchError, PatternError};
pub use pattern::{ArgPattern, Bindings, LiteralError, PatternAst, literal_text};
pub use registry::{Extract, Instance, Registry, VariantId, VariantType};
pub use value::{Function, Value, deep_equal};
