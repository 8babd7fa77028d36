//! Variant registry and the extraction protocol.
//!
//! A variant type is declared once by identifier and arity, then registered
//! under a shape name. The registry remembers how each variant decomposes its
//! instances into the ordered values that pattern arguments bind against.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use itertools::Itertools;

use crate::error::{MatchError, PatternError};
use crate::pattern::ast::{ArgPattern, PatternAst};
use crate::pattern::parser;
use crate::value::Value;

/// Identity of a registered variant type.
///
/// Two ids are equal only if they came from registering the same identifier
/// in the same registry.
#[derive(Debug, Clone)]
pub struct VariantId {
    registry: Rc<()>,
    index: usize,
    ident: Rc<str>,
}

impl PartialEq for VariantId {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.registry, &other.registry)
            && self.index == other.index
            && self.ident == other.ident
    }
}

impl Eq for VariantId {}

impl Hash for VariantId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.ident.hash(state);
    }
}

impl VariantId {
    /// The type's own identifier (not necessarily its shape name).
    pub fn ident(&self) -> &str {
        &self.ident
    }

    /// Build an instance capturing `fields` as its constructor arguments.
    pub fn construct(&self, fields: Vec<Value>) -> Value {
        Value::Data(Instance(Rc::new(InstanceData {
            variant: self.clone(),
            fields,
        })))
    }
}

/// An immutable, shared instance of a registered variant.
#[derive(Debug, Clone)]
pub struct Instance(Rc<InstanceData>);

#[derive(Debug)]
struct InstanceData {
    variant: VariantId,
    fields: Vec<Value>,
}

impl Instance {
    pub fn variant(&self) -> &VariantId {
        &self.0.variant
    }

    /// Constructor arguments, in the order they were given.
    pub fn fields(&self) -> &[Value] {
        &self.0.fields
    }

    /// Constructor argument `i`, or `Null` when out of range.
    pub fn field(&self, i: usize) -> Value {
        self.0.fields.get(i).cloned().unwrap_or(Value::Null)
    }

    pub fn ptr_eq(&self, other: &Instance) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields().is_empty() {
            write!(f, "{}", self.variant().ident())
        } else {
            write!(
                f,
                "{}({})",
                self.variant().ident(),
                self.fields().iter().join(", ")
            )
        }
    }
}

/// Decomposes an instance into the ordered values a pattern binds against.
///
/// Implementations must be deterministic and free of side effects: a single
/// dispatch may extract the same instance once per candidate pattern.
pub trait Extract {
    fn extract(&self, instance: &Instance) -> Vec<Value>;
}

impl<F> Extract for F
where
    F: Fn(&Instance) -> Vec<Value>,
{
    fn extract(&self, instance: &Instance) -> Vec<Value> {
        self(instance)
    }
}

/// Declaration of a variant type, prior to registration.
pub struct VariantType {
    ident: String,
    arity: usize,
    extractor: Option<Rc<dyn Extract>>,
}

impl VariantType {
    pub fn new(ident: impl Into<String>, arity: usize) -> Self {
        Self {
            ident: ident.into(),
            arity,
            extractor: None,
        }
    }

    /// Replace the default extraction with `f`.
    pub fn with_custom_extractor(self, f: impl Fn(&Instance) -> Vec<Value> + 'static) -> Self {
        self.with_extractor(f)
    }

    pub fn with_extractor(mut self, extractor: impl Extract + 'static) -> Self {
        self.extractor = Some(Rc::new(extractor));
        self
    }

    /// The template used when no explicit shape is given: `Ident($1, ..., $N)`.
    pub fn default_template(&self) -> String {
        if self.arity == 0 {
            self.ident.clone()
        } else {
            let placeholders = (1..=self.arity).map(|i| format!("${i}")).join(", ");
            format!("{}({placeholders})", self.ident)
        }
    }
}

enum Extraction {
    /// The constructor arguments, unchanged.
    Fields,
    /// Zero-based constructor argument indices from an explicit template.
    Template(Vec<usize>),
    Custom(Rc<dyn Extract>),
}

struct Entry {
    ident: Rc<str>,
    arity: usize,
    shape: String,
    extraction: Extraction,
}

/// Table of registered variant types.
///
/// Registration needs `&mut Registry` and matching needs `&Registry`, so all
/// registration happens before any matching that borrows the registry.
#[derive(Default)]
pub struct Registry {
    /// Allocation shared by every id this registry hands out.
    tag: Rc<()>,
    entries: Vec<Entry>,
    by_ident: HashMap<Rc<str>, usize>,
    by_shape: HashMap<String, usize>,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|entry| (&entry.ident, &entry.shape)))
            .finish()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn id_at(&self, index: usize) -> VariantId {
        VariantId {
            registry: Rc::clone(&self.tag),
            index,
            ident: Rc::clone(&self.entries[index].ident),
        }
    }

    /// Register `ty` under `shape`, or under its default template if `None`.
    ///
    /// Registering an identifier again overwrites its entry and keeps its id.
    /// A shape name owned by a different identifier is rejected.
    pub fn register(
        &mut self,
        ty: VariantType,
        shape: Option<&str>,
    ) -> Result<VariantId, PatternError> {
        let (shape, indices) = match shape {
            Some(template) => {
                let (name, indices) = self.parse_template(template)?;
                (name, Some(indices))
            }
            None => (ty.ident.clone(), None),
        };

        if let Some(&owner) = self.by_shape.get(&shape)
            && *self.entries[owner].ident != *ty.ident
        {
            return Err(PatternError::ShapeTaken {
                shape,
                owner: self.entries[owner].ident.to_string(),
            });
        }

        let extraction = match (ty.extractor, indices) {
            (Some(custom), _) => Extraction::Custom(custom),
            (None, Some(indices)) => Extraction::Template(indices),
            (None, None) => Extraction::Fields,
        };

        let index = match self.by_ident.get(ty.ident.as_str()) {
            Some(&index) => {
                let old_shape = std::mem::take(&mut self.entries[index].shape);
                self.by_shape.remove(&old_shape);
                index
            }
            None => {
                self.entries.push(Entry {
                    ident: Rc::from(ty.ident.as_str()),
                    arity: 0,
                    shape: String::new(),
                    extraction: Extraction::Fields,
                });
                let index = self.entries.len() - 1;
                self.by_ident
                    .insert(Rc::clone(&self.entries[index].ident), index);
                index
            }
        };

        tracing::debug!(ident = %ty.ident, shape = %shape, arity = ty.arity, "registered variant");

        let entry = &mut self.entries[index];
        entry.arity = ty.arity;
        entry.shape = shape.clone();
        entry.extraction = extraction;
        self.by_shape.insert(shape, index);

        Ok(self.id_at(index))
    }

    /// Split a registration template into its shape name and the zero-based
    /// constructor indices its `$n` placeholders refer to.
    fn parse_template(&self, template: &str) -> Result<(String, Vec<usize>), PatternError> {
        let ast = parser::parse(self, template)
            .map_err(|_| PatternError::InvalidTemplate(template.to_string()))?;
        let indices = ast
            .args
            .iter()
            .map(|arg| {
                placeholder_index(arg).ok_or_else(|| PatternError::NotAPlaceholder {
                    template: template.to_string(),
                    token: arg.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok((ast.name, indices))
    }

    fn entry(&self, id: &VariantId) -> Option<&Entry> {
        if !Rc::ptr_eq(&id.registry, &self.tag) {
            return None;
        }
        self.entries
            .get(id.index)
            .filter(|entry| entry.ident == id.ident)
    }

    /// The registered shape name of `value`, if it is an instance of a variant
    /// registered here.
    pub fn shape_name_of(&self, value: &Value) -> Option<&str> {
        let inst = value.as_instance()?;
        self.entry(inst.variant()).map(|entry| entry.shape.as_str())
    }

    /// True if any variant is registered under `shape`.
    pub fn has_shape(&self, shape: &str) -> bool {
        self.by_shape.contains_key(shape)
    }

    /// The id registered under `shape`.
    pub fn lookup(&self, shape: &str) -> Option<VariantId> {
        let &index = self.by_shape.get(shape)?;
        Some(self.id_at(index))
    }

    /// Decompose `instance` into its ordered field values.
    pub fn extract(&self, instance: &Instance) -> Vec<Value> {
        match self.entry(instance.variant()).map(|entry| &entry.extraction) {
            Some(Extraction::Custom(extractor)) => extractor.extract(instance),
            Some(Extraction::Template(indices)) => {
                indices.iter().map(|&i| instance.field(i)).collect()
            }
            Some(Extraction::Fields) | None => instance.fields().to_vec(),
        }
    }

    /// Build a value from a ground pattern such as `Cons(=1, Empty)`.
    ///
    /// Arguments are given in shape order; for a placeholder template they are
    /// written back to the constructor positions the placeholders name. A
    /// shape with a custom extractor cannot be inverted and is rejected.
    pub fn instantiate(&self, ast: &PatternAst) -> Result<Value, MatchError> {
        let &index = self
            .by_shape
            .get(&ast.name)
            .ok_or_else(|| MatchError::UnknownShape(ast.name.clone()))?;
        let args = ast
            .args
            .iter()
            .map(|arg| match arg {
                ArgPattern::Literal(value) => Ok(value.clone()),
                ArgPattern::Nested(sub) => self.instantiate(sub),
                ArgPattern::Binding(_) | ArgPattern::Wildcard => {
                    Err(MatchError::NotGround(ast.to_string()))
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        let entry = &self.entries[index];
        let fields = match &entry.extraction {
            Extraction::Template(indices) => {
                check_arity(indices.len(), args.len())?;
                let width = indices
                    .iter()
                    .map(|i| i + 1)
                    .max()
                    .unwrap_or(0)
                    .max(entry.arity);
                let mut fields = vec![Value::Null; width];
                for (&i, value) in indices.iter().zip(args) {
                    fields[i] = value;
                }
                fields
            }
            Extraction::Fields => {
                check_arity(entry.arity, args.len())?;
                args
            }
            Extraction::Custom(_) => return Err(MatchError::NotInvertible(ast.name.clone())),
        };

        Ok(self.id_at(index).construct(fields))
    }
}

fn check_arity(expected: usize, found: usize) -> Result<(), MatchError> {
    if expected == found {
        Ok(())
    } else {
        Err(MatchError::Arity { expected, found })
    }
}

/// `$n` with n ≥ 1 maps to constructor index n - 1.
fn placeholder_index(arg: &ArgPattern) -> Option<usize> {
    match arg {
        ArgPattern::Binding(name) => name
            .strip_prefix('$')?
            .parse::<usize>()
            .ok()?
            .checked_sub(1),
        _ => None,
    }
}
