//! Schema-to-type lowering.
//!
//! This module maps schema expressions onto [`TypeDescriptor`]s, the
//! language-level shapes the emitter renders. It has three parts:
//!
//! - [`resolve`] - The recursive [`Resolver`], one rule per expression kind
//! - [`merge`] - Field reconciliation across `allOf`/`oneOf` branches
//! - [`enums`] - Constant derivation for enum definitions
//!
//! Descriptors are plain values. References stay symbolic
//! ([`TypeDescriptor::Named`]); the resolver never expands another top-level
//! definition's body, so recursive schemas terminate without cycle tracking.
//!
//! ## Examples
//!
//! ```
//! use vkgen_define::{BaseKind, Expression, SchemaSet};
//! use vkgen_gen::casing::Caser;
//! use vkgen_gen::config::GeneratorConfig;
//! use vkgen_gen::index::SchemaIndex;
//! use vkgen_gen::lowering::{Resolver, Scalar, TypeDescriptor};
//!
//! let schema = SchemaSet::default();
//! let index = SchemaIndex::build(&schema, &Caser::new(true), &GeneratorConfig::default());
//! let resolver = Resolver::new(&index);
//!
//! let counts = Expression::array(Expression::base(BaseKind::Integer));
//! assert_eq!(
//!     resolver.resolve(&counts).unwrap(),
//!     TypeDescriptor::Sequence(Box::new(TypeDescriptor::Scalar(Scalar::Integer)))
//! );
//! ```

pub mod enums;
pub mod merge;
pub mod resolve;

pub use enums::{EnumConstant, EnumLiteral, LoweredEnum, lower_enum};
pub use resolve::Resolver;

use crate::index::DefinitionKind;

/// Built-in scalar representations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scalar {
    /// 64-bit signed integer
    Integer,
    /// 64-bit float
    Float,
    String,
    Boolean,
}

/// A resolved field of a composite.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Schema name, used for serialization.
    pub name: String,
    pub ty: TypeDescriptor,
    pub description: Option<String>,
}

/// An anonymous record synthesized from an inline object or a merge.
#[derive(Debug, Clone, PartialEq)]
pub struct Composite {
    pub fields: Vec<Field>,
    /// Required names carried over from an inline object; empty for merges.
    pub required: Vec<String>,
    /// Branches a merge was built from, documentation only.
    pub origins: Vec<String>,
}

impl Composite {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// The resolver's output.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    /// A declaration emitted elsewhere, addressed by its declared identifier.
    Named { ident: String, kind: DefinitionKind },
    Scalar(Scalar),
    Sequence(Box<TypeDescriptor>),
    Composite(Composite),
    Nullable(Box<TypeDescriptor>),
    /// Untyped dynamic value; no static shape could be derived.
    Opaque,
}

impl TypeDescriptor {
    pub fn nullable(inner: TypeDescriptor) -> Self {
        TypeDescriptor::Nullable(Box::new(inner))
    }

    pub fn sequence(element: TypeDescriptor) -> Self {
        TypeDescriptor::Sequence(Box::new(element))
    }

    /// Scalars and (nested) sequences of scalars.
    pub fn is_builtin(&self) -> bool {
        match self {
            TypeDescriptor::Scalar(_) => true,
            TypeDescriptor::Sequence(element) => element.is_builtin(),
            _ => false,
        }
    }

    /// Counts sequence nesting and returns the innermost element.
    pub fn sequence_depth(&self) -> (usize, &TypeDescriptor) {
        let mut depth = 0;
        let mut current = self;
        while let TypeDescriptor::Sequence(element) = current {
            depth += 1;
            current = element;
        }
        (depth, current)
    }

    /// The declared identifier when this is a reference.
    pub fn named_ident(&self) -> Option<&str> {
        match self {
            TypeDescriptor::Named { ident, .. } => Some(ident),
            _ => None,
        }
    }
}
