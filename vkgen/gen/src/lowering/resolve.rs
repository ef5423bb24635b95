//! The type resolver.

use vkgen_define::{BaseKind, ExprKind, Expression, ObjectShape};

use super::enums::enum_scalar;
use super::{Composite, Field, Scalar, TypeDescriptor};
use crate::errors::LoweringError;
use crate::index::SchemaIndex;

/// Maps expressions to type descriptors against one schema index.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'i, 'a> {
    pub(crate) index: &'i SchemaIndex<'a>,
}

impl<'i, 'a> Resolver<'i, 'a> {
    pub fn new(index: &'i SchemaIndex<'a>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &'i SchemaIndex<'a> {
        self.index
    }

    /// Resolves one expression.
    ///
    /// - `Ref` becomes [`TypeDescriptor::Named`] with the target's declared
    ///   identifier; the target body is not expanded.
    /// - `AllOf`/`OneOf` are handed to the branch merger.
    /// - `Enum` resolves to the scalar of its base kind.
    /// - Arrays become sequences of their resolved element.
    /// - Inline objects with properties become anonymous composites.
    /// - Anything else, such as an object without properties, is opaque.
    ///
    /// ## Errors
    ///
    /// Unresolved references, enums of an unsupported kind, and malformed
    /// compositions anywhere below `expr`.
    pub fn resolve(&self, expr: &Expression) -> Result<TypeDescriptor, LoweringError> {
        match &expr.kind {
            ExprKind::Ref(target) => {
                let entry = self.index.lookup(target)?;
                Ok(TypeDescriptor::Named {
                    ident: entry.ident.clone(),
                    kind: entry.kind,
                })
            }
            ExprKind::AllOf(branches) | ExprKind::OneOf(branches) => {
                Ok(TypeDescriptor::Composite(self.merge(branches)?))
            }
            ExprKind::Enum(e) => enum_scalar(e.base).map(TypeDescriptor::Scalar),
            ExprKind::Array(element) => Ok(TypeDescriptor::sequence(self.resolve(element)?)),
            ExprKind::Base(BaseKind::Array) => Ok(TypeDescriptor::sequence(TypeDescriptor::Opaque)),
            ExprKind::Base(BaseKind::Integer) => Ok(TypeDescriptor::Scalar(Scalar::Integer)),
            ExprKind::Base(BaseKind::Number) => Ok(TypeDescriptor::Scalar(Scalar::Float)),
            ExprKind::Base(BaseKind::String) => Ok(TypeDescriptor::Scalar(Scalar::String)),
            ExprKind::Base(BaseKind::Boolean) => Ok(TypeDescriptor::Scalar(Scalar::Boolean)),
            ExprKind::Object(shape) if !shape.properties.is_empty() => {
                Ok(TypeDescriptor::Composite(self.resolve_object(shape)?))
            }
            ExprKind::Object(_) | ExprKind::Base(BaseKind::Object) => Ok(TypeDescriptor::Opaque),
        }
    }

    /// Resolves each property in document order. Repeated names keep the
    /// first occurrence.
    pub fn resolve_object(&self, shape: &ObjectShape) -> Result<Composite, LoweringError> {
        let mut fields: Vec<Field> = Vec::with_capacity(shape.properties.len());
        for property in &shape.properties {
            if fields.iter().any(|f| f.name == property.name) {
                continue;
            }
            fields.push(Field {
                name: property.name.clone(),
                ty: self.resolve(&property.expr)?,
                description: property.expr.description.clone(),
            });
        }
        Ok(Composite {
            fields,
            required: shape.required.clone(),
            origins: Vec::new(),
        })
    }
}
