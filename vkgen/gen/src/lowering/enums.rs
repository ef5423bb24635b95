//! Enum lowering.
//!
//! An enum definition becomes its underlying scalar plus one constant per
//! listed value. The constant identifier is the entity's declared identifier
//! followed by the cased display label, where the label is the parallel
//! `enumNames` entry when present and the value's text otherwise.
//!
//! Two labels that case to the same identifier produce colliding constants.
//! That is reported with a warning and left as is.

use std::collections::HashSet;

use tracing::warn;
use vkgen_define::{BaseKind, EnumExpr, EnumValue};

use super::Scalar;
use crate::casing::Caser;
use crate::errors::LoweringError;

/// A constant's literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumLiteral {
    Integer(i64),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumConstant {
    pub ident: String,
    pub literal: EnumLiteral,
}

/// The lowered form of one enum definition.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredEnum {
    pub underlying: Scalar,
    pub constants: Vec<EnumConstant>,
}

/// Scalar representation of an enum base kind.
///
/// Only integer, number and string enums are representable.
pub fn enum_scalar(kind: BaseKind) -> Result<Scalar, LoweringError> {
    match kind {
        BaseKind::Integer => Ok(Scalar::Integer),
        BaseKind::Number => Ok(Scalar::Float),
        BaseKind::String => Ok(Scalar::String),
        other => Err(LoweringError::UnsupportedEnumKind {
            kind: other.to_string(),
        }),
    }
}

/// Derives the constants of an enum declared as `entity`.
///
/// ## Arguments
///
/// * `entity` - The enum's declared (already cased) identifier
/// * `expr` - The enum node
/// * `caser` - Applied to each display label
///
/// ## Errors
///
/// Returns [`LoweringError::UnsupportedEnumKind`] for boolean, object or
/// array enums, and [`LoweringError::EnumValueMismatch`] when a value does
/// not fit the base kind.
pub fn lower_enum(entity: &str, expr: &EnumExpr, caser: &Caser) -> Result<LoweredEnum, LoweringError> {
    let underlying = enum_scalar(expr.base)?;
    let mut constants = Vec::with_capacity(expr.values.len());
    let mut seen = HashSet::with_capacity(expr.values.len());

    for (index, value) in expr.values.iter().enumerate() {
        let literal = literal_for(underlying, value).ok_or_else(|| LoweringError::EnumValueMismatch {
            index,
            value: value.label(),
            kind: expr.base.to_string(),
        })?;

        let label = expr
            .names
            .as_ref()
            .and_then(|names| names.get(index))
            .cloned()
            .unwrap_or_else(|| value.label());
        let ident = format!("{}{}", entity, caser.case(&label));

        if !seen.insert(ident.clone()) {
            warn!(entity, constant = %ident, position = index, "enum constant identifiers collide");
        }

        constants.push(EnumConstant { ident, literal });
    }

    Ok(LoweredEnum { underlying, constants })
}

fn literal_for(scalar: Scalar, value: &EnumValue) -> Option<EnumLiteral> {
    match (scalar, value) {
        (Scalar::Integer, EnumValue::Integer(i)) => Some(EnumLiteral::Integer(*i)),
        (Scalar::Float, EnumValue::Integer(i)) => Some(EnumLiteral::Float(*i as f64)),
        (Scalar::Float, EnumValue::Float(f)) => Some(EnumLiteral::Float(*f)),
        (Scalar::String, EnumValue::String(s)) => Some(EnumLiteral::String(s.clone())),
        _ => None,
    }
}
