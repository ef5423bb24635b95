//! Post-emission field type overrides.
//!
//! A [`PatchRule`] names one field of one struct in one output unit and the
//! type text that replaces the emitted one. Rules are applied to the emitted
//! text before formatting. The struct and field are located by parsing the
//! text with `syn`; the field's type is then replaced by splicing its byte
//! range, so every other byte of the unit (comments, attributes, ordering,
//! unrelated fields) stays exactly as emitted.
//!
//! A rule that does not match is an error, never a silent skip.

use std::str::FromStr;

use proc_macro2::LineColumn;
use quote::ToTokens;
use tracing::debug;

use crate::config::PatchTable;
use crate::errors::GeneratorError;
use crate::output::OutputUnit;

/// One configured field type override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRule {
    pub unit: OutputUnit,
    pub declaration: String,
    pub field: String,
    pub replacement: String,
}

/// Flattens the configured table into rules, in table order.
///
/// ## Errors
///
/// Returns `GeneratorError::ConfigError` for a unit key that is not an
/// output unit name.
pub fn rules_from_table(table: &PatchTable) -> Result<Vec<PatchRule>, GeneratorError> {
    let mut rules = Vec::new();
    for (unit_name, declarations) in table {
        let unit = OutputUnit::from_str(unit_name).map_err(|_| {
            GeneratorError::ConfigError(format!("patch table names unknown output unit '{}'", unit_name))
        })?;
        for (declaration, fields) in declarations {
            for (field, replacement) in fields {
                rules.push(PatchRule {
                    unit,
                    declaration: declaration.clone(),
                    field: field.clone(),
                    replacement: replacement.clone(),
                });
            }
        }
    }
    Ok(rules)
}

/// Applies every rule for `unit` to `source`.
///
/// Rules for other units are ignored.
///
/// ## Errors
///
/// - `GeneratorError::CodeGenError` if `source` does not parse or a
///   replacement is not a Rust type
/// - `GeneratorError::PatchTargetNotFound` if the named struct or field is
///   absent
pub fn apply_patches(source: &str, unit: OutputUnit, rules: &[PatchRule]) -> Result<String, GeneratorError> {
    let mut patched = source.to_string();
    for rule in rules.iter().filter(|r| r.unit == unit) {
        patched = apply_rule(&patched, rule)?;
        debug!(%unit, declaration = %rule.declaration, field = %rule.field, "patch applied");
    }
    Ok(patched)
}

fn apply_rule(source: &str, rule: &PatchRule) -> Result<String, GeneratorError> {
    syn::parse_str::<syn::Type>(&rule.replacement).map_err(|e| {
        GeneratorError::CodeGenError(format!(
            "patch replacement '{}' for {}.{} is not a type: {}",
            rule.replacement, rule.declaration, rule.field, e
        ))
    })?;

    let file = syn::parse_file(source)
        .map_err(|e| GeneratorError::CodeGenError(format!("cannot patch unparsable {} unit: {}", rule.unit, e)))?;

    let not_found = |missing| GeneratorError::PatchTargetNotFound {
        unit: rule.unit,
        declaration: rule.declaration.clone(),
        field: rule.field.clone(),
        missing,
    };

    let item = file
        .items
        .iter()
        .find_map(|item| match item {
            syn::Item::Struct(s) if s.ident == rule.declaration => Some(s),
            _ => None,
        })
        .ok_or_else(|| not_found("declaration"))?;

    let field = item
        .fields
        .iter()
        .find(|f| f.ident.as_ref().is_some_and(|ident| ident == &rule.field))
        .ok_or_else(|| not_found("field"))?;

    let (start, end) = type_range(source, &field.ty).ok_or_else(|| {
        GeneratorError::CodeGenError(format!(
            "cannot locate the type of {}.{} in the {} unit",
            rule.declaration, rule.field, rule.unit
        ))
    })?;

    let mut out = String::with_capacity(source.len() + rule.replacement.len());
    out.push_str(&source[..start]);
    out.push_str(&rule.replacement);
    out.push_str(&source[end..]);
    Ok(out)
}

/// Byte range of a parsed type within the text it was parsed from.
fn type_range(source: &str, ty: &syn::Type) -> Option<(usize, usize)> {
    let tokens = ty.to_token_stream();
    let first = tokens.clone().into_iter().next()?;
    let last = tokens.into_iter().last()?;
    let start = byte_offset(source, first.span().start())?;
    let end = byte_offset(source, last.span().end())?;
    (start <= end).then_some((start, end))
}

/// Converts a 1-based line and 0-based character column to a byte offset.
fn byte_offset(source: &str, at: LineColumn) -> Option<usize> {
    let mut line_start = 0;
    for (n, line) in source.split_inclusive('\n').enumerate() {
        if n + 1 == at.line {
            return line
                .char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(line.len()))
                .nth(at.column)
                .map(|i| line_start + i);
        }
        line_start += line.len();
    }
    None
}
