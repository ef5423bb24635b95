//! Branch merging for `allOf`/`oneOf` compositions.
//!
//! The merger flattens every branch into one name -> contributions table,
//! then reconciles each name independently:
//!
//! - one contribution, or several that are structurally equal: the field
//!   takes the first contribution's resolved type;
//! - several that disagree: the field is opaque and decoded dynamically.
//!
//! Every merged field is nullable, since no branch guarantees presence.
//! Fields come out sorted by name so output is stable across runs.

use std::collections::BTreeMap;

use tracing::debug;
use vkgen_define::{ExprKind, Expression, Property, Reference};

use super::resolve::Resolver;
use super::{Composite, Field, TypeDescriptor};
use crate::errors::LoweringError;

type Contributions<'e> = BTreeMap<&'e str, Vec<&'e Expression>>;

impl<'i, 'a> Resolver<'i, 'a> {
    /// Merges the branches of one composition into a composite.
    ///
    /// ## Errors
    ///
    /// - [`LoweringError::ReferenceToReference`] when a branch refers to a
    ///   definition that is itself a bare reference
    /// - [`LoweringError::EmptyInlineBranch`] for an inline branch with no
    ///   properties
    /// - [`LoweringError::EmptyMerge`] when no branch contributes a field
    /// - [`LoweringError::CyclicComposition`] when referenced compositions
    ///   lead back to one already being flattened
    pub fn merge<'e>(&self, branches: &'e [Expression]) -> Result<Composite, LoweringError>
    where
        'a: 'e,
    {
        let mut contributions = Contributions::new();
        let mut visiting = Vec::new();
        self.flatten(branches, &mut contributions, &mut visiting)?;

        if contributions.is_empty() {
            return Err(LoweringError::EmptyMerge);
        }

        let mut fields = Vec::with_capacity(contributions.len());
        for (name, exprs) in contributions {
            let first = exprs[0];
            let agree = exprs.windows(2).all(|pair| pair[0].structurally_equal(pair[1]));
            let ty = if agree {
                self.resolve(first)?
            } else {
                debug!(field = name, contributions = exprs.len(), "branches disagree, field is opaque");
                TypeDescriptor::Opaque
            };
            fields.push(Field {
                name: name.to_string(),
                ty: TypeDescriptor::nullable(ty),
                description: first.description.clone(),
            });
        }

        Ok(Composite {
            fields,
            required: Vec::new(),
            origins: branches.iter().map(origin).collect(),
        })
    }

    fn flatten<'e>(
        &self,
        branches: &'e [Expression],
        contributions: &mut Contributions<'e>,
        visiting: &mut Vec<&'e Reference>,
    ) -> Result<(), LoweringError>
    where
        'a: 'e,
    {
        for (index, branch) in branches.iter().enumerate() {
            match &branch.kind {
                ExprKind::Ref(target) => {
                    let definition = self.index.lookup(target)?.definition;
                    match &definition.expression.kind {
                        ExprKind::AllOf(inner) | ExprKind::OneOf(inner) => {
                            if visiting.contains(&target) {
                                return Err(LoweringError::CyclicComposition {
                                    name: target.name.clone(),
                                });
                            }
                            visiting.push(target);
                            self.flatten(inner, contributions, visiting)?;
                            visiting.pop();
                        }
                        ExprKind::Ref(next) => {
                            return Err(LoweringError::ReferenceToReference {
                                branch: target.name.clone(),
                                target: next.name.clone(),
                            });
                        }
                        ExprKind::Object(shape) => accumulate(contributions, &shape.properties),
                        _ => debug!(branch = %target.name, "referenced branch contributes no properties"),
                    }
                }
                ExprKind::Object(shape) if !shape.properties.is_empty() => {
                    accumulate(contributions, &shape.properties)
                }
                ExprKind::AllOf(inner) | ExprKind::OneOf(inner) => {
                    self.flatten(inner, contributions, visiting)?
                }
                _ => return Err(LoweringError::EmptyInlineBranch { index }),
            }
        }
        Ok(())
    }
}

fn accumulate<'e>(contributions: &mut Contributions<'e>, properties: &'e [Property]) {
    for property in properties {
        contributions
            .entry(property.name.as_str())
            .or_default()
            .push(&property.expr);
    }
}

/// A short description of where a branch came from.
fn origin(branch: &Expression) -> String {
    match &branch.kind {
        ExprKind::Ref(target) => target.name.clone(),
        ExprKind::Object(shape) => {
            let names: Vec<&str> = shape.properties.iter().map(|p| p.name.as_str()).collect();
            format!("{{ {} }}", names.join(", "))
        }
        ExprKind::AllOf(inner) => format!("allOf[{}]", inner.iter().map(origin).collect::<Vec<_>>().join(", ")),
        ExprKind::OneOf(inner) => format!("oneOf[{}]", inner.iter().map(origin).collect::<Vec<_>>().join(", ")),
        other => format!("{:?}", other),
    }
}
