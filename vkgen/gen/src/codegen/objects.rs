//! Object and response declarations.
//!
//! One declaration per named definition, in document order:
//!
//! | Definition | Declaration |
//! |---|---|
//! | enum | transparent newtype plus one `pub const` per value |
//! | `allOf` / `oneOf` | struct of merged fields, branches listed in its docs |
//! | object with properties | struct |
//! | built-in (scalar, sequence of scalars) | `pub type` alias |
//! | anything else | transparent newtype |
//! | forced response | `pub type` alias to the configured type |

use proc_macro2::{Literal, TokenStream};
use quote::quote;
use tracing::{debug, info};
use vkgen_define::{ExprKind, NamedDefinition};

use super::types::render_scalar;
use super::{Emitter, UnitContext, assemble_unit, doc_attrs, ident, sanitize_ident};
use crate::errors::GeneratorError;
use crate::index::DefinitionKind;
use crate::lowering::{EnumLiteral, LoweredEnum, Scalar, TypeDescriptor, lower_enum};

/// Emits the `objects` or `responses` unit.
pub fn emit_definitions(emitter: &Emitter<'_>, kind: DefinitionKind) -> Result<TokenStream, GeneratorError> {
    let unit = kind.unit();
    let definitions = match kind {
        DefinitionKind::Object => &emitter.schema().objects,
        DefinitionKind::Response => &emitter.schema().responses,
    };

    // A definition repeating an earlier name in the same document is skipped.
    let owned: Vec<(&NamedDefinition, &str)> = definitions
        .iter()
        .filter_map(|definition| {
            let entry = emitter.index().get(kind, &definition.name)?;
            std::ptr::eq(entry.definition, definition).then_some((definition, entry.ident.as_str()))
        })
        .collect();

    let mut ctx = UnitContext::new(
        unit,
        emitter.caser(),
        owned.iter().map(|(_, declared)| sanitize_ident(declared)),
    );

    let mut items = Vec::with_capacity(owned.len());
    for (definition, declared) in &owned {
        debug!(%unit, name = %definition.name, ident = %declared, "emitting definition");
        let item = emit_definition(emitter, &mut ctx, definition, declared)?;
        let hoisted = ctx.take_hoisted();
        items.push(quote! { #item #hoisted });
    }

    info!(%unit, declarations = items.len(), "definitions emitted");

    let doc = match kind {
        DefinitionKind::Object => "Object types.",
        DefinitionKind::Response => "Response types.",
    };
    Ok(assemble_unit(doc, ctx.imports(), items))
}

fn emit_definition(
    emitter: &Emitter<'_>,
    ctx: &mut UnitContext<'_>,
    definition: &NamedDefinition,
    declared: &str,
) -> Result<TokenStream, GeneratorError> {
    let unit = ctx.unit();
    let lower = |source| GeneratorError::lowering(unit, definition.name.as_str(), source);
    let name = ident(declared);
    let description = definition.description.as_deref();

    if unit == DefinitionKind::Response.unit()
        && let Some(forced) = emitter.config().forced_responses.get(&definition.name)
    {
        let ty: syn::Type = syn::parse_str(forced).map_err(|e| {
            GeneratorError::CodeGenError(format!("forced type '{}' for '{}': {}", forced, definition.name, e))
        })?;
        let docs = doc_attrs(description);
        return Ok(quote! {
            #docs
            pub type #name = #ty;
        });
    }

    if let ExprKind::Enum(expr) = &definition.expression.kind {
        let lowered = lower_enum(declared, expr, emitter.caser()).map_err(lower)?;
        return Ok(emit_enum(ctx, &name, &lowered, description));
    }

    let resolved = emitter.resolver().resolve(&definition.expression).map_err(lower)?;
    let mut lineage = Vec::new();
    match resolved {
        TypeDescriptor::Composite(composite) => {
            let mut docs: Vec<String> = description.map(str::to_string).into_iter().collect();
            if !composite.origins.is_empty() {
                if !docs.is_empty() {
                    docs.push(String::new());
                }
                docs.push("Composed from:".to_string());
                docs.extend(composite.origins.iter().map(|origin| format!("- `{}`", origin)));
            }
            let docs: Vec<&str> = docs.iter().map(String::as_str).collect();
            Ok(ctx.emit_struct(&name, &composite, &docs, &mut lineage))
        }
        other => Ok(emit_alias(ctx, &name, &other, description, &mut lineage)),
    }
}

/// `pub type` for built-in types, a transparent newtype otherwise.
fn emit_alias(
    ctx: &mut UnitContext<'_>,
    name: &syn::Ident,
    ty: &TypeDescriptor,
    description: Option<&str>,
    lineage: &mut Vec<String>,
) -> TokenStream {
    let docs = doc_attrs(description);
    lineage.push(name.to_string());
    let rendered = ctx.render(ty, &name.to_string(), "Item", lineage);
    lineage.pop();

    if ty.is_builtin() {
        quote! {
            #docs
            pub type #name = #rendered;
        }
    } else {
        ctx.mark_serde();
        quote! {
            #docs
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct #name(pub #rendered);
        }
    }
}

fn emit_enum(ctx: &mut UnitContext<'_>, name: &syn::Ident, lowered: &LoweredEnum, description: Option<&str>) -> TokenStream {
    ctx.mark_serde();
    let inner = match lowered.underlying {
        Scalar::String => {
            ctx.mark_cow();
            quote! { Cow<'static, str> }
        }
        other => render_scalar(other),
    };

    let constants = lowered.constants.iter().map(|constant| {
        let const_name = ident(&constant.ident);
        let value = match &constant.literal {
            EnumLiteral::Integer(i) => {
                let lit = Literal::i64_unsuffixed(*i);
                quote! { #lit }
            }
            EnumLiteral::Float(f) => {
                let lit = Literal::f64_unsuffixed(*f);
                quote! { #lit }
            }
            EnumLiteral::String(s) => quote! { Cow::Borrowed(#s) },
        };
        quote! {
            pub const #const_name: #name = #name(#value);
        }
    });

    let docs = doc_attrs(description);
    quote! {
        #docs
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct #name(pub #inner);

        #(#constants)*
    }
}
