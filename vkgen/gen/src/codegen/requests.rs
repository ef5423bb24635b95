//! Request records.
//!
//! `users.get` becomes `pub struct UsersGet` with one field per parameter
//! and a `params()` method. A field is sent only when set: a non-empty
//! sequence or string, a `true` flag, a non-zero number or a `Some`.

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use tracing::info;
use vkgen_define::MethodDefinition;

use super::{Emitter, UnitContext, assemble_unit, doc_attrs, sanitize_ident};
use crate::errors::GeneratorError;
use crate::lowering::{Scalar, TypeDescriptor};
use crate::output::OutputUnit;

/// Emits the `requests` unit.
pub fn emit_requests(emitter: &Emitter<'_>) -> Result<TokenStream, GeneratorError> {
    let unit = OutputUnit::Requests;
    let methods = &emitter.schema().methods;
    let declared: Vec<String> = methods
        .iter()
        .map(|m| sanitize_ident(&emitter.caser().case(&m.name)))
        .collect();
    let mut ctx = UnitContext::new(unit, emitter.caser(), declared);

    let mut items = Vec::with_capacity(methods.len());
    for method in methods {
        let item = emit_request(emitter, &mut ctx, method)?;
        let hoisted = ctx.take_hoisted();
        items.push(quote! { #item #hoisted });
    }

    info!(%unit, requests = items.len(), "request records emitted");

    let imports = ctx.imports();
    let uses = quote! {
        use super::Params;
        #imports
    };
    Ok(assemble_unit("Request records.", uses, items))
}

fn emit_request(
    emitter: &Emitter<'_>,
    ctx: &mut UnitContext<'_>,
    method: &MethodDefinition,
) -> Result<TokenStream, GeneratorError> {
    let unit = ctx.unit();
    let name = sanitize_ident(&emitter.caser().case(&method.name));
    let record = format_ident!("{}", name);

    let mut fields = Vec::with_capacity(method.parameters.len());
    let mut setters = Vec::with_capacity(method.parameters.len());
    let mut seen = HashSet::new();

    for parameter in &method.parameters {
        let resolved = emitter
            .resolver()
            .resolve(&parameter.expression)
            .map_err(|e| GeneratorError::lowering(unit, method.name.as_str(), e))?;

        let base = sanitize_ident(&emitter.caser().case(&parameter.name));
        let mut field_name = base.clone();
        let mut n = 2;
        while !seen.insert(field_name.clone()) {
            field_name = format!("{}{}", base, n);
            n += 1;
        }
        let field = format_ident!("{}", field_name);
        let key = &parameter.name;

        let rendered = ctx.render(&resolved, &name, &field_name, &mut Vec::new());
        let (ty, setter) = match &resolved {
            TypeDescriptor::Sequence(_) => (
                rendered,
                quote! { if !self.#field.is_empty() { params.set(#key, &self.#field); } },
            ),
            TypeDescriptor::Scalar(Scalar::Boolean) => (
                rendered,
                quote! { if self.#field { params.set(#key, self.#field); } },
            ),
            TypeDescriptor::Scalar(Scalar::String) => (
                rendered,
                quote! { if !self.#field.is_empty() { params.set(#key, &self.#field); } },
            ),
            TypeDescriptor::Scalar(Scalar::Integer) => (
                rendered,
                quote! { if self.#field != 0 { params.set(#key, self.#field); } },
            ),
            TypeDescriptor::Scalar(Scalar::Float) => (
                rendered,
                quote! { if self.#field != 0.0 { params.set(#key, self.#field); } },
            ),
            _ => (
                quote! { Option<#rendered> },
                quote! { if let Some(v) = &self.#field { params.set(#key, v); } },
            ),
        };

        let docs = doc_attrs(parameter.description.as_deref());
        fields.push(quote! {
            #docs
            pub #field: #ty,
        });
        setters.push(setter);
    }

    let header = format!("{}.", name);
    let link = format!("https://vk.com/dev/{}", method.name);
    let docs = doc_attrs(
        [Some(header.as_str()), Some(""), method.description.as_deref(), Some(""), Some(link.as_str())]
            .into_iter()
            .flatten(),
    );

    let binding = if setters.is_empty() {
        quote! { let params = Params::new(); }
    } else {
        quote! { let mut params = Params::new(); }
    };

    Ok(quote! {
        #docs
        #[derive(Debug, Clone, Default)]
        pub struct #record {
            #(#fields)*
        }

        impl #record {
            pub fn params(&self) -> Params {
                #binding
                #(#setters)*
                params
            }
        }
    })
}
