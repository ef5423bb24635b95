//! Rendering resolved types inside one output unit.
//!
//! Rust has no anonymous record types, so every [`Composite`] met while
//! rendering is hoisted into a named struct. The struct is named after its
//! owner and the field it appears in (`PhotosPhoto` + `Sizes`), gets a
//! numeric suffix from 2 upward when that name is already used in the unit,
//! and is queued so the caller can place it right after the owner.
//!
//! Struct emission applies the optionality policy:
//!
//! - a non-empty required set makes every field outside it `Option<T>`
//! - an empty required set makes every field mandatory
//! - merged fields are already nullable and stay `Option<T>`
//! - a field referring back to a struct being defined is `Option<Box<T>>`

use std::collections::HashSet;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};

use super::{doc_attrs, ident, sanitize_ident};
use crate::casing::Caser;
use crate::lowering::{Composite, Field, Scalar, TypeDescriptor};
use crate::output::OutputUnit;

/// Per-unit rendering state.
#[derive(Debug)]
pub struct UnitContext<'c> {
    unit: OutputUnit,
    caser: &'c Caser,
    taken: HashSet<String>,
    hoisted: Vec<TokenStream>,
    uses_serde: bool,
    uses_cow: bool,
}

impl<'c> UnitContext<'c> {
    /// `declared` lists the names the unit declares at top level, so hoisted
    /// structs never collide with them.
    pub fn new(unit: OutputUnit, caser: &'c Caser, declared: impl IntoIterator<Item = String>) -> Self {
        Self {
            unit,
            caser,
            taken: declared.into_iter().collect(),
            hoisted: Vec::new(),
            uses_serde: false,
            uses_cow: false,
        }
    }

    pub fn unit(&self) -> OutputUnit {
        self.unit
    }

    pub fn caser(&self) -> &'c Caser {
        self.caser
    }

    pub fn mark_serde(&mut self) {
        self.uses_serde = true;
    }

    pub fn mark_cow(&mut self) {
        self.uses_cow = true;
    }

    /// Hoisted structs queued since the last call, in hoisting order.
    pub fn take_hoisted(&mut self) -> TokenStream {
        let items = std::mem::take(&mut self.hoisted);
        quote! { #(#items)* }
    }

    /// `use` declarations for what the rendered items needed.
    pub fn imports(&self) -> TokenStream {
        let serde = self
            .uses_serde
            .then(|| quote! { use serde::{Deserialize, Serialize}; });
        let cow = self.uses_cow.then(|| quote! { use std::borrow::Cow; });
        quote! { #serde #cow }
    }

    /// Renders a descriptor as a Rust type.
    ///
    /// `owner` and `hint` name any composite that has to be hoisted.
    /// `lineage` holds the structs currently being emitted.
    pub fn render(&mut self, ty: &TypeDescriptor, owner: &str, hint: &str, lineage: &mut Vec<String>) -> TokenStream {
        match ty {
            TypeDescriptor::Named { ident: name, kind } => {
                let name = ident(name);
                if kind.unit() == self.unit {
                    quote! { #name }
                } else {
                    let module = format_ident!("{}", kind.unit().to_string());
                    quote! { super::#module::#name }
                }
            }
            TypeDescriptor::Scalar(scalar) => render_scalar(*scalar),
            TypeDescriptor::Sequence(element) => {
                let element = self.render(element, owner, hint, lineage);
                quote! { Vec<#element> }
            }
            TypeDescriptor::Nullable(inner) => {
                let inner = self.render(inner, owner, hint, lineage);
                quote! { Option<#inner> }
            }
            TypeDescriptor::Composite(composite) => {
                let name = self.hoist(composite, &format!("{}{}", owner, hint), lineage);
                quote! { #name }
            }
            TypeDescriptor::Opaque => quote! { serde_json::Value },
        }
    }

    fn hoist(&mut self, composite: &Composite, base: &str, lineage: &mut Vec<String>) -> syn::Ident {
        let name = self.unique(sanitize_ident(base));
        let slot = self.hoisted.len();
        self.hoisted.push(TokenStream::new());
        let name = format_ident!("{}", name);
        let item = self.emit_struct(&name, composite, &[], lineage);
        self.hoisted[slot] = item;
        name
    }

    fn unique(&mut self, base: String) -> String {
        let mut candidate = base.clone();
        let mut n = 2;
        while self.taken.contains(&candidate) {
            candidate = format!("{}{}", base, n);
            n += 1;
        }
        self.taken.insert(candidate.clone());
        candidate
    }

    /// Emits a named struct for `composite`.
    pub fn emit_struct(
        &mut self,
        name: &syn::Ident,
        composite: &Composite,
        docs: &[&str],
        lineage: &mut Vec<String>,
    ) -> TokenStream {
        self.mark_serde();
        lineage.push(name.to_string());

        let owner = name.to_string();
        let mut field_names = HashSet::with_capacity(composite.fields.len());
        let fields: Vec<TokenStream> = composite
            .fields
            .iter()
            .map(|field| {
                let field_name = dedupe(sanitize_ident(&self.caser.case(&field.name)), &mut field_names);
                self.emit_field(field, &field_name, &owner, &composite.required, lineage)
            })
            .collect();

        lineage.pop();

        let docs = doc_attrs(docs.iter().copied());
        quote! {
            #docs
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            pub struct #name {
                #(#fields)*
            }
        }
    }

    fn emit_field(
        &mut self,
        field: &Field,
        field_name: &str,
        owner: &str,
        required: &[String],
        lineage: &mut Vec<String>,
    ) -> TokenStream {
        let (ty, optional) = match self.self_reference(&field.ty, lineage) {
            Some(target) => (quote! { Option<Box<#target>> }, true),
            None => {
                let rendered = self.render(&field.ty, owner, field_name, lineage);
                match &field.ty {
                    TypeDescriptor::Nullable(_) => (rendered, true),
                    _ if !required.is_empty() && !required.contains(&field.name) => {
                        (quote! { Option<#rendered> }, true)
                    }
                    _ => (rendered, false),
                }
            }
        };

        let schema_name = &field.name;
        let serde = if optional {
            quote! { #[serde(rename = #schema_name, default, skip_serializing_if = "Option::is_none")] }
        } else {
            quote! { #[serde(rename = #schema_name)] }
        };
        let docs = doc_attrs(field.description.as_deref());
        let field_ident = format_ident!("{}", field_name);

        quote! {
            #docs
            #serde
            pub #field_ident: #ty,
        }
    }

    /// The rendered target when `ty` points at a struct being emitted.
    fn self_reference(&self, ty: &TypeDescriptor, lineage: &[String]) -> Option<TokenStream> {
        let named = match ty {
            TypeDescriptor::Nullable(inner) => inner.as_ref(),
            other => other,
        };
        match named {
            TypeDescriptor::Named { ident: name, kind }
                if kind.unit() == self.unit && lineage.contains(&sanitize_ident(name)) =>
            {
                let name = ident(name);
                Some(quote! { #name })
            }
            _ => None,
        }
    }
}

pub fn render_scalar(scalar: Scalar) -> TokenStream {
    match scalar {
        Scalar::Integer => quote! { i64 },
        Scalar::Float => quote! { f64 },
        Scalar::String => quote! { String },
        Scalar::Boolean => quote! { bool },
    }
}

fn dedupe(base: String, seen: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut n = 2;
    while !seen.insert(candidate.clone()) {
        candidate = format!("{}{}", base, n);
        n += 1;
    }
    candidate
}
