//! Call wrappers.
//!
//! Every (method, response variant) pair becomes one method on the client.
//! The raw flavour takes `Params`; the typed flavour (`...Safe`) takes a
//! reference to the method's request record.
//!
//! ```text
//! users.get / response          -> UsersGet,         UsersGetSafe
//! users.get / extendedResponse  -> UsersGetExtended, UsersGetExtendedSafe
//! ```

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use tracing::{debug, info};
use vkgen_define::{MethodDefinition, ResponseVariant};

use super::{Emitter, UnitContext, assemble_unit, doc_attrs, sanitize_ident};
use crate::casing::Caser;
use crate::errors::GeneratorError;
use crate::output::OutputUnit;

/// Emits the `methods` unit, or `methods_safe` when `safe` is set.
pub fn emit_methods(emitter: &Emitter<'_>, safe: bool) -> Result<TokenStream, GeneratorError> {
    let unit = if safe {
        OutputUnit::MethodsSafe
    } else {
        OutputUnit::Methods
    };
    let mut ctx = UnitContext::new(unit, emitter.caser(), std::iter::empty());
    let mut wrappers = Vec::new();

    for method in &emitter.schema().methods {
        for variant in &method.responses {
            wrappers.push(emit_wrapper(emitter, &mut ctx, method, variant, safe)?);
        }
    }

    info!(%unit, wrappers = wrappers.len(), "call wrappers emitted");

    let hoisted = ctx.take_hoisted();
    let client = quote! {
        impl VK {
            #(#wrappers)*
        }

        #hoisted
    };

    let imports = ctx.imports();
    let uses = if safe {
        quote! {
            use super::requests;
            use super::{Error, VK};
            #imports
        }
    } else {
        quote! {
            use super::{Error, Params, VK};
            #imports
        }
    };
    let doc = if safe {
        "Call wrappers taking request records."
    } else {
        "Call wrappers taking raw parameters."
    };
    Ok(assemble_unit(doc, uses, vec![client]))
}

fn emit_wrapper(
    emitter: &Emitter<'_>,
    ctx: &mut UnitContext<'_>,
    method: &MethodDefinition,
    variant: &ResponseVariant,
    safe: bool,
) -> Result<TokenStream, GeneratorError> {
    let unit = ctx.unit();
    let resolved = emitter
        .resolver()
        .resolve(&variant.expression)
        .map_err(|e| GeneratorError::lowering(unit, method.name.as_str(), e))?;

    let base = sanitize_ident(&emitter.caser().case(&method.name));
    let postfix = method_postfix(emitter.caser(), method, variant, resolved.named_ident());
    let response = ctx.render(&resolved, &format!("{}{}", base, postfix), "Response", &mut Vec::new());
    let extended = is_extended(variant);
    let method_name = &method.name;
    let docs = doc_attrs(method.description.as_deref());

    debug!(method = %method.name, variant = %variant.name, postfix = %postfix, extended, "emitting call wrapper");

    let wrapper = if safe {
        let fn_name = format_ident!("{}", sanitize_ident(&format!("{}{}Safe", base, postfix)));
        let request = format_ident!("{}", base);
        let body = if extended {
            quote! {
                let mut params = req.params();
                params.set("extended", true);
                self.request_unmarshal(#method_name, params)
            }
        } else {
            quote! { self.request_unmarshal(#method_name, req.params()) }
        };
        quote! {
            #docs
            pub fn #fn_name(&self, req: &requests::#request) -> Result<#response, Error> {
                #body
            }
        }
    } else {
        let fn_name = format_ident!("{}", sanitize_ident(&format!("{}{}", base, postfix)));
        if extended {
            quote! {
                #docs
                pub fn #fn_name(&self, mut params: Params) -> Result<#response, Error> {
                    params.set("extended", true);
                    self.request_unmarshal(#method_name, params)
                }
            }
        } else {
            quote! {
                #docs
                pub fn #fn_name(&self, params: Params) -> Result<#response, Error> {
                    self.request_unmarshal(#method_name, params)
                }
            }
        }
    };
    Ok(wrapper)
}

/// Suffix distinguishing the wrappers of one method.
///
/// Empty for a method with a single response or for the variant named
/// `response`. A variant named `...Response` uses its name without
/// `Response` when anything is left. The storage key lookup gets `With`.
pub fn method_postfix(
    caser: &Caser,
    method: &MethodDefinition,
    variant: &ResponseVariant,
    response_ident: Option<&str>,
) -> String {
    let mut postfix = if method.responses.len() == 1 || variant.name == "response" {
        String::new()
    } else {
        caser.case(&variant.name)
    };

    if variant.name.ends_with("Response") {
        let stripped = variant.name.replace("Response", "");
        if !stripped.is_empty() {
            postfix = caser.case(&stripped);
        }
    }

    if response_ident == Some("StorageGetWithKeysResponse") {
        postfix = format!("With{}", postfix);
    }
    postfix
}

/// Variants whose name mentions `extended` force `extended=true`.
pub fn is_extended(variant: &ResponseVariant) -> bool {
    variant.name.to_lowercase().contains("extended")
}
