//! Chained parameter builders.
//!
//! `users.get` becomes `UsersGetBuilder`, a thin wrapper over `Params` with
//! one consuming setter per parameter:
//!
//! ```ignore
//! let params = UsersGetBuilder::new().UserIDs(["1"]).Count(10).params;
//! ```

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use tracing::info;
use vkgen_define::MethodDefinition;

use super::{Emitter, UnitContext, assemble_unit, doc_attrs, sanitize_ident};
use crate::errors::GeneratorError;
use crate::output::OutputUnit;

/// Emits the `builders` unit.
pub fn emit_builders(emitter: &Emitter<'_>) -> Result<TokenStream, GeneratorError> {
    let unit = OutputUnit::Builders;
    let methods = &emitter.schema().methods;
    let declared: Vec<String> = methods.iter().map(|m| builder_name(emitter, m)).collect();
    let mut ctx = UnitContext::new(unit, emitter.caser(), declared);

    let mut items = Vec::with_capacity(methods.len());
    for method in methods {
        let item = emit_builder(emitter, &mut ctx, method)?;
        let hoisted = ctx.take_hoisted();
        items.push(quote! { #item #hoisted });
    }

    info!(%unit, builders = items.len(), "builders emitted");

    let imports = ctx.imports();
    let uses = quote! {
        use super::Params;
        #imports
    };
    Ok(assemble_unit("Request parameter builders.", uses, items))
}

fn builder_name(emitter: &Emitter<'_>, method: &MethodDefinition) -> String {
    sanitize_ident(&format!("{}Builder", emitter.caser().case(&method.name)))
}

fn emit_builder(
    emitter: &Emitter<'_>,
    ctx: &mut UnitContext<'_>,
    method: &MethodDefinition,
) -> Result<TokenStream, GeneratorError> {
    let unit = ctx.unit();
    let name = builder_name(emitter, method);
    let builder = format_ident!("{}", name);

    let mut setters = Vec::with_capacity(method.parameters.len());
    for parameter in &method.parameters {
        let resolved = emitter
            .resolver()
            .resolve(&parameter.expression)
            .map_err(|e| GeneratorError::lowering(unit, method.name.as_str(), e))?;

        let setter_name = sanitize_ident(&emitter.caser().case(&parameter.name));
        let setter = format_ident!("{}", setter_name);
        let key = &parameter.name;
        let docs = doc_attrs(parameter.description.as_deref());

        let (depth, element) = resolved.sequence_depth();
        let setter = if depth == 1 {
            let element = ctx.render(element, &name, &setter_name, &mut Vec::new());
            quote! {
                #docs
                pub fn #setter(mut self, v: impl IntoIterator<Item = #element>) -> Self {
                    self.params.set(#key, v.into_iter().collect::<Vec<_>>());
                    self
                }
            }
        } else {
            let ty = ctx.render(&resolved, &name, &setter_name, &mut Vec::new());
            quote! {
                #docs
                pub fn #setter(mut self, v: #ty) -> Self {
                    self.params.set(#key, v);
                    self
                }
            }
        };
        setters.push(setter);
    }

    let header = format!("{} builder.", name);
    let link = format!("https://vk.com/dev/{}", method.name);
    let docs = doc_attrs(
        [Some(header.as_str()), Some(""), method.description.as_deref(), Some(""), Some(link.as_str())]
            .into_iter()
            .flatten(),
    );

    Ok(quote! {
        #docs
        #[derive(Debug, Clone)]
        pub struct #builder {
            pub params: Params,
        }

        impl #builder {
            pub fn new() -> Self {
                Self { params: Params::new() }
            }

            #(#setters)*
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::test_utils::{make_sample_schema, pretty};

    fn emit() -> String {
        let schema = make_sample_schema();
        let config = GeneratorConfig::default();
        let emitter = Emitter::new(&schema, &config).unwrap();
        pretty(emitter.emit(OutputUnit::Builders).unwrap())
    }

    #[test]
    fn one_builder_per_method() {
        let code = emit();
        assert!(code.contains("pub struct UsersGetBuilder {"));
        assert!(code.contains("pub struct AccountBanBuilder {"));
        assert!(code.contains("pub struct MessagesDeleteBuilder {"));
        assert!(code.contains("pub params: Params,"));
        assert!(code.contains("Self { params: Params::new() }"));
    }

    #[test]
    fn docs_link_the_method_page() {
        let code = emit();
        assert!(code.contains("/// UsersGetBuilder builder."));
        assert!(code.contains("/// https://vk.com/dev/users.get"));
    }

    #[test]
    fn scalar_setters_take_the_value() {
        let code = emit();
        assert!(code.contains("pub fn Count(mut self, v: i64) -> Self {"));
        assert!(code.contains("self.params.set(\"count\", v);"));
        assert!(code.contains("pub fn Extended(mut self, v: bool) -> Self {"));
    }

    #[test]
    fn sequence_setters_take_iterators() {
        let code = emit();
        assert!(code.contains("pub fn UserIDs(mut self, v: impl IntoIterator<Item = String>) -> Self {"));
        assert!(code.contains("v.into_iter().collect::<Vec<_>>()"));
    }

    #[test]
    fn object_parameters_come_from_the_objects_module() {
        let code = emit();
        assert!(code.contains("v: impl IntoIterator<Item = super::objects::UsersFields>"));
        assert!(code.contains("pub fn Owner(mut self, v: super::objects::Message) -> Self {"));
    }
}
