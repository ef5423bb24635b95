//! Code generation for the six output units.
//!
//! The [`Emitter`] owns everything one generation run needs: the parsed
//! schema, the configuration, the caser and the name index. Each unit is
//! produced by its own submodule:
//!
//! - [`objects`] - Object and response declarations (structs, aliases,
//!   newtypes, enum constants)
//! - [`methods`] - Call wrappers, raw (`methods`) and typed (`methods_safe`)
//! - [`builders`] - Chained parameter builders
//! - [`requests`] - Request records with a `params()` conversion
//! - [`types`] - Type rendering, struct emission and composite hoisting
//!   shared by all of the above
//!
//! ## Output Format
//!
//! All generators return `proc_macro2::TokenStream`, which is then rendered,
//! patched, validated with `syn` and formatted with `prettyplease`. See
//! [`crate::output`] for those stages.

pub mod builders;
pub mod methods;
pub mod objects;
pub mod requests;
pub mod types;

use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use tracing::info;
use vkgen_define::SchemaSet;

use crate::casing::Caser;
use crate::config::GeneratorConfig;
use crate::errors::GeneratorError;
use crate::index::{DefinitionKind, SchemaIndex};
use crate::lowering::Resolver;
use crate::output::OutputUnit;
use crate::validation::validate_config;

pub use types::UnitContext;

/// Reserved words that cannot be plain identifiers, including `gen` (2024).
const KEYWORDS: &[&str] = &[
    "Self", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv",
    "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Generates declarations for one schema under one configuration.
///
/// ## Examples
///
/// ```
/// use vkgen_define::{BaseKind, Expression, NamedDefinition, SchemaSet};
/// use vkgen_gen::codegen::Emitter;
/// use vkgen_gen::config::GeneratorConfig;
/// use vkgen_gen::output::OutputUnit;
///
/// let schema = SchemaSet {
///     objects: vec![NamedDefinition::new("base_bool_int", Expression::base(BaseKind::Integer))],
///     ..SchemaSet::default()
/// };
/// let config = GeneratorConfig {
///     patches: Default::default(),
///     ..GeneratorConfig::default()
/// };
///
/// let emitter = Emitter::new(&schema, &config).unwrap();
/// let tokens = emitter.emit(OutputUnit::Objects).unwrap();
/// assert!(tokens.to_string().contains("pub type BaseBoolInt = i64"));
/// ```
#[derive(Debug)]
pub struct Emitter<'a> {
    schema: &'a SchemaSet,
    config: &'a GeneratorConfig,
    caser: Caser,
    index: SchemaIndex<'a>,
}

impl<'a> Emitter<'a> {
    /// Validates `config` and indexes `schema`.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` for an invalid configuration.
    pub fn new(schema: &'a SchemaSet, config: &'a GeneratorConfig) -> Result<Self, GeneratorError> {
        validate_config(config)?;
        let caser = Caser::new(config.casing);
        let index = SchemaIndex::build(schema, &caser, config);
        Ok(Self {
            schema,
            config,
            caser,
            index,
        })
    }

    pub fn schema(&self) -> &'a SchemaSet {
        self.schema
    }

    pub fn config(&self) -> &'a GeneratorConfig {
        self.config
    }

    pub fn caser(&self) -> &Caser {
        &self.caser
    }

    pub fn index(&self) -> &SchemaIndex<'a> {
        &self.index
    }

    pub fn resolver(&self) -> Resolver<'_, 'a> {
        Resolver::new(&self.index)
    }

    /// Emits the token stream of one unit.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::Lowering` naming the first definition or
    /// method that cannot be lowered.
    pub fn emit(&self, unit: OutputUnit) -> Result<TokenStream, GeneratorError> {
        let tokens = match unit {
            OutputUnit::Objects => objects::emit_definitions(self, DefinitionKind::Object)?,
            OutputUnit::Responses => objects::emit_definitions(self, DefinitionKind::Response)?,
            OutputUnit::Methods => methods::emit_methods(self, false)?,
            OutputUnit::MethodsSafe => methods::emit_methods(self, true)?,
            OutputUnit::Builders => builders::emit_builders(self)?,
            OutputUnit::Requests => requests::emit_requests(self)?,
        };
        info!(%unit, "unit emitted");
        Ok(tokens)
    }
}

/// Makes `name` a legal Rust identifier.
///
/// Non-ASCII-alphanumeric characters become `_`, a leading digit gets a `_`
/// prefix and reserved words get a `_` suffix.
///
/// ## Examples
///
/// ```
/// use vkgen_gen::codegen::sanitize_ident;
///
/// assert_eq!(sanitize_ident("UsersGet"), "UsersGet");
/// assert_eq!(sanitize_ident("2fa"), "_2fa");
/// assert_eq!(sanitize_ident("type"), "type_");
/// assert_eq!(sanitize_ident("BaseSex-1"), "BaseSex_1");
/// ```
pub fn sanitize_ident(name: &str) -> String {
    let mut out: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    if KEYWORDS.contains(&out.as_str()) {
        out.push('_');
    }
    if out.is_empty() || out == "_" {
        out = "__".to_string();
    }
    out
}

/// A sanitized identifier token.
pub fn ident(name: &str) -> syn::Ident {
    format_ident!("{}", sanitize_ident(name))
}

/// One `#[doc]` attribute per line; an empty string yields a blank line.
pub fn doc_attrs<'t>(lines: impl IntoIterator<Item = &'t str>) -> TokenStream {
    let attrs = lines.into_iter().flat_map(|text| text.split('\n')).map(|line| {
        let line = if line.trim().is_empty() {
            String::new()
        } else {
            format!(" {}", line.trim_end())
        };
        quote! { #[doc = #line] }
    });
    quote! { #(#attrs)* }
}

/// Wraps unit items with the module doc, lint allowances and imports.
pub(crate) fn assemble_unit(doc: &str, uses: TokenStream, items: Vec<TokenStream>) -> TokenStream {
    let doc = format!(" {}", doc);
    quote! {
        #![doc = #doc]
        #![allow(non_snake_case, non_camel_case_types, non_upper_case_globals)]

        #uses

        #(#items)*
    }
}
