//! vkgen code generator library.
//!
//! This crate lowers VK API schemas, parsed by `vkgen-define`, into Rust
//! client declarations. One run produces six module files:
//!
//! - `objects.rs` / `responses.rs` - Structs, aliases, newtypes and enum
//!   constants for every object and response definition
//! - `methods.rs` - Call wrappers on `VK` taking raw `Params`
//! - `methods_safe.rs` - Call wrappers taking request records
//! - `builders.rs` - Chained parameter builders
//! - `requests.rs` - Request records with a `params()` conversion
//!
//! The generated modules expect their parent module to provide `VK`,
//! `Params` and `Error`.
//!
//! ## Modules
//!
//! - [`casing`] - The identifier caser
//! - [`index`] - Raw name -> declared identifier index
//! - [`lowering`] - Type resolution, branch merging and enum lowering
//! - [`codegen`] - Token generation for each output unit
//! - [`patch`] - Post-emission field type overrides
//! - [`output`] - Rendering, validation, formatting and atomic writes
//! - [`config`] / [`validation`] - Run settings and their checks
//! - [`parser`] - Loading the schema documents from disk
//! - [`errors`] - Error types for the generator
//!
//! ## Example Usage
//!
//! ```no_run
//! use std::path::Path;
//! use vkgen_gen::config::GeneratorConfig;
//! use vkgen_gen::output::generate_and_write_all;
//! use vkgen_gen::parser::load_schema_dir;
//!
//! let schema = load_schema_dir(Path::new("vk-api-schema")).unwrap();
//! let config = GeneratorConfig::default();
//!
//! // dry_run=true prints every unit instead of writing it
//! let units = generate_and_write_all(&schema, &config, Path::new("generated"), true).unwrap();
//! println!("{} units", units.len());
//! ```

pub mod casing;
pub mod codegen;
pub mod config;
pub mod errors;
pub mod index;
pub mod lowering;
pub mod output;
pub mod parser;
pub mod patch;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_utils;
