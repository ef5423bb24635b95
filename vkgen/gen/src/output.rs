//! Output assembly and file writing for generated code.
//!
//! Every output unit goes through the same stages:
//!
//! 1. emit tokens with the [`Emitter`]
//! 2. render them to text behind the provenance banner
//! 3. apply the unit's patch rules
//! 4. validate the patched text by parsing it with `syn`
//! 5. format with `prettyplease`, unless formatting is disabled
//!
//! ## Output Structure
//!
//! ```text
//! generated/
//! ├── objects.rs
//! ├── responses.rs
//! ├── methods.rs
//! ├── methods_safe.rs
//! ├── builders.rs
//! └── requests.rs
//! ```
//!
//! ## Safety Guarantees
//!
//! - **All-or-nothing**: files are written only after every unit has passed
//!   every stage; the first failing unit stops the run
//! - **Atomic writes**: temp file + rename, so no file is ever half written

use std::fs;
use std::path::Path;

use proc_macro2::TokenStream;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use tracing::{debug, info};
use vkgen_define::SchemaSet;

use crate::codegen::Emitter;
use crate::config::GeneratorConfig;
use crate::errors::GeneratorError;
use crate::patch::{PatchRule, apply_patches, rules_from_table};

/// Provenance banner at the top of every generated file.
pub const BANNER: &str = "// Code generated by vkgen; DO NOT EDIT.";

/// One generated module file, in generation order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString,
)]
#[strum(serialize_all = "snake_case")]
pub enum OutputUnit {
    Objects,
    Responses,
    Methods,
    MethodsSafe,
    Builders,
    Requests,
}

impl OutputUnit {
    /// File name of the unit, e.g. `methods_safe.rs`.
    pub fn file_name(self) -> String {
        format!("{}.rs", self)
    }
}

/// A finished unit, ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedUnit {
    pub unit: OutputUnit,
    pub content: String,
}

/// Renders emitted tokens as unformatted text behind the banner.
pub fn render_unit(tokens: &TokenStream) -> String {
    format!("{}\n\n{}\n", BANNER, tokens)
}

/// Validates generated source text using syn.
///
/// ## Errors
///
/// Returns `GeneratorError::CodeGenError` if the text fails to parse.
pub fn validate_code(source: &str) -> Result<syn::File, GeneratorError> {
    syn::parse_file(source)
        .map_err(|e| GeneratorError::CodeGenError(format!("Generated code is invalid: {}", e)))
}

/// Formats a parsed unit with prettyplease and re-attaches the banner.
pub fn format_code(file: &syn::File) -> String {
    format!("{}\n\n{}", BANNER, prettyplease::unparse(file))
}

/// Writes content to a file atomically using temp file + rename.
///
/// ## Errors
///
/// Returns `GeneratorError::WriteError` if the parent directory cannot be
/// created, the temp file cannot be written, or the rename fails.
pub fn write_atomic(path: &Path, content: &str) -> Result<(), GeneratorError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| GeneratorError::WriteError {
            path: parent.display().to_string(),
            source: e,
        })?;
    }

    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).map_err(|e| GeneratorError::WriteError {
        path: temp_path.display().to_string(),
        source: e,
    })?;

    fs::rename(&temp_path, path).map_err(|e| GeneratorError::WriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

/// Runs every stage for one unit and returns its final text.
///
/// ## Errors
///
/// Lowering failures, unmatched patch rules and invalid generated code.
pub fn generate_unit(
    emitter: &Emitter<'_>,
    unit: OutputUnit,
    rules: &[PatchRule],
) -> Result<GeneratedUnit, GeneratorError> {
    info!(%unit, "generating unit");
    let tokens = emitter.emit(unit)?;
    let rendered = render_unit(&tokens);
    let patched = apply_patches(&rendered, unit, rules)?;
    let file = validate_code(&patched)?;

    let content = if emitter.config().format {
        format_code(&file)
    } else {
        patched
    };

    debug!(%unit, bytes = content.len(), "unit generated");
    Ok(GeneratedUnit { unit, content })
}

/// Generates every unit in order without touching the filesystem.
///
/// ## Errors
///
/// The first failing unit's error; later units are not attempted.
pub fn generate_all(
    schema: &SchemaSet,
    config: &GeneratorConfig,
) -> Result<Vec<GeneratedUnit>, GeneratorError> {
    let emitter = Emitter::new(schema, config)?;
    let rules = rules_from_table(&config.patches)?;
    OutputUnit::iter()
        .map(|unit| generate_unit(&emitter, unit, &rules))
        .collect()
}

/// Generates and writes all units to the output directory.
///
/// Units are produced in the fixed order of [`OutputUnit`]. Nothing is
/// written until every unit has been generated, so a failing unit leaves
/// the output directory untouched.
///
/// ## Arguments
///
/// * `schema` - Parsed objects, responses and methods
/// * `config` - Generation settings
/// * `output_dir` - Directory to write generated files to
/// * `dry_run` - If true, print code instead of writing files
///
/// ## Returns
///
/// The generated units (useful for dry-run mode or testing).
///
/// ## Errors
///
/// Returns an error if:
/// - A definition cannot be lowered
/// - A patch rule does not match
/// - Code generation produces invalid Rust
/// - File writing fails
pub fn generate_and_write_all(
    schema: &SchemaSet,
    config: &GeneratorConfig,
    output_dir: &Path,
    dry_run: bool,
) -> Result<Vec<GeneratedUnit>, GeneratorError> {
    let generated = generate_all(schema, config)?;

    for result in &generated {
        if dry_run {
            println!("=== {} ===\n{}\n", result.unit.file_name(), result.content);
        } else {
            let path = output_dir.join(result.unit.file_name());
            write_atomic(&path, &result.content)?;
            info!(unit = %result.unit, path = %path.display(), bytes = result.content.len(), "unit written");
        }
    }

    Ok(generated)
}
