//! Pre-generation validation of the configuration.
//!
//! Catches configuration mistakes before any unit is emitted, so a bad
//! patch table or rename never leaves the output directory half updated.
//!
//! ## Validation Checks
//!
//! - **Patch table**: every unit key names an output unit, declaration and
//!   field keys are identifiers, and every replacement parses as a Rust type
//! - **Forced responses**: every forced representation parses as a Rust type
//! - **Object renames**: every renamed identifier is a Rust identifier
//!
//! ## Examples
//!
//! ```
//! use vkgen_gen::config::GeneratorConfig;
//! use vkgen_gen::validation::validate_config;
//!
//! assert!(validate_config(&GeneratorConfig::default()).is_ok());
//! ```

use crate::config::GeneratorConfig;
use crate::errors::GeneratorError;
use crate::patch::rules_from_table;

/// Validates a configuration before code generation.
///
/// ## Errors
///
/// Returns `GeneratorError::ConfigError` naming the first offending entry.
pub fn validate_config(config: &GeneratorConfig) -> Result<(), GeneratorError> {
    for rule in rules_from_table(&config.patches)? {
        check_ident(&rule.declaration, "patch declaration")?;
        check_ident(&rule.field, "patch field")?;
        check_type(&rule.replacement, &format!("patch {}.{}", rule.declaration, rule.field))?;
    }

    for (response, forced) in &config.forced_responses {
        check_type(forced, &format!("forced response '{}'", response))?;
    }

    for (object, renamed) in &config.object_renames {
        check_ident(renamed, &format!("rename of '{}'", object))?;
    }

    Ok(())
}

fn check_ident(text: &str, what: &str) -> Result<(), GeneratorError> {
    syn::parse_str::<syn::Ident>(text)
        .map(|_| ())
        .map_err(|_| GeneratorError::ConfigError(format!("{} '{}' is not a Rust identifier", what, text)))
}

fn check_type(text: &str, what: &str) -> Result<(), GeneratorError> {
    syn::parse_str::<syn::Type>(text)
        .map(|_| ())
        .map_err(|e| GeneratorError::ConfigError(format!("{} '{}' is not a Rust type: {}", what, text, e)))
}
