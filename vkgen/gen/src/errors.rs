//! Error types for the vkgen generator.

use thiserror::Error;

use crate::output::OutputUnit;

/// Structural problems in the schema that make lowering impossible.
///
/// Each of these aborts the unit being generated.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoweringError {
    /// A composition branch references a definition that is itself a reference.
    #[error("branch references '{branch}', which is a reference to '{target}'")]
    ReferenceToReference {
        /// The definition the branch points at.
        branch: String,
        /// Where that definition points in turn.
        target: String,
    },

    /// An inline composition branch has no properties to contribute.
    #[error("inline branch #{index} has no properties")]
    EmptyInlineBranch {
        /// Zero-based position of the branch in its composition.
        index: usize,
    },

    /// Flattening every branch produced no fields at all.
    #[error("composition has no fields across any of its branches")]
    EmptyMerge,

    /// A composition reaches itself again through its referenced branches.
    #[error("composition through '{name}' is cyclic")]
    CyclicComposition { name: String },

    /// Enums may only be integer, number or string.
    #[error("enum base kind '{kind}' is not one of integer, number, string")]
    UnsupportedEnumKind { kind: String },

    /// An enum value does not match its declared base kind.
    #[error("enum value '{value}' at position {index} is not a valid {kind}")]
    EnumValueMismatch {
        index: usize,
        value: String,
        kind: String,
    },

    /// A reference names a definition that is not in the schema.
    #[error("reference to unknown definition '{name}'")]
    UnresolvedReference { name: String },
}

/// Errors that can occur during code generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// A definition could not be lowered
    #[error("[{unit}] failed to lower '{entity}': {source}")]
    Lowering {
        unit: OutputUnit,
        entity: String,
        #[source]
        source: LoweringError,
    },

    /// A configured patch rule did not match the emitted code
    #[error("[{unit}] patch target '{declaration}.{field}' not found: no such {missing}")]
    PatchTargetNotFound {
        unit: OutputUnit,
        declaration: String,
        field: String,
        /// Which part of the target was absent ("declaration" or "field").
        missing: &'static str,
    },

    /// Failed to read a schema document
    #[error("Failed to read schema document '{path}': {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse a schema document
    #[error("Failed to parse schema document '{path}': {source}")]
    ParseError {
        path: String,
        #[source]
        source: vkgen_define::DocumentError,
    },

    /// Generated code is not valid Rust
    #[error("Code generation failed: {0}")]
    CodeGenError(String),

    /// Failed to write output file
    #[error("Failed to write output file '{path}': {source}")]
    WriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    ConfigError(String),
}

impl GeneratorError {
    /// Wraps a lowering failure with the unit and entity it occurred in.
    pub fn lowering(unit: OutputUnit, entity: impl Into<String>, source: LoweringError) -> Self {
        GeneratorError::Lowering {
            unit,
            entity: entity.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowering_error_names_unit_entity_and_rule() {
        let err = GeneratorError::lowering(
            OutputUnit::Objects,
            "notifications_notification_parent",
            LoweringError::ReferenceToReference {
                branch: "wall_wallpost_to_id".into(),
                target: "wall_wallpost".into(),
            },
        );
        let msg = err.to_string();
        assert!(msg.contains("[objects]"));
        assert!(msg.contains("notifications_notification_parent"));
        assert!(msg.contains("wall_wallpost_to_id"));
    }

    #[test]
    fn patch_error_names_missing_part() {
        let err = GeneratorError::PatchTargetNotFound {
            unit: OutputUnit::Objects,
            declaration: "Foo".into(),
            field: "Bar".into(),
            missing: "declaration",
        };
        assert_eq!(
            err.to_string(),
            "[objects] patch target 'Foo.Bar' not found: no such declaration"
        );
    }

    #[test]
    fn lowering_errors_are_comparable() {
        assert_eq!(LoweringError::EmptyMerge, LoweringError::EmptyMerge);
        assert_ne!(
            LoweringError::EmptyInlineBranch { index: 0 },
            LoweringError::EmptyInlineBranch { index: 1 }
        );
    }
}
