//! Generator configuration.
//!
//! [`GeneratorConfig`] carries every knob the emitter consults: the casing
//! switch, the formatting switch, the patch rule table, forced response
//! representations and object renames. It is built once and handed to the
//! emitter at construction; nothing reads ambient state.
//!
//! The defaults hold the built-in tables. A TOML file may override any of
//! them:
//!
//! ```toml
//! casing = true
//! format = true
//!
//! [patches.objects.NotificationsNotificationParent]
//! Likes = "Option<BaseLikesInfo>"
//!
//! [forced_responses]
//! messages_delete_response = "std::collections::HashMap<String, i64>"
//!
//! [object_renames]
//! leads_complete = "LeadsCompleteObject"
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::errors::GeneratorError;

/// unit -> declaration -> field -> replacement type text
pub type PatchTable = BTreeMap<String, BTreeMap<String, BTreeMap<String, String>>>;

/// Settings for one generation run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Apply the identifier caser; when false raw schema names are kept.
    pub casing: bool,
    /// Pretty-print each unit before writing.
    pub format: bool,
    /// Post-emission field type overrides.
    pub patches: PatchTable,
    /// Response name -> Rust type that replaces the derived representation.
    pub forced_responses: BTreeMap<String, String>,
    /// Raw object name -> declared identifier.
    pub object_renames: BTreeMap<String, String>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        let mut likes = BTreeMap::new();
        likes.insert("Likes".to_string(), "Option<BaseLikesInfo>".to_string());
        let mut declarations = BTreeMap::new();
        declarations.insert("NotificationsNotificationParent".to_string(), likes);
        let mut patches = BTreeMap::new();
        patches.insert("objects".to_string(), declarations);

        let mut forced_responses = BTreeMap::new();
        forced_responses.insert(
            "messages_delete_response".to_string(),
            "std::collections::HashMap<String, i64>".to_string(),
        );

        let mut object_renames = BTreeMap::new();
        object_renames.insert("leads_complete".to_string(), "LeadsCompleteObject".to_string());
        object_renames.insert("leads_start".to_string(), "LeadsStartObject".to_string());

        Self {
            casing: true,
            format: true,
            patches,
            forced_responses,
            object_renames,
        }
    }
}

impl GeneratorConfig {
    /// Parses a configuration from TOML text. Missing keys take defaults.
    ///
    /// ## Errors
    ///
    /// Returns `GeneratorError::ConfigError` if the text is not valid TOML
    /// or contains unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self, GeneratorError> {
        toml::from_str(text).map_err(|e| GeneratorError::ConfigError(e.to_string()))
    }

    /// Reads and parses a TOML configuration file.
    pub fn load(path: &Path) -> Result<Self, GeneratorError> {
        let text = fs::read_to_string(path).map_err(|e| {
            GeneratorError::ConfigError(format!("cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_hold_builtin_tables() {
        let config = GeneratorConfig::default();
        assert!(config.casing);
        assert!(config.format);
        assert_eq!(
            config.patches["objects"]["NotificationsNotificationParent"]["Likes"],
            "Option<BaseLikesInfo>"
        );
        assert!(config.forced_responses.contains_key("messages_delete_response"));
        assert_eq!(config.object_renames["leads_start"], "LeadsStartObject");
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let config = GeneratorConfig::from_toml_str("").unwrap();
        assert_eq!(config, GeneratorConfig::default());
    }

    #[test]
    fn toml_overrides_switches_and_tables() {
        let config = GeneratorConfig::from_toml_str(
            r#"
            casing = false

            [patches.responses.UsersGetResponse]
            Count = "u32"
            "#,
        )
        .unwrap();

        assert!(!config.casing);
        assert!(config.format);
        assert!(!config.patches.contains_key("objects"));
        assert_eq!(config.patches["responses"]["UsersGetResponse"]["Count"], "u32");
        assert_eq!(config.object_renames, GeneratorConfig::default().object_renames);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = GeneratorConfig::from_toml_str("colour = true").unwrap_err();
        assert!(matches!(err, GeneratorError::ConfigError(_)));
    }

    #[test]
    fn load_reads_a_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vkgen.toml");
        fs::write(&path, "format = false\n").unwrap();

        let config = GeneratorConfig::load(&path).unwrap();
        assert!(!config.format);
    }

    #[test]
    fn load_reports_missing_file() {
        let err = GeneratorConfig::load(Path::new("/nonexistent/vkgen.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/vkgen.toml"));
    }
}
