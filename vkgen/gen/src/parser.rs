//! Loading the schema documents from disk.
//!
//! A schema directory holds `objects.json`, `responses.json` and
//! `methods.json`. Parsing itself lives in `vkgen_define::document`; this
//! module reads the files and attaches paths to failures.

use std::fs;
use std::path::Path;

use tracing::info;
use vkgen_define::document::{parse_methods, parse_objects, parse_responses};
use vkgen_define::{DocumentError, SchemaSet};

use crate::errors::GeneratorError;

pub const OBJECTS_FILE: &str = "objects.json";
pub const RESPONSES_FILE: &str = "responses.json";
pub const METHODS_FILE: &str = "methods.json";

/// Reads and parses the three schema documents in `dir`.
///
/// ## Errors
///
/// - `GeneratorError::ReadError` if a document cannot be read
/// - `GeneratorError::ParseError` if a document is not a valid schema
pub fn load_schema_dir(dir: &Path) -> Result<SchemaSet, GeneratorError> {
    let objects = load(dir, OBJECTS_FILE, parse_objects)?;
    let responses = load(dir, RESPONSES_FILE, parse_responses)?;
    let methods = load(dir, METHODS_FILE, parse_methods)?;

    info!(
        objects = objects.len(),
        responses = responses.len(),
        methods = methods.len(),
        "schema loaded"
    );

    Ok(SchemaSet {
        objects,
        responses,
        methods,
    })
}

fn load<T>(
    dir: &Path,
    file: &str,
    parse: impl FnOnce(&str) -> Result<T, DocumentError>,
) -> Result<T, GeneratorError> {
    let path = dir.join(file);
    let text = fs::read_to_string(&path).map_err(|e| GeneratorError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse(&text).map_err(|e| GeneratorError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use vkgen_define::{Document, ExprKind, Reference};

    fn write_docs(dir: &Path, objects: &str, responses: &str, methods: &str) {
        fs::write(dir.join(OBJECTS_FILE), objects).unwrap();
        fs::write(dir.join(RESPONSES_FILE), responses).unwrap();
        fs::write(dir.join(METHODS_FILE), methods).unwrap();
    }

    #[test]
    fn loads_all_three_documents() {
        let temp_dir = TempDir::new().unwrap();
        write_docs(
            temp_dir.path(),
            r#"{"definitions": {"base_bool_int": {"type": "integer", "enum": [0, 1]}}}"#,
            r##"{"definitions": {"base_ok_response": {"type": "object",
                "properties": {"response": {"$ref": "objects.json#/definitions/base_bool_int"}}}}}"##,
            r##"{"methods": [{"name": "account.ban", "parameters": [],
                "responses": {"response": {"$ref": "responses.json#/definitions/base_ok_response"}}}]}"##,
        );

        let schema = load_schema_dir(temp_dir.path()).unwrap();

        assert_eq!(schema.objects.len(), 1);
        assert_eq!(
            schema.responses[0].expression.kind,
            ExprKind::Ref(Reference::new(Document::Objects, "base_bool_int"))
        );
        assert_eq!(schema.methods[0].name, "account.ban");
    }

    #[test]
    fn missing_document_names_the_path() {
        let temp_dir = TempDir::new().unwrap();
        let err = load_schema_dir(temp_dir.path()).unwrap_err();
        match err {
            GeneratorError::ReadError { path, .. } => assert!(path.ends_with(OBJECTS_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn malformed_document_names_the_path() {
        let temp_dir = TempDir::new().unwrap();
        write_docs(temp_dir.path(), r#"{"definitions": {}}"#, "not json", r#"{"methods": []}"#);
        let err = load_schema_dir(temp_dir.path()).unwrap_err();
        match err {
            GeneratorError::ParseError { path, .. } => assert!(path.ends_with(RESPONSES_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
