//! Schema document parsing.
//!
//! Turns the three JSON documents of a schema (objects, responses and
//! methods) into [`Expression`] trees. JSON object key order is preserved,
//! so definitions and properties come out in document order. A key repeated
//! within one JSON object keeps its first occurrence.
//!
//! A `$ref` keeps the document it points into: `objects.json#/...` and
//! `responses.json#/...` name their document, and a local `#/definitions/...`
//! refers to the document being parsed.
//!
//! ## Document shapes
//!
//! ```text
//! objects.json   {"definitions": {"users_user": {...}, ...}}
//! responses.json {"definitions": {"users_get_response": {"type": "object",
//!                                 "properties": {"response": {...}}}}}
//! methods.json   {"methods": [{"name": "users.get", "parameters": [...],
//!                              "responses": {"response": {"$ref": ...}}}]}
//! ```
//!
//! ## Examples
//!
//! ```
//! use vkgen_define::document::parse_objects;
//! use vkgen_define::ExprKind;
//!
//! let json = r#"{"definitions": {"base_ok_response": {"type": "integer", "enum": [1]}}}"#;
//! let objects = parse_objects(json).unwrap();
//!
//! assert_eq!(objects[0].name, "base_ok_response");
//! assert!(matches!(objects[0].expression.kind, ExprKind::Enum(_)));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::de::{self, DeserializeOwned, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::map::Entry;
use serde_json::{Map, Number, Value};
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::debug;

use crate::definition::{MethodDefinition, NamedDefinition, Parameter, ResponseVariant};
use crate::expr::{BaseKind, Document, EnumValue, ExprKind, Expression, ObjectShape, Property, Reference};

/// Errors raised while reading a schema document.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The document is not valid JSON or lacks its top-level section
    #[error("Malformed schema document: {0}")]
    Json(#[from] serde_json::Error),

    /// A node has a shape the parser cannot interpret
    #[error("Invalid schema node at '{path}': {reason}")]
    InvalidNode { path: String, reason: String },
}

#[derive(Deserialize)]
struct DefinitionsDocument {
    definitions: Map<String, Value>,
}

#[derive(Deserialize)]
struct MethodsDocument {
    methods: Vec<RawMethod>,
}

#[derive(Deserialize)]
struct RawMethod {
    name: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    parameters: Vec<Value>,
    #[serde(default)]
    responses: Map<String, Value>,
}

/// A JSON value whose objects keep the first occurrence of a repeated key.
struct FirstWins(Value);

impl<'de> Deserialize<'de> for FirstWins {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(FirstWinsVisitor).map(FirstWins)
    }
}

struct FirstWinsVisitor;

impl<'de> Visitor<'de> for FirstWinsVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(Value::from(v))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        FirstWins::deserialize(deserializer).map(|v| v.0)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(FirstWins(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut object = Map::new();
        while let Some((key, FirstWins(value))) = map.next_entry::<String, FirstWins>()? {
            match object.entry(key) {
                Entry::Vacant(slot) => {
                    slot.insert(value);
                }
                Entry::Occupied(slot) => debug!(key = %slot.key(), "repeated key, keeping the first"),
            }
        }
        Ok(Value::Object(object))
    }
}

/// Reads a document, collapsing repeated keys to their first occurrence.
fn read_document<T: DeserializeOwned>(json: &str) -> Result<T, DocumentError> {
    let FirstWins(value) = serde_json::from_str(json)?;
    Ok(serde_json::from_value(value)?)
}

/// Parses an objects document into named definitions.
pub fn parse_objects(json: &str) -> Result<Vec<NamedDefinition>, DocumentError> {
    let doc: DefinitionsDocument = read_document(json)?;
    let definitions = doc
        .definitions
        .iter()
        .map(|(name, node)| {
            let expression = parse_expression(node, name, Some(Document::Objects))?;
            Ok(NamedDefinition::new(name, expression))
        })
        .collect::<Result<Vec<_>, DocumentError>>()?;
    debug!(count = definitions.len(), "parsed object definitions");
    Ok(definitions)
}

/// Parses a responses document, unwrapping the `response` envelope.
///
/// A response definition whose only property is `response` is replaced by
/// that property's expression, so the definition describes the payload.
pub fn parse_responses(json: &str) -> Result<Vec<NamedDefinition>, DocumentError> {
    let doc: DefinitionsDocument = read_document(json)?;
    let definitions = doc
        .definitions
        .iter()
        .map(|(name, node)| {
            let expression = unwrap_envelope(parse_expression(node, name, Some(Document::Responses))?);
            Ok(NamedDefinition::new(name, expression))
        })
        .collect::<Result<Vec<_>, DocumentError>>()?;
    debug!(count = definitions.len(), "parsed response definitions");
    Ok(definitions)
}

/// Parses a methods document.
pub fn parse_methods(json: &str) -> Result<Vec<MethodDefinition>, DocumentError> {
    let doc: MethodsDocument = read_document(json)?;
    let mut methods = Vec::with_capacity(doc.methods.len());

    for raw in doc.methods {
        let mut parameters = Vec::with_capacity(raw.parameters.len());
        for (idx, node) in raw.parameters.iter().enumerate() {
            let path = format!("{}.parameters[{}]", raw.name, idx);
            let name = node
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| invalid(&path, "parameter has no string 'name'"))?;
            parameters.push(Parameter::new(name, parse_expression(node, &path, None)?));
        }

        let responses = raw
            .responses
            .iter()
            .map(|(name, node)| {
                let path = format!("{}.responses.{}", raw.name, name);
                Ok(ResponseVariant::new(name, parse_expression(node, &path, None)?))
            })
            .collect::<Result<Vec<_>, DocumentError>>()?;

        methods.push(MethodDefinition {
            name: raw.name,
            description: raw.description,
            parameters,
            responses,
        });
    }

    debug!(count = methods.len(), "parsed method definitions");
    Ok(methods)
}

/// Converts one JSON schema node into an expression.
///
/// Keywords are checked in the order `$ref`, `allOf`, `oneOf`, `enum`,
/// then `type`. A node with no recognisable type becomes `Base(object)`.
/// `local` is the document a local `#/definitions/...` reference points
/// into; `None` for the methods document, which declares no definitions.
///
/// ## Errors
///
/// Returns [`DocumentError::InvalidNode`] when a keyword holds a value of
/// the wrong JSON type, e.g. a numeric `$ref`, or when a reference names an
/// unknown document.
pub fn parse_expression(node: &Value, path: &str, local: Option<Document>) -> Result<Expression, DocumentError> {
    let obj = node
        .as_object()
        .ok_or_else(|| invalid(path, "expected a JSON object"))?;

    let expr = if let Some(reference) = obj.get("$ref") {
        let reference = reference
            .as_str()
            .ok_or_else(|| invalid(path, "'$ref' must be a string"))?;
        Expression::new(ExprKind::Ref(parse_reference(reference, path, local)?))
    } else if let Some(branches) = obj.get("allOf") {
        Expression::all_of(parse_branches(branches, path, "allOf", local)?)
    } else if let Some(branches) = obj.get("oneOf") {
        Expression::one_of(parse_branches(branches, path, "oneOf", local)?)
    } else if let Some(values) = obj.get("enum") {
        parse_enum(obj, values, path)?
    } else {
        match declared_kind(obj) {
            Some(BaseKind::Array) => match obj.get("items") {
                Some(items) => Expression::array(parse_expression(items, &format!("{}.items", path), local)?),
                None => Expression::base(BaseKind::Array),
            },
            Some(BaseKind::Object) | None => match (obj.get("properties"), obj.get("items")) {
                (Some(properties), _) => parse_object(obj, properties, path, local)?,
                (None, Some(items)) => {
                    Expression::array(parse_expression(items, &format!("{}.items", path), local)?)
                }
                (None, None) => Expression::base(BaseKind::Object),
            },
            Some(kind) => Expression::base(kind),
        }
    };

    Ok(match obj.get("description").and_then(Value::as_str) {
        Some(description) => expr.with_description(description),
        None => expr,
    })
}

fn invalid(path: &str, reason: &str) -> DocumentError {
    DocumentError::InvalidNode {
        path: path.to_string(),
        reason: reason.to_string(),
    }
}

/// `objects.json#/definitions/base_bool_int` -> (objects, `base_bool_int`)
fn parse_reference(reference: &str, path: &str, local: Option<Document>) -> Result<Reference, DocumentError> {
    let (file, pointer) = reference.split_once('#').unwrap_or(("", reference));

    let document = match file.rsplit('/').next().unwrap_or(file) {
        "" => local.ok_or_else(|| invalid(path, "local '$ref' outside a definitions document"))?,
        file => Document::iter()
            .find(|document| document.file_name() == file)
            .ok_or_else(|| invalid(path, &format!("'$ref' points into unknown document '{}'", file)))?,
    };

    match pointer.rsplit('/').next() {
        Some(target) if !target.is_empty() => Ok(Reference::new(document, target)),
        _ => Err(invalid(path, "'$ref' has an empty target")),
    }
}

fn declared_kind(obj: &Map<String, Value>) -> Option<BaseKind> {
    obj.get("type")
        .and_then(Value::as_str)
        .and_then(|t| BaseKind::from_str(t).ok())
}

fn parse_branches(
    value: &Value,
    path: &str,
    keyword: &str,
    local: Option<Document>,
) -> Result<Vec<Expression>, DocumentError> {
    let branches = value
        .as_array()
        .ok_or_else(|| invalid(path, &format!("'{}' must be an array", keyword)))?;
    branches
        .iter()
        .enumerate()
        .map(|(idx, branch)| parse_expression(branch, &format!("{}.{}[{}]", path, keyword, idx), local))
        .collect()
}

fn parse_enum(obj: &Map<String, Value>, values: &Value, path: &str) -> Result<Expression, DocumentError> {
    let values: Vec<EnumValue> = values
        .as_array()
        .ok_or_else(|| invalid(path, "'enum' must be an array"))?
        .iter()
        .map(enum_value)
        .collect();

    let base = declared_kind(obj).unwrap_or_else(|| infer_enum_kind(&values));

    let names = match obj.get("enumNames") {
        Some(Value::Array(names)) => Some(
            names
                .iter()
                .map(|n| n.as_str().map(str::to_string).unwrap_or_else(|| n.to_string()))
                .collect(),
        ),
        Some(_) => return Err(invalid(path, "'enumNames' must be an array")),
        None => None,
    };

    Ok(Expression::enumeration(base, values, names))
}

fn enum_value(value: &Value) -> EnumValue {
    match value {
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => EnumValue::Integer(i),
            (None, Some(f)) => EnumValue::Float(f),
            _ => EnumValue::Other(value.clone()),
        },
        Value::String(s) => EnumValue::String(s.clone()),
        other => EnumValue::Other(other.clone()),
    }
}

/// Picks a base kind for an enum without an explicit `type`.
fn infer_enum_kind(values: &[EnumValue]) -> BaseKind {
    if values.iter().any(|v| matches!(v, EnumValue::String(_))) {
        BaseKind::String
    } else if values.iter().any(|v| matches!(v, EnumValue::Float(_))) {
        BaseKind::Number
    } else if values.iter().all(|v| matches!(v, EnumValue::Integer(_))) {
        BaseKind::Integer
    } else {
        BaseKind::Boolean
    }
}

fn parse_object(
    obj: &Map<String, Value>,
    properties: &Value,
    path: &str,
    local: Option<Document>,
) -> Result<Expression, DocumentError> {
    let properties = properties
        .as_object()
        .ok_or_else(|| invalid(path, "'properties' must be an object"))?;

    let mut required: Vec<String> = match obj.get("required") {
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };

    let mut props = Vec::with_capacity(properties.len());
    for (name, node) in properties {
        let expr = parse_expression(node, &format!("{}.{}", path, name), local)?;
        let flagged = node.get("required").and_then(Value::as_bool).unwrap_or(false);
        if flagged && !required.iter().any(|r| r == name) {
            required.push(name.clone());
        }
        props.push(Property::new(name, expr));
    }

    Ok(Expression::new(ExprKind::Object(ObjectShape {
        properties: props,
        required,
    })))
}

fn unwrap_envelope(expr: Expression) -> Expression {
    let Expression { kind, description } = expr;
    match kind {
        ExprKind::Object(mut shape)
            if shape.properties.len() == 1 && shape.properties[0].name == "response" =>
        {
            let mut inner = shape.properties.remove(0).expr;
            if inner.description.is_none() {
                inner.description = description;
            }
            inner
        }
        kind => Expression { kind, description },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ref_keeps_the_document_and_definition_name() {
        let node = serde_json::json!({"$ref": "objects.json#/definitions/base_bool_int"});
        let expr = parse_expression(&node, "x", None).unwrap();
        assert_eq!(expr.kind, ExprKind::Ref(Reference::new(Document::Objects, "base_bool_int")));

        let node = serde_json::json!({"$ref": "responses.json#/definitions/base_bool_int"});
        let expr = parse_expression(&node, "x", None).unwrap();
        assert_eq!(expr.kind, ExprKind::Ref(Reference::new(Document::Responses, "base_bool_int")));
    }

    #[test]
    fn local_ref_points_into_the_current_document() {
        let node = serde_json::json!({"$ref": "#/definitions/users_user"});
        let expr = parse_expression(&node, "x", Some(Document::Responses)).unwrap();
        assert_eq!(expr.kind, ExprKind::Ref(Reference::new(Document::Responses, "users_user")));

        let err = parse_expression(&node, "users.get.responses.response", None).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidNode { .. }));
    }

    #[test]
    fn ref_into_unknown_document_is_rejected() {
        let node = serde_json::json!({"$ref": "widgets.json#/definitions/gear"});
        let err = parse_expression(&node, "x", None).unwrap_err();
        assert!(err.to_string().contains("widgets.json"));
    }

    #[test]
    fn non_string_ref_is_rejected() {
        let node = serde_json::json!({"$ref": 12});
        let err = parse_expression(&node, "users_user.city", None).unwrap_err();
        assert!(err.to_string().contains("users_user.city"));
    }

    #[test]
    fn ref_wins_over_type() {
        let node = serde_json::json!({"$ref": "objects.json#/definitions/a", "type": "string"});
        let expr = parse_expression(&node, "x", None).unwrap();
        assert!(matches!(expr.kind, ExprKind::Ref(_)));
    }

    #[test]
    fn properties_keep_document_order() {
        let json = r#"{"definitions": {"thing": {"type": "object", "properties": {
            "zeta": {"type": "string"}, "alpha": {"type": "integer"}, "mid": {"type": "boolean"}}}}}"#;
        let defs = parse_objects(json).unwrap();
        let ExprKind::Object(shape) = &defs[0].expression.kind else {
            panic!("expected object");
        };
        let names: Vec<_> = shape.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn repeated_property_keeps_its_first_declaration() {
        let json = r#"{"definitions": {"thing": {"type": "object", "properties": {
            "id": {"type": "integer"}, "name": {"type": "string"}, "id": {"type": "string"}}}}}"#;
        let defs = parse_objects(json).unwrap();
        let ExprKind::Object(shape) = &defs[0].expression.kind else {
            panic!("expected object");
        };
        let names: Vec<_> = shape.properties.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert_eq!(shape.properties[0].expr.kind, ExprKind::Base(BaseKind::Integer));
    }

    #[test]
    fn required_array_and_property_flags_merge() {
        let node = serde_json::json!({
            "type": "object",
            "required": ["id"],
            "properties": {
                "id": {"type": "integer"},
                "text": {"type": "string", "required": true},
                "date": {"type": "integer"}
            }
        });
        let expr = parse_expression(&node, "message", None).unwrap();
        let ExprKind::Object(shape) = expr.kind else {
            panic!("expected object");
        };
        assert_eq!(shape.required, vec!["id".to_string(), "text".to_string()]);
    }

    #[test]
    fn enum_kind_is_inferred_without_type() {
        let node = serde_json::json!({"enum": [0, 1, 2]});
        let ExprKind::Enum(e) = parse_expression(&node, "x", None).unwrap().kind else {
            panic!("expected enum");
        };
        assert_eq!(e.base, BaseKind::Integer);
        assert_eq!(e.values, vec![EnumValue::Integer(0), EnumValue::Integer(1), EnumValue::Integer(2)]);
    }

    #[test]
    fn enum_names_are_collected() {
        let node = serde_json::json!({"type": "integer", "enum": [1, 2], "enumNames": ["female", "male"]});
        let ExprKind::Enum(e) = parse_expression(&node, "x", None).unwrap().kind else {
            panic!("expected enum");
        };
        assert_eq!(e.names, Some(vec!["female".to_string(), "male".to_string()]));
    }

    #[test]
    fn boolean_enum_keeps_boolean_kind() {
        let node = serde_json::json!({"type": "boolean", "enum": [true]});
        let ExprKind::Enum(e) = parse_expression(&node, "x", None).unwrap().kind else {
            panic!("expected enum");
        };
        assert_eq!(e.base, BaseKind::Boolean);
    }

    #[test]
    fn array_without_items_is_base_array() {
        let node = serde_json::json!({"type": "array"});
        assert_eq!(parse_expression(&node, "x", None).unwrap().kind, ExprKind::Base(BaseKind::Array));
    }

    #[test]
    fn unknown_type_becomes_base_object() {
        let node = serde_json::json!({"type": "mystery"});
        assert_eq!(parse_expression(&node, "x", None).unwrap().kind, ExprKind::Base(BaseKind::Object));
    }

    #[test]
    fn descriptions_are_attached() {
        let node = serde_json::json!({"type": "string", "description": "User's first name"});
        let expr = parse_expression(&node, "x", None).unwrap();
        assert_eq!(expr.description.as_deref(), Some("User's first name"));
    }

    #[test]
    fn responses_unwrap_the_envelope() {
        let json = r#"{"definitions": {"users_get_response": {"type": "object", "properties": {
            "response": {"type": "array", "items": {"$ref": "objects.json#/definitions/users_user_full"}}}}}}"#;
        let defs = parse_responses(json).unwrap();
        let ExprKind::Array(element) = &defs[0].expression.kind else {
            panic!("expected array");
        };
        assert_eq!(element.kind, ExprKind::Ref(Reference::new(Document::Objects, "users_user_full")));
    }

    #[test]
    fn responses_without_envelope_are_kept() {
        let json = r#"{"definitions": {"odd_response": {"type": "object", "properties": {
            "count": {"type": "integer"}, "items": {"type": "array", "items": {"type": "string"}}}}}}"#;
        let defs = parse_responses(json).unwrap();
        assert!(matches!(defs[0].expression.kind, ExprKind::Object(_)));
    }

    #[test]
    fn methods_keep_parameter_and_response_order() {
        let json = r#"{"methods": [{
            "name": "users.get",
            "description": "Returns detailed information on users.",
            "parameters": [
                {"name": "user_ids", "type": "array", "items": {"type": "string"}},
                {"name": "name_case", "type": "string", "enum": ["nom", "gen"]}
            ],
            "responses": {
                "response": {"$ref": "responses.json#/definitions/users_get_response"},
                "extendedResponse": {"$ref": "responses.json#/definitions/users_get_extended_response"}
            }
        }]}"#;
        let methods = parse_methods(json).unwrap();
        let method = &methods[0];
        assert_eq!(method.name, "users.get");
        assert_eq!(method.parameters[0].name, "user_ids");
        assert_eq!(method.parameters[1].name, "name_case");
        assert_eq!(method.responses[0].name, "response");
        assert_eq!(method.responses[1].name, "extendedResponse");
    }

    #[test]
    fn parameter_without_name_is_rejected() {
        let json = r#"{"methods": [{"name": "users.get", "parameters": [{"type": "string"}]}]}"#;
        assert!(matches!(parse_methods(json), Err(DocumentError::InvalidNode { .. })));
    }

    #[test]
    fn missing_section_is_a_json_error() {
        assert!(matches!(parse_objects("{}"), Err(DocumentError::Json(_))));
    }
}
