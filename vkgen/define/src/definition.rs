//! Named definitions produced by the document parser.

use crate::expr::Expression;

/// A top-level object or response definition.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedDefinition {
    pub name: String,
    pub expression: Expression,
    pub description: Option<String>,
}

impl NamedDefinition {
    pub fn new(name: impl Into<String>, expression: Expression) -> Self {
        let description = expression.description.clone();
        Self {
            name: name.into(),
            expression,
            description,
        }
    }
}

/// One parameter of a method.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub expression: Expression,
    pub description: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, expression: Expression) -> Self {
        let description = expression.description.clone();
        Self {
            name: name.into(),
            expression,
            description,
        }
    }
}

/// A named response shape of a method, such as `response` or `extendedResponse`.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseVariant {
    pub name: String,
    pub expression: Expression,
}

impl ResponseVariant {
    pub fn new(name: impl Into<String>, expression: Expression) -> Self {
        Self {
            name: name.into(),
            expression,
        }
    }
}

/// An RPC method. Each response variant yields its own call wrapper.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDefinition {
    /// Dotted method name, e.g. `users.get`.
    pub name: String,
    pub description: Option<String>,
    pub parameters: Vec<Parameter>,
    pub responses: Vec<ResponseVariant>,
}

/// The three parsed documents of one generation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaSet {
    pub objects: Vec<NamedDefinition>,
    pub responses: Vec<NamedDefinition>,
    pub methods: Vec<MethodDefinition>,
}
