//! Schema expressions.
//!
//! An [`Expression`] is one node of a parsed schema document: a base type,
//! a reference to a named definition, an array, an enum, a composition of
//! branches, or an inline object shape. Every node may carry a description,
//! which is documentation only and never participates in typing.
//!
//! ## Examples
//!
//! ```
//! use vkgen_define::{BaseKind, Expression, Property};
//!
//! let message = Expression::object(
//!     vec![
//!         Property::new("id", Expression::base(BaseKind::Integer)),
//!         Property::new("text", Expression::base(BaseKind::String)),
//!     ],
//!     vec!["id".to_string()],
//! );
//!
//! assert!(message.structurally_equal(&message.clone()));
//! ```

use strum::{Display, EnumIter, EnumString};

/// The primitive kinds a schema node may declare via its `type` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum BaseKind {
    Integer,
    Number,
    String,
    Boolean,
    Object,
    Array,
}

/// The definitions document a reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Document {
    Objects,
    Responses,
}

impl Document {
    /// File name of the document, e.g. `objects.json`.
    pub fn file_name(self) -> String {
        format!("{}.json", self)
    }
}

/// A `$ref` target: the document and the raw definition name within it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub document: Document,
    pub name: String,
}

impl Reference {
    pub fn new(document: Document, name: impl Into<String>) -> Self {
        Self {
            document,
            name: name.into(),
        }
    }
}

/// A single literal from an enum's `enum` list.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    Integer(i64),
    Float(f64),
    String(String),
    /// Booleans, nulls and nested values; never valid for any enum kind.
    Other(serde_json::Value),
}

impl EnumValue {
    /// Renders the value as display text.
    ///
    /// Integers use base-10, floats the shortest text that round-trips
    /// (switching to exponent form for very large or very small magnitudes),
    /// and strings are returned verbatim without quotes.
    pub fn label(&self) -> String {
        match self {
            EnumValue::Integer(i) => i.to_string(),
            EnumValue::Float(f) => format_general(*f),
            EnumValue::String(s) => s.clone(),
            EnumValue::Other(v) => v.to_string(),
        }
    }
}

fn format_general(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-5..1e21).contains(&magnitude) {
        format!("{:e}", value)
    } else {
        format!("{}", value)
    }
}

/// The payload of an `Enum` node.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumExpr {
    pub base: BaseKind,
    pub values: Vec<EnumValue>,
    /// Parallel display names (`enumNames`), when the document supplies them.
    pub names: Option<Vec<String>>,
}

/// A named property of an object shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub expr: Expression,
}

impl Property {
    pub fn new(name: impl Into<String>, expr: Expression) -> Self {
        Self {
            name: name.into(),
            expr,
        }
    }
}

/// An inline object: ordered properties plus the names declared required.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectShape {
    pub properties: Vec<Property>,
    pub required: Vec<String>,
}

impl ObjectShape {
    /// Returns true when `name` appears in the required list.
    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

/// The closed set of expression kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Base(BaseKind),
    Ref(Reference),
    Array(Box<Expression>),
    Enum(EnumExpr),
    AllOf(Vec<Expression>),
    OneOf(Vec<Expression>),
    Object(ObjectShape),
}

/// A schema node together with its optional description.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    pub kind: ExprKind,
    pub description: Option<String>,
}

impl Expression {
    pub fn new(kind: ExprKind) -> Self {
        Self {
            kind,
            description: None,
        }
    }

    pub fn base(kind: BaseKind) -> Self {
        Self::new(ExprKind::Base(kind))
    }

    /// A reference into the objects document.
    pub fn reference(target: impl Into<String>) -> Self {
        Self::new(ExprKind::Ref(Reference::new(Document::Objects, target)))
    }

    /// A reference into the responses document.
    pub fn response_reference(target: impl Into<String>) -> Self {
        Self::new(ExprKind::Ref(Reference::new(Document::Responses, target)))
    }

    pub fn array(element: Expression) -> Self {
        Self::new(ExprKind::Array(Box::new(element)))
    }

    pub fn enumeration(base: BaseKind, values: Vec<EnumValue>, names: Option<Vec<String>>) -> Self {
        Self::new(ExprKind::Enum(EnumExpr {
            base,
            values,
            names,
        }))
    }

    pub fn all_of(branches: Vec<Expression>) -> Self {
        Self::new(ExprKind::AllOf(branches))
    }

    pub fn one_of(branches: Vec<Expression>) -> Self {
        Self::new(ExprKind::OneOf(branches))
    }

    pub fn object(properties: Vec<Property>, required: Vec<String>) -> Self {
        Self::new(ExprKind::Object(ObjectShape {
            properties,
            required,
        }))
    }

    /// Attaches a description, consuming and returning the expression.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns the branches of an `AllOf`/`OneOf` node.
    pub fn branches(&self) -> Option<&[Expression]> {
        match &self.kind {
            ExprKind::AllOf(branches) | ExprKind::OneOf(branches) => Some(branches),
            _ => None,
        }
    }

    /// Shape equivalence, ignoring descriptions.
    ///
    /// Two expressions are equal when they share a base kind, a reference
    /// target (document and name), recursively equal element types, the same enum signature
    /// (kind, values and names), or object shapes whose properties match
    /// pairwise by name and type.
    pub fn structurally_equal(&self, other: &Expression) -> bool {
        match (&self.kind, &other.kind) {
            (ExprKind::Base(a), ExprKind::Base(b)) => a == b,
            (ExprKind::Ref(a), ExprKind::Ref(b)) => a == b,
            (ExprKind::Array(a), ExprKind::Array(b)) => a.structurally_equal(b),
            (ExprKind::Enum(a), ExprKind::Enum(b)) => {
                a.base == b.base && a.values == b.values && a.names == b.names
            }
            (ExprKind::AllOf(a), ExprKind::AllOf(b)) | (ExprKind::OneOf(a), ExprKind::OneOf(b)) => {
                all_equal(a, b)
            }
            (ExprKind::Object(a), ExprKind::Object(b)) => {
                a.required == b.required
                    && a.properties.len() == b.properties.len()
                    && a
                        .properties
                        .iter()
                        .zip(&b.properties)
                        .all(|(x, y)| x.name == y.name && x.expr.structurally_equal(&y.expr))
            }
            _ => false,
        }
    }
}

fn all_equal(a: &[Expression], b: &[Expression]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.structurally_equal(y))
}
