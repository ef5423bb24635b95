//! vkgen definition library.
//!
//! This crate holds the schema data model consumed by `vkgen-gen`, and the
//! parser that builds it from the JSON schema documents describing the VK
//! API surface.
//!
//! ## Core Types
//!
//! - [`Expression`] / [`ExprKind`] - One schema node: base type, reference,
//!   array, enum, `allOf`/`oneOf` composition or inline object
//! - [`NamedDefinition`] - A top-level object or response definition
//! - [`MethodDefinition`] - An RPC method with parameters and response variants
//! - [`SchemaSet`] - The three parsed documents of one generation run
//!
//! ## Examples
//!
//! ```
//! use vkgen_define::{BaseKind, Expression, NamedDefinition, Property};
//!
//! let user = NamedDefinition::new(
//!     "users_user_min",
//!     Expression::object(
//!         vec![
//!             Property::new("id", Expression::base(BaseKind::Integer)),
//!             Property::new("first_name", Expression::base(BaseKind::String)),
//!         ],
//!         vec!["id".to_string()],
//!     ),
//! );
//!
//! assert_eq!(user.name, "users_user_min");
//! ```

pub mod definition;
pub mod document;
pub mod expr;

pub use definition::{MethodDefinition, NamedDefinition, Parameter, ResponseVariant, SchemaSet};
pub use document::DocumentError;
pub use expr::{
    BaseKind, Document, EnumExpr, EnumValue, ExprKind, Expression, ObjectShape, Property, Reference,
};
