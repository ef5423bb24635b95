//! Shared test fixtures for vkgen-gen unit tests.
//!
//! Small constructors that keep schema fixtures readable, plus a compact
//! schema exercising every output unit.

use proc_macro2::TokenStream;
use vkgen_define::{
    BaseKind, EnumValue, Expression, MethodDefinition, NamedDefinition, Parameter, Property,
    ResponseVariant, SchemaSet,
};

pub fn prop(name: &str, expr: Expression) -> Property {
    Property::new(name, expr)
}

/// An inline object with no required names.
pub fn inline(properties: Vec<Property>) -> Expression {
    Expression::object(properties, vec![])
}

pub fn object(name: &str, expr: Expression) -> NamedDefinition {
    NamedDefinition::new(name, expr)
}

pub fn schema_with(objects: Vec<NamedDefinition>, responses: Vec<NamedDefinition>) -> SchemaSet {
    SchemaSet {
        objects,
        responses,
        methods: vec![],
    }
}

pub fn method(name: &str, parameters: Vec<Parameter>, responses: Vec<ResponseVariant>) -> MethodDefinition {
    MethodDefinition {
        name: name.to_string(),
        description: Some(format!("Test method {}", name)),
        parameters,
        responses,
    }
}

/// Formats tokens so assertions can match on readable code.
pub fn pretty(tokens: TokenStream) -> String {
    match syn::parse2::<syn::File>(tokens.clone()) {
        Ok(file) => prettyplease::unparse(&file),
        Err(_) => tokens.to_string(),
    }
}

/// A schema touching every lowering path and every output unit.
pub fn make_sample_schema() -> SchemaSet {
    let int = || Expression::base(BaseKind::Integer);
    let string = || Expression::base(BaseKind::String);

    let objects = vec![
        object(
            "base_sex",
            Expression::enumeration(
                BaseKind::Integer,
                vec![EnumValue::Integer(0), EnumValue::Integer(1), EnumValue::Integer(2)],
                Some(vec!["unknown".into(), "female".into(), "male".into()]),
            ),
        ),
        object(
            "gender",
            Expression::enumeration(
                BaseKind::String,
                vec![EnumValue::String("male".into()), EnumValue::String("female".into())],
                None,
            ),
        ),
        object("base_likes_info", inline(vec![prop("count", int()), prop("user_likes", int())])),
        object(
            "message",
            Expression::object(
                vec![
                    prop("id", int()),
                    prop("text", string()),
                    prop("attachment", Expression::reference("photos_photo")),
                    prop("reply", Expression::reference("message")),
                ],
                vec!["id".into(), "text".into()],
            )
            .with_description("Private message"),
        ),
        object(
            "photos_photo",
            inline(vec![
                prop("id", int()),
                prop("owner_id", int()),
                prop("likes", Expression::reference("base_likes_info")),
                prop(
                    "sizes",
                    Expression::array(inline(vec![prop("url", string()), prop("width", int())])),
                ),
            ]),
        ),
        object(
            "video_video",
            inline(vec![prop("id", int()), prop("likes", Expression::base(BaseKind::Object)), prop("title", string())]),
        ),
        object(
            "notifications_notification_parent",
            Expression::one_of(vec![Expression::reference("photos_photo"), Expression::reference("video_video")]),
        ),
        object("users_fields", string()),
        object("owner_ids", Expression::array(int())),
    ];

    let responses = vec![
        object("users_get_response", Expression::array(Expression::reference("message"))),
        object(
            "users_get_extended_response",
            inline(vec![prop("count", int()), prop("items", Expression::array(Expression::reference("message")))]),
        ),
        object("base_ok_response", int()),
        object("messages_delete_response", Expression::base(BaseKind::Object)),
    ];

    let methods = vec![
        method(
            "users.get",
            vec![
                Parameter::new("user_ids", Expression::array(string())),
                Parameter::new("fields", Expression::array(Expression::reference("users_fields"))),
                Parameter::new("extended", Expression::base(BaseKind::Boolean)),
                Parameter::new("count", int()),
                Parameter::new("owner", Expression::reference("message")),
            ],
            vec![
                ResponseVariant::new("response", Expression::response_reference("users_get_response")),
                ResponseVariant::new("extendedResponse", Expression::response_reference("users_get_extended_response")),
            ],
        ),
        method(
            "account.ban",
            vec![Parameter::new("owner_id", int())],
            vec![ResponseVariant::new("response", Expression::response_reference("base_ok_response"))],
        ),
        method("messages.delete", vec![], vec![ResponseVariant::new(
            "response",
            Expression::response_reference("messages_delete_response"),
        )]),
    ];

    SchemaSet {
        objects,
        responses,
        methods,
    }
}
