//! Patch rules driven through configuration.

use std::fs;

use tempfile::TempDir;

use vkgen_define::{BaseKind, Expression, NamedDefinition, Property, SchemaSet};
use vkgen_gen::config::GeneratorConfig;
use vkgen_gen::errors::GeneratorError;
use vkgen_gen::output::{OutputUnit, generate_all, generate_and_write_all};
use vkgen_gen::patch::{PatchRule, apply_patches};

fn schema() -> SchemaSet {
    SchemaSet {
        objects: vec![NamedDefinition::new(
            "groups_group",
            Expression::object(
                vec![
                    Property::new("id", Expression::base(BaseKind::Integer)),
                    Property::new("ban_info", Expression::base(BaseKind::Object)),
                ],
                vec!["id".to_string()],
            ),
        )],
        responses: vec![NamedDefinition::new(
            "groups_get_response",
            Expression::object(
                vec![Property::new("count", Expression::base(BaseKind::Integer))],
                vec!["count".to_string()],
            ),
        )],
        methods: vec![],
    }
}

const CONFIG: &str = r#"
[patches.objects.GroupsGroup]
BanInfo = "Option<std::collections::BTreeMap<String, i64>>"

[patches.responses.GroupsGetResponse]
Count = "u32"
"#;

#[test]
fn configured_rules_rewrite_their_fields() {
    let config = GeneratorConfig::from_toml_str(CONFIG).expect("config parses");
    let units = generate_all(&schema(), &config).expect("generation succeeds");

    let objects = &units[0];
    assert_eq!(objects.unit, OutputUnit::Objects);
    assert!(objects.content.contains("pub BanInfo: Option<std::collections::BTreeMap<String, i64>>,"));
    assert!(objects.content.contains("pub ID: i64,"));

    let responses = &units[1];
    assert!(responses.content.contains("pub Count: u32,"));
}

#[test]
fn unmatched_rule_aborts_without_writing() {
    let config = GeneratorConfig::from_toml_str(
        r#"
[patches.responses.NoSuchResponse]
Count = "u32"
"#,
    )
    .expect("config parses");
    let out = TempDir::new().expect("Failed to create temp directory");

    let result = generate_and_write_all(&schema(), &config, out.path(), false);

    match result {
        Err(GeneratorError::PatchTargetNotFound { unit, declaration, missing, .. }) => {
            assert_eq!(unit, OutputUnit::Responses);
            assert_eq!(declaration, "NoSuchResponse");
            assert_eq!(missing, "declaration");
        }
        other => panic!("expected PatchTargetNotFound, got {:?}", other.map(|u| u.len())),
    }
    assert!(fs::read_dir(out.path()).expect("read output dir").next().is_none());
}

#[test]
fn missing_field_is_reported() {
    let rule = PatchRule {
        unit: OutputUnit::Objects,
        declaration: "GroupsGroup".into(),
        field: "Members".into(),
        replacement: "u32".into(),
    };
    let source = "pub struct GroupsGroup { pub ID: i64 }";

    match apply_patches(source, OutputUnit::Objects, &[rule]) {
        Err(GeneratorError::PatchTargetNotFound { field, missing, .. }) => {
            assert_eq!(field, "Members");
            assert_eq!(missing, "field");
        }
        other => panic!("expected PatchTargetNotFound, got {:?}", other),
    }
}

#[test]
fn config_file_round_trips_through_load() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("vkgen.toml");
    fs::write(&path, CONFIG).expect("write config");

    let config = GeneratorConfig::load(&path).expect("config loads");
    assert_eq!(config.patches["responses"]["GroupsGetResponse"]["Count"], "u32");
    assert!(config.casing);
}

#[test]
fn unknown_unit_in_config_is_rejected() {
    let config = GeneratorConfig::from_toml_str(
        r#"
[patches.widgets.Foo]
Bar = "u8"
"#,
    )
    .expect("config parses");

    assert!(matches!(
        generate_all(&schema(), &config),
        Err(GeneratorError::ConfigError(_))
    ));
}
