//! Integration tests: run the resolution vectors.
//!
//! Each fixture in tests/fixtures/ has:
//! - case.json: definitions, optional merges, the autowiring mode, and the
//!   names to look up
//! - expect.json: the expected outcome for each lookup
//!
//! Lookups run in order against one registry, so a case can observe the
//! effect of earlier merges on later lookups.

use defreg_config::definitions_from_value;
use defreg_kernel::{
    AutowireDefinition, AutowireError, Definition, DefinitionRegistry, DefinitionSummary,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Case {
    #[serde(default)]
    autowiring: AutowiringMode,
    definitions: Value,
    #[serde(default)]
    steps: Vec<Step>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum AutowiringMode {
    #[default]
    Disabled,
    Passthrough,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
enum Step {
    Lookup(String),
    Merge(Value),
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct Outcome {
    name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    definition: Option<DefinitionSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

fn passthrough(_: &str, marker: AutowireDefinition) -> Result<Definition, AutowireError> {
    Ok(Definition::Object(marker.into_object()))
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("failed to read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("failed to parse {}: {e}", path.display()))
}

fn run_fixture(name: &str) {
    let dir = fixtures_dir().join(name);
    let case_path = dir.join("case.json");
    let expect_path = dir.join("expect.json");

    let case: Case = serde_json::from_value(read_json(&case_path))
        .unwrap_or_else(|e| panic!("invalid case {}: {e}", case_path.display()));
    let expected = read_json(&expect_path);

    let definitions = definitions_from_value(case.definitions).expect("definitions must parse");
    let mut registry = match case.autowiring {
        AutowiringMode::Disabled => DefinitionRegistry::new(definitions, None),
        AutowiringMode::Passthrough => DefinitionRegistry::with_autowiring(definitions, passthrough),
    }
    .expect("registry must build");

    let mut outcomes = Vec::new();
    for step in case.steps {
        match step {
            Step::Merge(document) => {
                let definitions = definitions_from_value(document).expect("merge must parse");
                registry.merge(definitions).expect("merge must apply");
            }
            Step::Lookup(lookup) => {
                let outcome = match registry.get_definition(&lookup) {
                    Ok(definition) => Outcome {
                        name: lookup,
                        definition: definition.as_ref().map(Definition::summary),
                        error: None,
                    },
                    Err(err) => Outcome {
                        name: lookup,
                        definition: None,
                        error: Some(err.to_string()),
                    },
                };
                outcomes.push(outcome);
            }
        }
    }

    let result_json = serde_json::to_value(&outcomes).expect("failed to serialize outcomes");
    assert_eq!(
        result_json,
        expected,
        "\n\nFixture: {name}\n\nGot:\n{}\n\nExpected:\n{}\n",
        serde_json::to_string_pretty(&result_json).unwrap(),
        serde_json::to_string_pretty(&expected).unwrap(),
    );
}

#[test]
fn wildcard_interface_to_impl() {
    run_fixture("wildcard_interface_to_impl");
}

#[test]
fn exact_key_precedence() {
    run_fixture("exact_key_precedence");
}

#[test]
fn declaration_order_tie_break() {
    run_fixture("declaration_order_tie_break");
}

#[test]
fn merge_layering() {
    run_fixture("merge_layering");
}

#[test]
fn autowire_passthrough() {
    run_fixture("autowire_passthrough");
}

#[test]
fn autowire_disabled() {
    run_fixture("autowire_disabled");
}

#[test]
fn separator_boundary() {
    run_fixture("separator_boundary");
}

#[test]
fn toml_document_resolves_like_json() {
    let toml_map = defreg_config::parse_definitions_toml(
        r#"
        [definitions]
        "App\\*Interface" = { "$create" = "App\\*Impl" }
        "ports" = [80, 443]
        "#,
    )
    .unwrap();
    let registry = DefinitionRegistry::new(toml_map, None).unwrap();

    let summaries: Vec<_> = ["App\\FooInterface", "ports"]
        .iter()
        .map(|name| registry.get_definition(name).unwrap().map(|d| d.summary()))
        .collect();
    insta::assert_json_snapshot!(summaries, @r###"
    [
      {
        "kind": "object",
        "name": "App\\FooInterface",
        "className": "App\\FooImpl"
      },
      {
        "kind": "array",
        "name": "ports"
      }
    ]
    "###);
}
