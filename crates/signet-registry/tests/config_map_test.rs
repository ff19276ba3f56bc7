//! Integration tests for registry configuration semantics.
//!
//! Exercises default application, strict unknown-option handling,
//! fail-fast setter errors, and introspection against a representative
//! provider with mixed option kinds.

use signet_registry::{ConfigMap, ConfigOption, OptionApplyError, OptionValue, Registry, RegistryError};

/// Minimal provider with one option of each declared kind.
#[derive(Debug, Default, Clone, PartialEq)]
struct FakeProvider {
    endpoint: String,
    retries: i64,
    verbose: bool,
}

fn fake_options() -> Vec<ConfigOption<FakeProvider>> {
    vec![
        ConfigOption::string(
            "endpoint",
            "Endpoint URL",
            "http://localhost:9000",
            |p: &mut FakeProvider, v| {
                p.endpoint = v;
                Ok(())
            },
        ),
        ConfigOption::integer("retries", "Retry budget", 3, |p: &mut FakeProvider, v| {
            if v < 0 {
                return Err(OptionApplyError::invalid("retries cannot be negative"));
            }
            p.retries = v;
            Ok(())
        }),
        ConfigOption::bool("verbose", "Verbose logging", false, |p: &mut FakeProvider, v| {
            p.verbose = v;
            Ok(())
        }),
    ]
}

fn registry() -> Registry<FakeProvider> {
    let mut registry = Registry::new();
    registry
        .register("fake", FakeProvider::default, fake_options(), |p| p)
        .unwrap();
    registry
}

fn config(entries: &[(&str, OptionValue)]) -> ConfigMap {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

#[test]
fn empty_map_applies_exactly_the_defaults() {
    let built = registry()
        .build_from_config_map("fake", &ConfigMap::new())
        .unwrap();

    assert_eq!(built, FakeProvider {
        endpoint: "http://localhost:9000".to_string(),
        retries: 3,
        verbose: false,
    });
}

#[test]
fn caller_values_override_defaults() {
    let built = registry()
        .build_from_config_map(
            "fake",
            &config(&[
                ("endpoint", OptionValue::from("http://archive:8082")),
                ("retries", OptionValue::from(7_i64)),
            ]),
        )
        .unwrap();

    assert_eq!(built.endpoint, "http://archive:8082");
    assert_eq!(built.retries, 7);
    // Untouched option keeps its default.
    assert!(!built.verbose);
}

#[test]
fn unknown_type_is_rejected() {
    let err = registry()
        .build_from_config_map("nonexistent", &ConfigMap::new())
        .unwrap_err();

    assert!(matches!(err, RegistryError::UnknownType { type_name } if type_name == "nonexistent"));
}

#[test]
fn unknown_option_fails_the_whole_build() {
    let err = registry()
        .build_from_config_map(
            "fake",
            &config(&[
                ("endpoint", OptionValue::from("http://archive:8082")),
                ("retrys", OptionValue::from(7_i64)),
            ]),
        )
        .unwrap_err();

    assert!(matches!(err, RegistryError::UnknownOption { option, .. } if option == "retrys"));
}

#[test]
fn setter_failure_aborts_option_application() {
    let err = registry()
        .build_from_config_map("fake", &config(&[("retries", OptionValue::from(-1_i64))]))
        .unwrap_err();

    match err {
        RegistryError::OptionApply { option, source, .. } => {
            assert_eq!(option, "retries");
            assert!(source.to_string().contains("negative"));
        },
        other => panic!("expected OptionApply, got {other:?}"),
    }
}

#[test]
fn mismatched_value_kind_is_rejected() {
    let err = registry()
        .build_from_config_map("fake", &config(&[("endpoint", OptionValue::from(true))]))
        .unwrap_err();

    match err {
        RegistryError::OptionApply { source, .. } => {
            assert!(matches!(source, OptionApplyError::WrongKind { expected: "string", actual: "bool" }));
        },
        other => panic!("expected OptionApply, got {other:?}"),
    }
}

#[test]
fn declared_options_are_order_independent() {
    // The same logical configuration must produce the same instance no
    // matter which map order the caller's keys arrive in.
    let forward = registry()
        .build_from_config_map(
            "fake",
            &config(&[
                ("endpoint", OptionValue::from("http://a")),
                ("verbose", OptionValue::from(true)),
            ]),
        )
        .unwrap();
    let reversed = registry()
        .build_from_config_map(
            "fake",
            &config(&[
                ("verbose", OptionValue::from(true)),
                ("endpoint", OptionValue::from("http://a")),
            ]),
        )
        .unwrap();

    assert_eq!(forward, reversed);
}

#[test]
fn duplicate_type_registration_fails() {
    let mut registry = registry();
    let err = registry
        .register("fake", FakeProvider::default, fake_options(), |p| p)
        .unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateType { .. }));
}

#[test]
fn duplicate_option_name_fails_registration() {
    let mut registry: Registry<FakeProvider> = Registry::new();
    let options = vec![
        ConfigOption::string("endpoint", "first", "", |_, _| Ok(())),
        ConfigOption::string("endpoint", "second", "", |_, _| Ok(())),
    ];
    let err = registry
        .register("fake", FakeProvider::default, options, |p| p)
        .unwrap_err();

    assert!(matches!(err, RegistryError::DuplicateOption { option, .. } if option == "endpoint"));
}

#[test]
fn entries_iterator_is_restartable() {
    let registry = registry();

    let first: Vec<_> = registry.entries().map(|e| e.type_name.to_string()).collect();
    let second: Vec<_> = registry.entries().map(|e| e.type_name.to_string()).collect();

    assert_eq!(first, vec!["fake"]);
    assert_eq!(first, second);

    let entry = registry.entries().next().unwrap();
    let names: Vec<_> = entry.options.iter().map(|o| o.name).collect();
    assert_eq!(names, vec!["endpoint", "retries", "verbose"]);
}

#[test]
fn composite_registration_defers_backend_prefixed_keys() {
    let mut registry: Registry<FakeProvider> = Registry::new();
    registry
        .register_composite("fake", FakeProvider::default, fake_options(), |p| p)
        .unwrap();

    // Prefixed keys are someone else's business; unprefixed keys still
    // configure the provider normally.
    let built = registry
        .build_from_config_map(
            "fake",
            &config(&[
                ("retries", OptionValue::Integer(7)),
                ("vault-address", OptionValue::from("http://localhost:8200")),
                ("gcp-project", OptionValue::from("some-project")),
            ]),
        )
        .unwrap();
    assert_eq!(built.retries, 7);
}

#[test]
fn composite_registration_still_rejects_unprefixed_typos() {
    let mut registry: Registry<FakeProvider> = Registry::new();
    registry
        .register_composite("fake", FakeProvider::default, fake_options(), |p| p)
        .unwrap();

    let err = registry
        .build_from_config_map("fake", &config(&[("retrys", OptionValue::Integer(7))]))
        .unwrap_err();
    assert!(matches!(err, RegistryError::UnknownOption { option, .. } if option == "retrys"));
}
