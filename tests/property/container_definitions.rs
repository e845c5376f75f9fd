// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Container Definitions
//!
//! The JSON handed to a task definition must decode back to the same
//! definitions, in the same order, for any valid set of containers.

use cim_infrastructure_aws::aws::{
    assemble_container_definitions, env_from_map, ContainerDefinition, ContainerLinuxCapabilities,
    ContainerLinuxParameters, ContainerLogConfig, ContainerMountPoint, ContainerPortMapping,
};
use proptest::prelude::*;
use serde_json::Value;

// ============================================================================
// Strategies
// ============================================================================

fn container_name() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9-]{0,20}"
}

fn port_mapping() -> impl Strategy<Value = ContainerPortMapping> {
    (1u16..=65535, 1u16..=65535, prop_oneof![Just("tcp"), Just("udp")]).prop_map(
        |(container_port, host_port, protocol)| ContainerPortMapping {
            container_port,
            host_port,
            protocol: protocol.to_string(),
        },
    )
}

/// JSON values without floats, which do not survive text encoding exactly
fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        ".{0,16}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 16, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-zA-Z]{1,8}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn log_config() -> impl Strategy<Value = ContainerLogConfig> {
    (
        container_name(),
        prop_oneof![Just("awslogs"), Just("awsfirelens"), Just("splunk")],
        json_value(),
        prop::collection::btree_map("[a-z-]{1,16}", json_value(), 0..4),
    )
        .prop_map(|(name, driver, secret_options, extra)| {
            let mut log = ContainerLogConfig::awslogs(format!("/fargate/service/{name}"), "us-east-1", "fargate");
            log.log_driver = driver.to_string();
            log.secret_options = secret_options;
            log.options.extend(extra);
            log
        })
}

fn linux_parameters() -> impl Strategy<Value = ContainerLinuxParameters> {
    (
        prop::collection::vec("[A-Z_]{1,12}", 0..4),
        prop::collection::vec("[A-Z_]{1,12}", 0..4),
    )
        .prop_map(|(add, drop)| ContainerLinuxParameters {
            capabilities: ContainerLinuxCapabilities { add, drop },
        })
}

fn mount_point() -> impl Strategy<Value = ContainerMountPoint> {
    ("/[a-z/]{1,20}", any::<bool>(), "[a-z-]{1,12}").prop_map(|(container_path, read_only, source_volume)| {
        ContainerMountPoint {
            container_path,
            read_only,
            source_volume,
        }
    })
}

fn container() -> impl Strategy<Value = ContainerDefinition> {
    (
        (
            container_name(),
            "[a-z0-9./-]{1,40}:[a-z0-9.]{1,10}",
            prop::option::of(prop::collection::vec("[a-z-]{1,10}", 0..4)),
            prop::collection::vec(port_mapping(), 0..4),
        ),
        (
            prop::collection::btree_map("[A-Z_]{1,12}", ".{0,20}", 0..6),
            prop::collection::btree_map("[a-z.]{1,20}", ".{0,20}", 0..6),
            log_config(),
            prop::option::of(linux_parameters()),
            prop::collection::vec(mount_point(), 0..3),
        ),
    )
        .prop_map(
            |((name, image, command, port_mappings), (env, docker_labels, log, linux_parameters, mount_points))| {
                ContainerDefinition {
                    command,
                    port_mappings,
                    environment: env_from_map(&env),
                    docker_labels,
                    linux_parameters,
                    mount_points,
                    ..ContainerDefinition::new(name, image, log)
                }
            },
        )
}

proptest! {
    /// Property: a definition decodes to itself
    #[test]
    fn prop_definition_json_is_lossless(def in container()) {
        let json = def.to_json().unwrap();
        let decoded: ContainerDefinition = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(decoded, def);
    }

    /// Property: assembly yields the primary followed by every sidecar in order
    #[test]
    fn prop_assembly_keeps_order(
        primary in container(),
        sidecars in prop::collection::vec(container(), 0..5),
    ) {
        let json = assemble_container_definitions(&primary, &sidecars).unwrap();
        let decoded: Vec<ContainerDefinition> = serde_json::from_str(&json).unwrap();

        prop_assert_eq!(decoded.len(), sidecars.len() + 1);
        prop_assert_eq!(&decoded[0], &primary);
        prop_assert_eq!(&decoded[1..], &sidecars[..]);
    }

    /// Property: environment variables come out sorted by name
    #[test]
    fn prop_environment_sorted(env in prop::collection::btree_map("[A-Z_]{1,12}", ".{0,20}", 0..10)) {
        let vars = env_from_map(&env);
        let names: Vec<&str> = vars.iter().map(|var| var.name.as_str()).collect();
        let expected: Vec<&str> = env.keys().map(String::as_str).collect();
        prop_assert_eq!(names, expected);
    }

    /// Property: a missing image is always reported against the definition
    #[test]
    fn prop_missing_image_rejected(name in container_name()) {
        let log = ContainerLogConfig::awslogs("/fargate/service/x", "us-east-1", "fargate");
        let def = ContainerDefinition::new(name, "", log);
        let err = def.validate().unwrap_err();
        prop_assert_eq!(err.field(), Some("ContainerDefinition.Image"));
    }
}

#[test]
fn test_empty_label_map_still_encoded() {
    let log = ContainerLogConfig::awslogs("/fargate/service/api", "us-east-1", "fargate");
    let def = ContainerDefinition::new("api", "nginx:1.27", log);
    let value: serde_json::Value = serde_json::from_str(&def.to_json().unwrap()).unwrap();
    assert_eq!(value["dockerLabels"], serde_json::json!({}));
    assert_eq!(value["environment"], serde_json::json!([]));
}
