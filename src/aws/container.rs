// Copyright (c) 2025 - Cowboy AI, Inc.
//! ECS Container Definitions
//!
//! The JSON shape of a container definition inside a task definition's
//! `containerDefinitions` payload:
//!
//! ```text
//! {
//!   "name", "image", "command"?,
//!   "portMappings": [{ containerPort, hostPort, protocol }],
//!   "environment":  [{ name, value }],
//!   "logConfiguration": { logDriver, secretOptions, options },
//!   "dockerLabels": { .. },
//!   "linuxParameters"?: { capabilities: { add, drop } },
//!   "mountPoints"?: [{ containerPath, readOnly, sourceVolume }]
//! }
//! ```
//!
//! `portMappings` and `environment` are always emitted as arrays; a JSON
//! `null` in either position reads back as an empty list.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::domain::invariants::{require_non_empty, require_present, ValidationResult};
use crate::errors::{InfrastructureError, InfrastructureResult};

/// Log driver used by every Fargate service
pub const AWSLOGS_DRIVER: &str = "awslogs";

/// Stream prefix of every Fargate service log stream
pub const FARGATE_STREAM_PREFIX: &str = "fargate";

/// A single container specification
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerDefinition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub image: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub port_mappings: Vec<ContainerPortMapping>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub environment: Vec<ContainerEnvVar>,

    #[serde(default)]
    pub log_configuration: Option<ContainerLogConfig>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub docker_labels: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linux_parameters: Option<ContainerLinuxParameters>,

    #[serde(default, skip_serializing_if = "Vec::is_empty", deserialize_with = "null_as_default")]
    pub mount_points: Vec<ContainerMountPoint>,
}

impl ContainerDefinition {
    pub fn new(
        name: impl Into<String>,
        image: impl Into<String>,
        log_configuration: ContainerLogConfig,
    ) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            log_configuration: Some(log_configuration),
            ..Default::default()
        }
    }

    /// Validate the definition
    ///
    /// # Rules
    /// - Name must not be empty
    /// - Image must not be empty
    /// - Log configuration must be present (there is no default driver)
    ///
    /// Checked in that order; nothing else is consulted.
    pub fn validate(&self) -> ValidationResult {
        require_non_empty("ContainerDefinition.Name", &self.name)?;
        require_non_empty("ContainerDefinition.Image", &self.image)?;
        require_present(
            "ContainerDefinition.LogConfiguration",
            self.log_configuration.as_ref(),
        )?;
        Ok(())
    }

    /// Canonical JSON text of this definition
    pub fn to_json(&self) -> InfrastructureResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Port exposed by a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerPortMapping {
    pub container_port: u16,
    pub host_port: u16,
    pub protocol: String,
}

impl ContainerPortMapping {
    /// TCP mapping with matching host port, as `awsvpc` networking requires
    pub fn tcp(port: u16) -> Self {
        Self {
            container_port: port,
            host_port: port,
            protocol: "tcp".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerEnvVar {
    pub name: String,
    pub value: String,
}

/// Container log routing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerLogConfig {
    pub log_driver: String,

    /// Secret log options of any shape; `null` means none
    #[serde(default)]
    pub secret_options: Value,

    #[serde(default)]
    pub options: BTreeMap<String, Value>,
}

impl ContainerLogConfig {
    /// `awslogs` configuration writing to a CloudWatch log group
    pub fn awslogs(group: impl Into<String>, region: impl Into<String>, stream_prefix: impl Into<String>) -> Self {
        let options = BTreeMap::from([
            ("awslogs-group".to_string(), Value::String(group.into())),
            ("awslogs-region".to_string(), Value::String(region.into())),
            ("awslogs-stream-prefix".to_string(), Value::String(stream_prefix.into())),
        ]);

        Self {
            log_driver: AWSLOGS_DRIVER.to_string(),
            secret_options: Value::Null,
            options,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerLinuxParameters {
    pub capabilities: ContainerLinuxCapabilities,
}

/// Linux capabilities added to or dropped from the container's default set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContainerLinuxCapabilities {
    #[serde(default, deserialize_with = "null_as_default")]
    pub add: Vec<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub drop: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerMountPoint {
    pub container_path: String,
    #[serde(default)]
    pub read_only: bool,
    pub source_volume: String,
}

/// Environment map as the name/value list ECS expects
///
/// Consumers must not rely on the order of the list.
pub fn env_from_map(env: &BTreeMap<String, String>) -> Vec<ContainerEnvVar> {
    env.iter()
        .map(|(name, value)| ContainerEnvVar {
            name: name.clone(),
            value: value.clone(),
        })
        .collect()
}

/// Validate sidecar definitions, reporting the first invalid one
pub fn validate_sidecars(sidecars: &[ContainerDefinition]) -> ValidationResult {
    for (index, sidecar) in sidecars.iter().enumerate() {
        sidecar
            .validate()
            .map_err(|source| InfrastructureError::InvalidSidecar {
                index,
                name: sidecar.name.clone(),
                source: Box::new(source),
            })?;
    }
    Ok(())
}

/// Build the `containerDefinitions` payload of a task definition
///
/// The primary container comes first, followed by the sidecars in the order
/// given. Every definition must pass [`ContainerDefinition::validate`].
pub fn assemble_container_definitions(
    primary: &ContainerDefinition,
    sidecars: &[ContainerDefinition],
) -> InfrastructureResult<String> {
    primary.validate()?;
    validate_sidecars(sidecars)?;

    let all: Vec<&ContainerDefinition> = std::iter::once(primary).chain(sidecars).collect();
    Ok(serde_json::to_string(&all)?)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
