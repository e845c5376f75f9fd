// Copyright (c) 2025 - Cowboy AI, Inc.
//! AWS Components
//!
//! Declarative helpers that validate a configuration and then declare a
//! fixed sequence of resources against an [`Engine`], threading the outputs
//! of one resource into the next.
//!
//! # Component Graph
//!
//! ```text
//! Vpc ──────┬──> Postgres
//!           ├──> Redis
//!           └──> LoadBalancer <── Https
//! Ecs ──────────> Service <──────── LoadBalancer
//!                    └── Docker (ECR repository + image)
//! ```
//!
//! Every component follows the same lifecycle: populate the configuration,
//! call [`Component::validate`], then [`Component::run`]. `run` validates
//! again and records the declared handles in the component's `out` field.

pub mod container;
pub mod db;
pub mod docker;
pub mod ecs;
pub mod https;
pub mod lb;
pub mod redis;
pub mod service;
pub mod vpc;

pub use container::{
    assemble_container_definitions, env_from_map, ContainerDefinition, ContainerEnvVar,
    ContainerLinuxCapabilities, ContainerLinuxParameters, ContainerLogConfig,
    ContainerMountPoint, ContainerPortMapping,
};
pub use db::{InstanceArgs, Postgres, PostgresOut};
pub use docker::{decode_registry_credentials, Docker, DockerBuild, DockerOut, ImageRegistry};
pub use ecs::{Ecs, EcsOut};
pub use https::{Https, HttpsOut};
pub use lb::{HealthCheck, LoadBalancer, LoadBalancerOut};
pub use redis::{CacheClusterArgs, Redis, RedisOut};
pub use service::{
    service_log_configuration, Service, ServiceArgs, ServiceLoadBalancer,
    ServiceNetworkConfiguration, ServiceOut, TaskDefinitionArgs, TaskVolume,
};
pub use vpc::{Vpc, VpcOut};

use serde_json::{json, Value};

use crate::domain::{CidrBlock, ValidationResult};
use crate::engine::Engine;
use crate::errors::{InfrastructureError, InfrastructureResult};

/// A validate-then-declare infrastructure helper
pub trait Component {
    /// Human readable component type, used in logs
    fn component_type(&self) -> &'static str;

    /// Check the configuration without declaring anything
    fn validate(&self) -> ValidationResult;

    /// Validate, then declare every resource of this component
    ///
    /// Declarations made before a failure are not withdrawn.
    fn run(&mut self, engine: &dyn Engine) -> InfrastructureResult<()>;
}

/// `{"Name": <name>}` tag set
pub(crate) fn name_tag(name: &str) -> Value {
    json!({ "Name": name })
}

/// Parse a CIDR block, reporting failures against `field`
pub(crate) fn parse_cidr(field: &str, value: &str) -> InfrastructureResult<CidrBlock> {
    value
        .parse::<CidrBlock>()
        .map_err(|e| InfrastructureError::invalid_format(field, value, e.to_string()))
}
