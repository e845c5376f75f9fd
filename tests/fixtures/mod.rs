// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for cim-infrastructure-aws
//!
//! Provides deterministic component configurations and a local engine backed
//! by the simulated provider.
//!
//! # Design Principles
//! - Fixtures are the ONLY place that constructs component configurations
//! - Each integration test builds its own engine, nothing is shared
//! - Provider-computed identifiers are random; tests assert on names and wiring

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::PathBuf;

use cim_infrastructure_aws::aws::{
    CacheClusterArgs, ContainerDefinition, ContainerLogConfig, ContainerPortMapping, DockerBuild,
    Ecs, Https, InstanceArgs, Postgres, Redis, Service, ServiceArgs, TaskDefinitionArgs, Vpc,
};
use cim_infrastructure_aws::engine::{LocalEngine, SimulatedProvider, SimulatedProviderConfig};
use cim_infrastructure_aws::Output;

pub const STACK: &str = "test";
pub const REGION: &str = "us-east-1";
pub const ZONE: &str = "example.com.";

/// Fresh engine over a default simulated provider
pub fn engine() -> LocalEngine<SimulatedProvider> {
    engine_with(SimulatedProvider::new(SimulatedProviderConfig::default()))
}

pub fn engine_with(provider: SimulatedProvider) -> LocalEngine<SimulatedProvider> {
    LocalEngine::new(STACK, provider)
}

/// Path of a file under `tests/testdata`
pub fn testdata(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join(name)
}

pub fn vpc_fixture() -> Vpc {
    Vpc {
        name: "main".to_string(),
        cidr_block: "10.0.0.0/16".to_string(),
        region: REGION.to_string(),
        public_subnet_cidr_blocks: vec!["10.0.1.0/24".to_string(), "10.0.2.0/24".to_string()],
        private_subnet_cidr_blocks: vec!["10.0.3.0/24".to_string(), "10.0.4.0/24".to_string()],
        out: None,
    }
}

pub fn ecs_fixture() -> Ecs {
    Ecs::new("main")
}

pub fn https_fixture() -> Https {
    Https::new("api", ZONE, "api.example.com")
}

pub fn https_with_sans_fixture() -> Https {
    Https {
        subject_alternative_names: vec!["www.example.com".to_string(), "admin.example.com".to_string()],
        ..Https::new("web", ZONE, "example.com")
    }
}

pub fn postgres_fixture() -> Postgres {
    Postgres {
        name: "orders".to_string(),
        args: Some(InstanceArgs {
            username: Some("orders".to_string()),
            password: Some(Output::resolved("correct-horse".to_string())),
            skip_final_snapshot: true,
            ..InstanceArgs::postgres("16.3", "db.t4g.micro")
        }),
        ..Default::default()
    }
}

pub fn redis_fixture() -> Redis {
    Redis {
        name: "sessions".to_string(),
        args: Some(CacheClusterArgs::redis("7.1", "cache.t4g.micro")),
        ..Default::default()
    }
}

pub fn log_config_fixture(group: &str) -> ContainerLogConfig {
    ContainerLogConfig::awslogs(group, REGION, "fargate")
}

pub fn sidecar_fixture(name: &str) -> ContainerDefinition {
    ContainerDefinition::new(
        name,
        format!("public.ecr.aws/{name}:latest"),
        log_config_fixture(&format!("/fargate/service/{name}")),
    )
}

pub fn service_fixture() -> Service {
    Service {
        docker: Some(DockerBuild::new("./api")),
        task: Some(TaskDefinitionArgs::fargate("256", "512")),
        service: Some(ServiceArgs {
            desired_count: Some(2),
            launch_type: Some("FARGATE".to_string()),
            ..Default::default()
        }),
        ports: vec![ContainerPortMapping::tcp(8080)],
        env: Output::resolved(BTreeMap::from([
            ("PORT".to_string(), "8080".to_string()),
            ("RUST_LOG".to_string(), "info".to_string()),
        ])),
        ..Service::new("api", REGION)
    }
}
