// Copyright (c) 2025 - Cowboy AI, Inc.
//! Redis on ElastiCache

use serde::Deserialize;
use tracing::info;

use super::Component;
use crate::domain::invariants::{require_non_empty, require_present, ValidationResult};
use crate::engine::{Engine, Properties, ResourceDeclaration, ResourceHandle, ResourceKind};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::output::Output;

/// ElastiCache cluster parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheClusterArgs {
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    pub node_type: Option<String>,
    pub num_cache_nodes: Option<u32>,
    pub parameter_group_name: Option<String>,
    pub port: Option<u16>,

    /// Set by [`Redis::run`]
    pub subnet_group_name: Option<Output<String>>,
}

impl CacheClusterArgs {
    /// Single-node Redis cluster
    pub fn redis(engine_version: impl Into<String>, node_type: impl Into<String>) -> Self {
        Self {
            engine: Some("redis".to_string()),
            engine_version: Some(engine_version.into()),
            node_type: Some(node_type.into()),
            num_cache_nodes: Some(1),
            port: Some(6379),
            ..Default::default()
        }
    }

    fn properties(&self) -> Properties {
        Properties::new()
            .set_some("engine", self.engine.as_ref())
            .set_some("engineVersion", self.engine_version.as_ref())
            .set_some("nodeType", self.node_type.as_ref())
            .set_some("numCacheNodes", self.num_cache_nodes)
            .set_some("parameterGroupName", self.parameter_group_name.as_ref())
            .set_some("port", self.port)
            .set_some_output("subnetGroupName", self.subnet_group_name.as_ref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Redis {
    pub name: String,

    /// Subnet the cache nodes are placed in
    #[serde(skip)]
    pub subnet: Option<ResourceHandle>,

    pub args: Option<CacheClusterArgs>,

    #[serde(skip)]
    pub out: Option<RedisOut>,
}

#[derive(Debug, Clone)]
pub struct RedisOut {
    pub subnet_group: ResourceHandle,
    pub cache: ResourceHandle,
}

impl Component for Redis {
    fn component_type(&self) -> &'static str {
        "Redis"
    }

    fn validate(&self) -> ValidationResult {
        require_non_empty("Redis.Name", &self.name)?;
        require_present("Redis.Args", self.args.as_ref())?;
        require_present("Redis.Subnet", self.subnet.as_ref())?;
        Ok(())
    }

    fn run(&mut self, engine: &dyn Engine) -> InfrastructureResult<()> {
        self.validate()?;
        info!("Declaring Redis cluster {}", self.name);

        let subnet = self
            .subnet
            .as_ref()
            .ok_or_else(|| InfrastructureError::missing("Redis.Subnet"))?;

        let subnet_group_name = format!("{}-subnet", self.name);
        let subnet_group = engine.register(
            ResourceDeclaration::new(ResourceKind::ElastiCacheSubnetGroup, &subnet_group_name)
                .properties(
                    Properties::new()
                        .set("name", &subnet_group_name)
                        .set_output("subnetIds", &subnet.id().apply(|id| vec![id])),
                )
                .depends_on([subnet]),
        )?;

        let args = self
            .args
            .as_mut()
            .ok_or_else(|| InfrastructureError::missing("Redis.Args"))?;
        args.subnet_group_name = Some(subnet_group.string_output("name"));

        let cache = engine.register(
            ResourceDeclaration::new(ResourceKind::ElastiCacheCluster, &self.name)
                .properties(args.properties())
                .depends_on([&subnet_group]),
        )?;

        self.out = Some(RedisOut {
            subnet_group,
            cache,
        });
        Ok(())
    }
}
