// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Configuration
//!
//! A stack is described by one JSON document mirroring the component
//! configurations. Deferred fields (`cluster`, `target_group_arn`, ...) take
//! literal values here.
//!
//! ```json
//! {
//!   "name": "staging",
//!   "region": "us-east-1",
//!   "vpc": {
//!     "name": "main",
//!     "cidr_block": "10.0.0.0/16",
//!     "public_subnet_cidr_blocks": ["10.0.1.0/24", "10.0.2.0/24"],
//!     "private_subnet_cidr_blocks": ["10.0.3.0/24", "10.0.4.0/24"]
//!   },
//!   "ecs": { "name": "main" },
//!   "services": [{
//!     "name": "api",
//!     "docker": { "context": "./api" },
//!     "task": { "cpu": "256", "memory": "512" },
//!     "service": { "desired_count": 2 },
//!     "labels_from_dockerfile": "./api/Dockerfile",
//!     "load_balancer_port": 8080
//!   }]
//! }
//! ```
//!
//! # Environment
//!
//! - `CIM_STACK_CONFIG` - path of the configuration file (default `stack.json`)
//! - `AWS_REGION` - overrides `region`

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::aws::{Ecs, Https, LoadBalancer, Postgres, Redis, Service, Vpc};
use crate::engine::SimulatedProviderConfig;
use crate::errors::{InfrastructureError, InfrastructureResult};

/// Environment variable naming the configuration file
pub const CONFIG_PATH_ENV: &str = "CIM_STACK_CONFIG";

/// Configuration file used when [`CONFIG_PATH_ENV`] is unset
pub const DEFAULT_CONFIG_PATH: &str = "stack.json";

/// Environment variable overriding the stack region
pub const REGION_ENV: &str = "AWS_REGION";

#[derive(Debug, Clone, Deserialize)]
pub struct StackConfig {
    /// Stack name, part of every resource URN
    pub name: String,

    /// Region of every component that does not set its own
    pub region: String,

    pub vpc: Vpc,

    #[serde(default)]
    pub ecs: Option<Ecs>,

    #[serde(default)]
    pub https: Vec<Https>,

    #[serde(default)]
    pub load_balancer: Option<LoadBalancer>,

    #[serde(default)]
    pub postgres: Option<Postgres>,

    #[serde(default)]
    pub redis: Option<Redis>,

    #[serde(default)]
    pub services: Vec<ServiceConfig>,

    /// Account and region of the simulated provider used for previews
    #[serde(default)]
    pub provider: SimulatedProviderConfig,
}

/// A service plus how it is wired into the rest of the stack
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(flatten)]
    pub service: Service,

    /// Dockerfile whose `LABEL`s become the service's docker labels
    #[serde(default)]
    pub labels_from_dockerfile: Option<PathBuf>,

    /// Container port registered with the stack's load balancer
    #[serde(default)]
    pub load_balancer_port: Option<u16>,
}

impl StackConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> InfrastructureResult<Self> {
        let path = path.as_ref();
        debug!("Loading stack configuration from {}", path.display());

        let contents = std::fs::read_to_string(path).map_err(|e| InfrastructureError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        Self::from_json(&contents)
    }

    /// Parse configuration from JSON text
    pub fn from_json(contents: &str) -> InfrastructureResult<Self> {
        serde_json::from_str(contents)
            .map_err(|e| InfrastructureError::Configuration(format!("invalid stack configuration: {e}")))
    }

    /// Load configuration from environment variables
    pub fn from_env() -> InfrastructureResult<Self> {
        let path =
            std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::from_file(&path)?;

        if let Ok(region) = std::env::var(REGION_ENV) {
            debug!("Region overridden by {}: {}", REGION_ENV, region);
            config.region = region;
        }

        Ok(config)
    }
}
