// Copyright (c) 2025 - Cowboy AI, Inc.
//! AWS infrastructure components for the Composable Information Machine
//!
//! Declarative helpers that validate a configuration and declare the AWS
//! resources behind it (VPC, ECS cluster, Fargate services, RDS Postgres,
//! ElastiCache Redis, ALB, ACM certificates, ECR images) against an
//! orchestration [`engine::Engine`].
//!
//! # Modules
//!
//! - [`output`] - deferred values resolved once their producers exist
//! - [`engine`] - the engine seam, a local engine and a simulated provider
//! - [`domain`] - value objects with validation invariants
//! - [`aws`] - the components
//! - [`docker_labels`] - `LABEL` extraction from Dockerfiles
//! - [`config`] / [`stack`] - whole-stack configuration and wiring

pub mod aws;
pub mod config;
pub mod docker_labels;
pub mod domain;
pub mod engine;
pub mod errors;
pub mod output;
pub mod stack;

// Re-export commonly used types
pub use aws::Component;
pub use config::StackConfig;
pub use docker_labels::DockerLabelExtractor;
pub use engine::{Engine, LocalEngine, SimulatedProvider};
pub use errors::{InfrastructureError, InfrastructureResult};
pub use output::Output;
pub use stack::Stack;
