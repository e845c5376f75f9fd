// Copyright (c) 2025 - Cowboy AI, Inc.
//! Provider - the cloud side of the engine
//!
//! A provider receives fully resolved resource inputs and returns the
//! resource's state: the inputs merged with whatever the cloud computed
//! (`id`, `arn`, endpoints, ...).
//!
//! # Example Implementation
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use cim_infrastructure_aws::engine::{Provider, ResourceKind};
//! use cim_infrastructure_aws::InfrastructureResult;
//! use serde_json::{json, Value};
//!
//! struct EchoProvider;
//!
//! #[async_trait]
//! impl Provider for EchoProvider {
//!     async fn create(&self, _kind: ResourceKind, name: &str, inputs: Value) -> InfrastructureResult<Value> {
//!         let mut state = inputs;
//!         state["id"] = json!(name);
//!         Ok(state)
//!     }
//!
//!     async fn invoke(&self, _token: &str, args: Value) -> InfrastructureResult<Value> {
//!         Ok(args)
//!     }
//!
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//! }
//! ```

use async_trait::async_trait;
use serde_json::Value;

use super::ResourceKind;
use crate::errors::InfrastructureResult;

/// Cloud provider the engine delegates resource creation to
///
/// Implementations must be idempotent per `(kind, name)`: the engine is the
/// system of record and may converge the same declaration again on a later
/// run.
#[async_trait]
pub trait Provider: Send + Sync + 'static {
    /// Create (or converge) one resource from its resolved inputs
    async fn create(&self, kind: ResourceKind, name: &str, inputs: Value) -> InfrastructureResult<Value>;

    /// Run a data-source lookup
    async fn invoke(&self, token: &str, args: Value) -> InfrastructureResult<Value>;

    /// Get the name of this provider
    fn name(&self) -> &str;
}
