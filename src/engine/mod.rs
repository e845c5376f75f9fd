// Copyright (c) 2025 - Cowboy AI, Inc.
//! Orchestration Engine Seam
//!
//! Components never talk to a cloud API directly. They declare resources
//! against an [`Engine`], which turns declarations into provider calls and
//! hands back a [`ResourceHandle`] whose outputs resolve once the resource
//! exists.
//!
//! # Architecture
//!
//! ```text
//! Component::run
//!     ↓ ResourceDeclaration (kind, name, Properties, depends_on)
//! Engine::register ──> ResourceHandle { urn, state: Output<Value> }
//!     ↓ (deferred)
//! Provider::create(kind, name, resolved inputs) ──> outputs
//! ```
//!
//! Declaration is synchronous and only fails when the engine rejects the
//! declaration itself (for example a duplicate URN). Provisioning failures
//! surface through the handle's deferred state.

pub mod local;
pub mod provider;
pub mod simulated;

pub use local::{DeclarationRecord, LocalEngine, Plan, ResolvedResource};
pub use provider::Provider;
pub use simulated::{SimulatedProvider, SimulatedProviderConfig};

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::output::{all, Output};

/// Provider type token of every resource the components declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum ResourceKind {
    Vpc,
    Subnet,
    InternetGateway,
    Eip,
    NatGateway,
    RouteTable,
    RouteTableAssociation,
    SecurityGroup,
    EcsCluster,
    IamRole,
    IamRolePolicyAttachment,
    EcrRepository,
    DockerImage,
    LogGroup,
    TaskDefinition,
    EcsService,
    LoadBalancer,
    TargetGroup,
    Listener,
    ListenerCertificate,
    RdsSubnetGroup,
    RdsInstance,
    ElastiCacheSubnetGroup,
    ElastiCacheCluster,
    AcmCertificate,
    Route53Record,
}

impl ResourceKind {
    /// Engine type token, e.g. `aws:ec2/vpc:Vpc`
    pub fn token(&self) -> &'static str {
        match self {
            ResourceKind::Vpc => "aws:ec2/vpc:Vpc",
            ResourceKind::Subnet => "aws:ec2/subnet:Subnet",
            ResourceKind::InternetGateway => "aws:ec2/internetGateway:InternetGateway",
            ResourceKind::Eip => "aws:ec2/eip:Eip",
            ResourceKind::NatGateway => "aws:ec2/natGateway:NatGateway",
            ResourceKind::RouteTable => "aws:ec2/routeTable:RouteTable",
            ResourceKind::RouteTableAssociation => {
                "aws:ec2/routeTableAssociation:RouteTableAssociation"
            }
            ResourceKind::SecurityGroup => "aws:ec2/securityGroup:SecurityGroup",
            ResourceKind::EcsCluster => "aws:ecs/cluster:Cluster",
            ResourceKind::IamRole => "aws:iam/role:Role",
            ResourceKind::IamRolePolicyAttachment => {
                "aws:iam/rolePolicyAttachment:RolePolicyAttachment"
            }
            ResourceKind::EcrRepository => "aws:ecr/repository:Repository",
            ResourceKind::DockerImage => "docker:index/image:Image",
            ResourceKind::LogGroup => "aws:cloudwatch/logGroup:LogGroup",
            ResourceKind::TaskDefinition => "aws:ecs/taskDefinition:TaskDefinition",
            ResourceKind::EcsService => "aws:ecs/service:Service",
            ResourceKind::LoadBalancer => "aws:lb/loadBalancer:LoadBalancer",
            ResourceKind::TargetGroup => "aws:lb/targetGroup:TargetGroup",
            ResourceKind::Listener => "aws:lb/listener:Listener",
            ResourceKind::ListenerCertificate => "aws:lb/listenerCertificate:ListenerCertificate",
            ResourceKind::RdsSubnetGroup => "aws:rds/subnetGroup:SubnetGroup",
            ResourceKind::RdsInstance => "aws:rds/instance:Instance",
            ResourceKind::ElastiCacheSubnetGroup => "aws:elasticache/subnetGroup:SubnetGroup",
            ResourceKind::ElastiCacheCluster => "aws:elasticache/cluster:Cluster",
            ResourceKind::AcmCertificate => "aws:acm/certificate:Certificate",
            ResourceKind::Route53Record => "aws:route53/record:Record",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Data-source invocation tokens
pub mod invoke {
    pub const ECR_GET_CREDENTIALS: &str = "aws:ecr/getCredentials:getCredentials";
    pub const ROUTE53_GET_ZONE: &str = "aws:route53/getZone:getZone";
}

/// Resource inputs, each either a literal or a deferred value
///
/// Keys are kept in insertion order so declarations read the way they were
/// written.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: Vec<(String, Output<Value>)>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a literal input
    pub fn set(mut self, key: impl Into<String>, value: impl Serialize) -> Self {
        let value = match serde_json::to_value(value) {
            Ok(value) => Output::resolved(value),
            Err(e) => Output::failed(e.into()),
        };
        self.entries.push((key.into(), value));
        self
    }

    /// Set a literal input only when present
    pub fn set_some<T: Serialize>(self, key: impl Into<String>, value: Option<T>) -> Self {
        match value {
            Some(value) => self.set(key, value),
            None => self,
        }
    }

    /// Set a deferred input
    pub fn set_output<T>(mut self, key: impl Into<String>, value: &Output<T>) -> Self
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        let value = value.try_apply(|v| serde_json::to_value(v).map_err(Into::into));
        self.entries.push((key.into(), value));
        self
    }

    /// Set a deferred input only when present
    pub fn set_some_output<T>(self, key: impl Into<String>, value: Option<&Output<T>>) -> Self
    where
        T: Serialize + Clone + Send + Sync + 'static,
    {
        match value {
            Some(value) => self.set_output(key, value),
            None => self,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolve every input into one JSON object
    pub fn resolve(&self) -> Output<Value> {
        let keys: Vec<String> = self.entries.iter().map(|(key, _)| key.clone()).collect();
        let values = all(self.entries.iter().map(|(_, value)| value.clone()));

        values.apply(move |values| {
            let object: Map<String, Value> = keys.into_iter().zip(values).collect();
            Value::Object(object)
        })
    }
}

/// A request to create one resource
#[derive(Debug, Clone)]
pub struct ResourceDeclaration {
    pub kind: ResourceKind,
    pub name: String,
    pub properties: Properties,
    pub depends_on: Vec<ResourceHandle>,
}

impl ResourceDeclaration {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            properties: Properties::new(),
            depends_on: Vec::new(),
        }
    }

    pub fn properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    /// Explicit ordering on top of the data dependencies in the properties
    pub fn depends_on<'a>(mut self, handles: impl IntoIterator<Item = &'a ResourceHandle>) -> Self {
        self.depends_on.extend(handles.into_iter().cloned());
        self
    }
}

/// A declared resource and its deferred provider state
#[derive(Debug, Clone)]
pub struct ResourceHandle {
    kind: ResourceKind,
    name: String,
    urn: String,
    state: Output<Value>,
}

impl ResourceHandle {
    pub fn new(kind: ResourceKind, name: impl Into<String>, urn: impl Into<String>, state: Output<Value>) -> Self {
        Self {
            kind,
            name: name.into(),
            urn: urn.into(),
            state,
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn urn(&self) -> &str {
        &self.urn
    }

    /// Full provider state (inputs merged with provider-computed outputs)
    pub fn state(&self) -> &Output<Value> {
        &self.state
    }

    /// A single output property
    pub fn output(&self, key: &str) -> Output<Value> {
        let key = key.to_string();
        let urn = self.urn.clone();
        self.state.try_apply(move |state| {
            state
                .get(&key)
                .cloned()
                .ok_or_else(|| InfrastructureError::coercion(format!("{urn}.{key}"), "output not present"))
        })
    }

    /// A single string output property
    pub fn string_output(&self, key: &str) -> Output<String> {
        let what = format!("{}.{}", self.urn, key);
        self.output(key).try_apply(move |value| match value {
            Value::String(s) => Ok(s),
            other => Err(InfrastructureError::coercion(what, format!("expected string, got {other}"))),
        })
    }

    pub fn id(&self) -> Output<String> {
        self.string_output("id")
    }

    pub fn arn(&self) -> Output<String> {
        self.string_output("arn")
    }
}

/// The orchestration engine as seen by components
pub trait Engine: Send + Sync {
    /// Declare a resource; its outputs resolve once the provider created it
    fn register(&self, declaration: ResourceDeclaration) -> InfrastructureResult<ResourceHandle>;

    /// Invoke a provider data source (lookups, credential retrieval)
    fn invoke(&self, token: &str, args: Properties) -> Output<Value>;

    /// Publish a stack-level output
    fn export(&self, name: &str, value: Output<String>);
}

/// Read a string field out of a resolved JSON object
pub(crate) fn string_field(value: &Value, key: &str, what: &str) -> InfrastructureResult<String> {
    match value.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(other) => Err(InfrastructureError::coercion(
            what,
            format!("{key}: expected string, got {other}"),
        )),
        None => Err(InfrastructureError::coercion(what, format!("{key} not present"))),
    }
}
