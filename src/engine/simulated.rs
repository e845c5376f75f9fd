// Copyright (c) 2025 - Cowboy AI, Inc.
//! Simulated AWS provider
//!
//! Fabricates provider-computed outputs (`id`, `arn`, endpoints, validation
//! records, registry credentials) so stacks can be previewed and tested
//! without an AWS account. Identifiers are random; names, ARNs and endpoints
//! follow the AWS formats.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

use super::{invoke, Provider, ResourceKind};
use crate::errors::{InfrastructureError, InfrastructureResult};

/// Configuration for the simulated provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedProviderConfig {
    /// AWS account the fabricated ARNs belong to
    pub account_id: String,

    /// Region the fabricated ARNs and endpoints belong to
    pub region: String,
}

impl Default for SimulatedProviderConfig {
    fn default() -> Self {
        Self {
            account_id: "123456789012".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

/// Provider that fabricates plausible AWS state
pub struct SimulatedProvider {
    config: SimulatedProviderConfig,
    failing: HashSet<String>,
    authorization_token: Option<String>,
    created: Mutex<Vec<(ResourceKind, String)>>,
}

impl SimulatedProvider {
    pub fn new(config: SimulatedProviderConfig) -> Self {
        Self {
            config,
            failing: HashSet::new(),
            authorization_token: None,
            created: Mutex::new(Vec::new()),
        }
    }

    /// Reject creation of the named resource
    pub fn fail_on(mut self, name: impl Into<String>) -> Self {
        self.failing.insert(name.into());
        self
    }

    /// Hand out this ECR authorization token instead of a generated one
    pub fn with_authorization_token(mut self, token: impl Into<String>) -> Self {
        self.authorization_token = Some(token.into());
        self
    }

    pub fn config(&self) -> &SimulatedProviderConfig {
        &self.config
    }

    /// Resources created so far, in creation order
    pub fn created(&self) -> Vec<(ResourceKind, String)> {
        self.created.lock().clone()
    }

    fn arn(&self, service: &str, resource: &str) -> String {
        format!(
            "arn:aws:{}:{}:{}:{}",
            service, self.config.region, self.config.account_id, resource
        )
    }

    fn computed_outputs(&self, kind: ResourceKind, name: &str, inputs: &Map<String, Value>) -> InfrastructureResult<Map<String, Value>> {
        let region = &self.config.region;
        let account = &self.config.account_id;
        let input_str = |key: &str| inputs.get(key).and_then(Value::as_str).map(str::to_string);
        let id = format!("{}-{}", id_prefix(kind), short_id());

        let mut outputs = Map::new();
        match kind {
            ResourceKind::Vpc => {
                outputs.insert("arn".into(), json!(self.arn("ec2", &format!("vpc/{id}"))));
            }
            ResourceKind::Subnet => {
                outputs.insert("arn".into(), json!(self.arn("ec2", &format!("subnet/{id}"))));
            }
            ResourceKind::Eip => {
                outputs.insert("publicIp".into(), json!("203.0.113.10"));
            }
            ResourceKind::SecurityGroup => {
                outputs.insert("arn".into(), json!(self.arn("ec2", &format!("security-group/{id}"))));
            }
            ResourceKind::EcsCluster => {
                let cluster = input_str("name").unwrap_or_else(|| name.to_string());
                outputs.insert("arn".into(), json!(self.arn("ecs", &format!("cluster/{cluster}"))));
            }
            ResourceKind::IamRole => {
                let role = input_str("name").unwrap_or_else(|| name.to_string());
                outputs.insert("name".into(), json!(role));
                outputs.insert("arn".into(), json!(format!("arn:aws:iam::{account}:role/{role}")));
            }
            ResourceKind::EcrRepository => {
                let repo = input_str("name").unwrap_or_else(|| name.to_string());
                outputs.insert("arn".into(), json!(self.arn("ecr", &format!("repository/{repo}"))));
                outputs.insert("registryId".into(), json!(account));
                outputs.insert(
                    "repositoryUrl".into(),
                    json!(format!("{account}.dkr.ecr.{region}.amazonaws.com/{repo}")),
                );
            }
            ResourceKind::DockerImage => {
                let base = input_str("imageName").ok_or_else(|| {
                    InfrastructureError::coercion(format!("{name}.imageName"), "imageName input not present")
                })?;
                outputs.insert("baseImageName".into(), json!(base));
                outputs.insert("imageName".into(), json!(format!("{base}:latest")));
            }
            ResourceKind::LogGroup => {
                let group = input_str("name").unwrap_or_else(|| name.to_string());
                outputs.insert("arn".into(), json!(self.arn("logs", &format!("log-group:{group}"))));
            }
            ResourceKind::TaskDefinition => {
                let family = input_str("family").unwrap_or_else(|| name.to_string());
                outputs.insert("revision".into(), json!(1));
                outputs.insert("arn".into(), json!(self.arn("ecs", &format!("task-definition/{family}:1"))));
            }
            ResourceKind::EcsService => {
                outputs.insert("arn".into(), json!(self.arn("ecs", &format!("service/{name}"))));
            }
            ResourceKind::LoadBalancer => {
                let lb = input_str("name").unwrap_or_else(|| name.to_string());
                outputs.insert("arn".into(), json!(self.arn("elasticloadbalancing", &format!("loadbalancer/app/{lb}/{}", short_id()))));
                outputs.insert("dnsName".into(), json!(format!("{lb}-{}.{region}.elb.amazonaws.com", short_id())));
            }
            ResourceKind::TargetGroup => {
                let tg = input_str("name").unwrap_or_else(|| name.to_string());
                outputs.insert("arn".into(), json!(self.arn("elasticloadbalancing", &format!("targetgroup/{tg}/{}", short_id()))));
            }
            ResourceKind::Listener => {
                outputs.insert("arn".into(), json!(self.arn("elasticloadbalancing", &format!("listener/app/{name}/{}", short_id()))));
            }
            ResourceKind::RdsSubnetGroup | ResourceKind::ElastiCacheSubnetGroup => {
                let group = input_str("name").unwrap_or_else(|| name.to_string());
                outputs.insert("name".into(), json!(group));
            }
            ResourceKind::RdsInstance => {
                let address = format!("{name}.{}.{region}.rds.amazonaws.com", short_id());
                outputs.insert("arn".into(), json!(self.arn("rds", &format!("db:{name}"))));
                outputs.insert("address".into(), json!(address));
                outputs.insert("endpoint".into(), json!(format!("{address}:5432")));
                outputs.insert("port".into(), json!(5432));
            }
            ResourceKind::ElastiCacheCluster => {
                let port = inputs.get("port").cloned().unwrap_or(json!(6379));
                outputs.insert("arn".into(), json!(self.arn("elasticache", &format!("cluster:{name}"))));
                outputs.insert(
                    "cacheNodes".into(),
                    json!([{ "id": "0001", "address": format!("{name}.{}.cache.amazonaws.com", short_id()), "port": port }]),
                );
            }
            ResourceKind::AcmCertificate => {
                let domain = input_str("domainName").ok_or_else(|| {
                    InfrastructureError::coercion(format!("{name}.domainName"), "domainName input not present")
                })?;
                let alternatives: Vec<String> = inputs
                    .get("subjectAlternativeNames")
                    .and_then(Value::as_array)
                    .map(|names| names.iter().filter_map(Value::as_str).map(str::to_string).collect())
                    .unwrap_or_default();

                let options: Vec<Value> = std::iter::once(domain)
                    .chain(alternatives)
                    .map(|domain| {
                        let token = short_id();
                        json!({
                            "domainName": domain,
                            "resourceRecordName": format!("_{token}.{domain}."),
                            "resourceRecordType": "CNAME",
                            "resourceRecordValue": format!("_{token}.acm-validations.aws."),
                        })
                    })
                    .collect();

                outputs.insert("arn".into(), json!(self.arn("acm", &format!("certificate/{}", Uuid::now_v7()))));
                outputs.insert("domainValidationOptions".into(), Value::Array(options));
            }
            ResourceKind::Route53Record => {
                let record = input_str("name").unwrap_or_else(|| name.to_string());
                outputs.insert("fqdn".into(), json!(record.trim_end_matches('.')));
            }
            ResourceKind::InternetGateway
            | ResourceKind::NatGateway
            | ResourceKind::RouteTable
            | ResourceKind::RouteTableAssociation
            | ResourceKind::IamRolePolicyAttachment
            | ResourceKind::ListenerCertificate => {}
        }

        outputs.insert("id".into(), json!(id));
        Ok(outputs)
    }
}

#[async_trait]
impl Provider for SimulatedProvider {
    async fn create(&self, kind: ResourceKind, name: &str, inputs: Value) -> InfrastructureResult<Value> {
        if self.failing.contains(name) {
            return Err(InfrastructureError::upstream(
                format!("create {kind} {name}"),
                "simulated provider failure",
            ));
        }

        let mut state = match inputs {
            Value::Object(map) => map,
            other => {
                return Err(InfrastructureError::coercion(
                    format!("{name} inputs"),
                    format!("expected object, got {other}"),
                ))
            }
        };

        let outputs = self.computed_outputs(kind, name, &state)?;
        state.extend(outputs);

        debug!("Simulated create of {} {}", kind, name);
        self.created.lock().push((kind, name.to_string()));

        Ok(Value::Object(state))
    }

    async fn invoke(&self, token: &str, args: Value) -> InfrastructureResult<Value> {
        match token {
            invoke::ECR_GET_CREDENTIALS => {
                let registry_id = args
                    .get("registryId")
                    .and_then(Value::as_str)
                    .unwrap_or(&self.config.account_id)
                    .to_string();
                let token = self
                    .authorization_token
                    .clone()
                    .unwrap_or_else(|| STANDARD.encode(format!("AWS:{}", Uuid::now_v7().simple())));

                Ok(json!({
                    "registryId": registry_id,
                    "authorizationToken": token,
                    "proxyEndpoint": format!("https://{}.dkr.ecr.{}.amazonaws.com", registry_id, self.config.region),
                }))
            }
            invoke::ROUTE53_GET_ZONE => {
                let name = args.get("name").and_then(Value::as_str).ok_or_else(|| {
                    InfrastructureError::upstream(token, "zone name is required")
                })?;

                Ok(json!({
                    "zoneId": format!("Z{}", short_id().to_uppercase()),
                    "name": name,
                    "privateZone": args.get("privateZone").cloned().unwrap_or(json!(false)),
                }))
            }
            other => Err(InfrastructureError::upstream(other, "unknown data source")),
        }
    }

    fn name(&self) -> &str {
        "simulated"
    }
}

fn id_prefix(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Vpc => "vpc",
        ResourceKind::Subnet => "subnet",
        ResourceKind::InternetGateway => "igw",
        ResourceKind::Eip => "eipalloc",
        ResourceKind::NatGateway => "nat",
        ResourceKind::RouteTable => "rtb",
        ResourceKind::RouteTableAssociation => "rtbassoc",
        ResourceKind::SecurityGroup => "sg",
        ResourceKind::EcsCluster => "cluster",
        ResourceKind::IamRole => "role",
        ResourceKind::IamRolePolicyAttachment => "rpa",
        ResourceKind::EcrRepository => "repo",
        ResourceKind::DockerImage => "image",
        ResourceKind::LogGroup => "lg",
        ResourceKind::TaskDefinition => "td",
        ResourceKind::EcsService => "svc",
        ResourceKind::LoadBalancer => "alb",
        ResourceKind::TargetGroup => "tg",
        ResourceKind::Listener => "lsn",
        ResourceKind::ListenerCertificate => "lsncert",
        ResourceKind::RdsSubnetGroup => "dbsubnet",
        ResourceKind::RdsInstance => "db",
        ResourceKind::ElastiCacheSubnetGroup => "cachesubnet",
        ResourceKind::ElastiCacheCluster => "cache",
        ResourceKind::AcmCertificate => "cert",
        ResourceKind::Route53Record => "record",
    }
}

/// Random 17-hex-digit suffix, the length EC2 uses for resource IDs
fn short_id() -> String {
    let hex = Uuid::now_v7().simple().to_string();
    hex[hex.len() - 17..].to_string()
}
