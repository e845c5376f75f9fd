// Copyright (c) 2025 - Cowboy AI, Inc.
//! Application Load Balancer
//!
//! An internet-facing ALB in the two public subnets of a [`VpcOut`],
//! terminating TLS with the certificates of one or more [`HttpsOut`]s and
//! forwarding to an `ip` target group on port 80.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, info};

use super::https::HttpsOut;
use super::vpc::VpcOut;
use super::Component;
use crate::domain::invariants::{require_at_least, require_non_empty, require_present, ValidationResult};
use crate::domain::CidrBlock;
use crate::engine::{Engine, Properties, ResourceDeclaration, ResourceHandle, ResourceKind};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::output::{all2, Output};

/// TLS policy of the HTTPS listener
pub const SSL_POLICY: &str = "ELBSecurityPolicy-FS-1-2-Res-2020-10";

/// Target group health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub enabled: bool,
    pub path: String,
    pub protocol: String,
    pub port: String,
    pub healthy_threshold: u32,
    pub unhealthy_threshold: u32,
    pub timeout: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matcher: Option<String>,
}

impl Default for HealthCheck {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/health".to_string(),
            protocol: "HTTP".to_string(),
            port: "80".to_string(),
            healthy_threshold: 5,
            unhealthy_threshold: 5,
            timeout: 5,
            interval: None,
            matcher: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoadBalancer {
    pub name: String,

    #[serde(skip)]
    pub vpc: Option<VpcOut>,

    /// Certificates served by the listener; the first one is the default
    #[serde(skip)]
    pub https: Vec<HttpsOut>,

    /// Defaults to [`HealthCheck::default`] when the load balancer runs
    pub health_check: Option<HealthCheck>,

    /// S3 bucket receiving access logs
    pub log_bucket: Option<Output<String>>,
    pub log_prefix: Option<String>,

    #[serde(skip)]
    pub out: Option<LoadBalancerOut>,
}

#[derive(Debug, Clone)]
pub struct LoadBalancerOut {
    pub security_group: ResourceHandle,
    pub lb: ResourceHandle,
    pub target_group: ResourceHandle,
    pub listener: ResourceHandle,
    pub listener_certificates: Vec<ResourceHandle>,
}

impl LoadBalancerOut {
    pub fn dns_name(&self) -> Output<String> {
        self.lb.string_output("dnsName")
    }
}

fn security_group_rule(protocol: &str, port: u16) -> Value {
    json!({
        "protocol": protocol,
        "fromPort": port,
        "toPort": port,
        "cidrBlocks": [CidrBlock::anywhere().to_string()],
    })
}

impl LoadBalancer {
    fn access_logs(&self) -> Option<Output<Value>> {
        let prefix = self.log_prefix.clone();

        self.log_bucket.as_ref().map(|bucket| {
            bucket.apply(move |bucket| {
                let mut access_logs = Map::new();
                access_logs.insert("enabled".into(), json!(true));
                access_logs.insert("bucket".into(), json!(bucket));
                if let Some(prefix) = prefix {
                    access_logs.insert("prefix".into(), json!(prefix));
                }
                Value::Object(access_logs)
            })
        })
    }
}

impl Component for LoadBalancer {
    fn component_type(&self) -> &'static str {
        "LoadBalancer"
    }

    /// Leaves `health_check` untouched; [`Component::run`] fills in
    /// [`HealthCheck::default`] when none is given.
    fn validate(&self) -> ValidationResult {
        require_non_empty("LoadBalancer.Name", &self.name)?;
        require_present("LoadBalancer.VPC", self.vpc.as_ref())?;
        require_at_least("LoadBalancer.HTTPS", &self.https, 1)?;
        Ok(())
    }

    fn run(&mut self, engine: &dyn Engine) -> InfrastructureResult<()> {
        self.validate()?;
        info!("Declaring load balancer {}", self.name);

        let health_check = self.health_check.get_or_insert_with(HealthCheck::default).clone();
        let vpc = self
            .vpc
            .as_ref()
            .ok_or_else(|| InfrastructureError::missing("LoadBalancer.VPC"))?;
        let Some((default_https, additional_https)) = self.https.split_first() else {
            return Err(InfrastructureError::missing("LoadBalancer.HTTPS"));
        };

        let security_group = engine.register(
            ResourceDeclaration::new(ResourceKind::SecurityGroup, format!("{}-sg", self.name))
                .properties(
                    Properties::new()
                        .set_output("vpcId", &vpc.id())
                        .set("egress", json!([security_group_rule("-1", 0)]))
                        .set(
                            "ingress",
                            json!([security_group_rule("tcp", 443), security_group_rule("tcp", 80)]),
                        ),
                ),
        )?;

        let lb_name = format!("{}-lb", self.name);
        let public_subnets = all2(&vpc.public_subnets[0].id(), &vpc.public_subnets[1].id())
            .apply(|(first, second)| vec![first, second]);
        let access_logs = self.access_logs();
        let lb = engine.register(
            ResourceDeclaration::new(ResourceKind::LoadBalancer, &lb_name).properties(
                Properties::new()
                    .set_output("subnets", &public_subnets)
                    .set("name", &lb_name)
                    .set("loadBalancerType", "application")
                    .set("ipAddressType", "ipv4")
                    .set_output("securityGroups", &security_group.id().apply(|id| vec![id]))
                    .set("dropInvalidHeaderFields", true)
                    .set("enableDeletionProtection", true)
                    .set_some_output("accessLogs", access_logs.as_ref()),
            ),
        )?;

        let tg_name = format!("{}-tg", self.name);
        let target_group = engine.register(
            ResourceDeclaration::new(ResourceKind::TargetGroup, &tg_name).properties(
                Properties::new()
                    .set("name", &tg_name)
                    .set("port", 80)
                    .set("protocol", "HTTP")
                    .set_output("vpcId", &vpc.id())
                    .set("targetType", "ip")
                    .set("deregistrationDelay", 30)
                    .set("healthCheck", &health_check),
            ),
        )?;

        let default_action = target_group
            .arn()
            .apply(|arn| json!([{ "type": "forward", "targetGroupArn": arn }]));
        let listener = engine.register(
            ResourceDeclaration::new(ResourceKind::Listener, format!("{}-listener", self.name))
                .properties(
                    Properties::new()
                        .set_output("loadBalancerArn", &lb.arn())
                        .set("port", 443)
                        .set("protocol", "HTTPS")
                        .set("sslPolicy", SSL_POLICY)
                        .set_output("certificateArn", &default_https.cert.arn())
                        .set_output("defaultActions", &default_action),
                ),
        )?;

        let mut listener_certificates = Vec::with_capacity(additional_https.len());
        for (offset, https) in additional_https.iter().enumerate() {
            let name = format!("{}-listener-cert-{}", self.name, offset + 1);
            debug!("Attaching certificate {} to {}", https.cert.name(), listener.name());

            listener_certificates.push(engine.register(
                ResourceDeclaration::new(ResourceKind::ListenerCertificate, name).properties(
                    Properties::new()
                        .set_output("listenerArn", &listener.arn())
                        .set_output("certificateArn", &https.cert.arn()),
                ),
            )?);
        }

        self.out = Some(LoadBalancerOut {
            security_group,
            lb,
            target_group,
            listener,
            listener_certificates,
        });

        Ok(())
    }
}
