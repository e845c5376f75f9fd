// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fargate Service Assembler
//!
//! Builds everything one ECS service needs, in order:
//!
//! 1. ECR repository and image (via [`Docker`])
//! 2. CloudWatch log group `/fargate/service/<name>`
//! 3. Container definitions: the primary container followed by the sidecars
//! 4. Task definition `<name>-task`
//! 5. ECS service `<name>-svc` running the task definition
//!
//! The container definitions are assembled lazily, once the image name, the
//! environment and the docker labels have resolved. A sidecar that fails
//! validation at that point fails the task definition.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::container::{
    assemble_container_definitions, env_from_map, ContainerDefinition,
    ContainerLinuxParameters, ContainerLogConfig, ContainerMountPoint, ContainerPortMapping,
    FARGATE_STREAM_PREFIX,
};
use super::docker::{Docker, DockerBuild, DockerOut};
use super::Component;
use crate::domain::invariants::{require_non_empty, require_present, ValidationResult};
use crate::domain::LogRetentionDays;
use crate::engine::{Engine, Properties, ResourceDeclaration, ResourceHandle, ResourceKind};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::output::{all, all2, all3, Output};

/// Task-level resources of the task definition
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TaskDefinitionArgs {
    /// CPU units, e.g. `"256"`
    pub cpu: Option<String>,

    /// Memory in MiB, e.g. `"512"`
    pub memory: Option<String>,

    pub network_mode: Option<String>,
    pub requires_compatibilities: Vec<String>,
    pub execution_role_arn: Option<Output<String>>,
    pub task_role_arn: Option<Output<String>>,
    pub volumes: Vec<TaskVolume>,
}

impl TaskDefinitionArgs {
    /// Fargate task with `awsvpc` networking
    pub fn fargate(cpu: impl Into<String>, memory: impl Into<String>) -> Self {
        Self {
            cpu: Some(cpu.into()),
            memory: Some(memory.into()),
            network_mode: Some("awsvpc".to_string()),
            requires_compatibilities: vec!["FARGATE".to_string()],
            ..Default::default()
        }
    }

    fn properties(&self, family: &str, container_definitions: &Output<String>) -> Properties {
        Properties::new()
            .set("family", family)
            .set("tags", json!({ "Name": family }))
            .set_some("cpu", self.cpu.as_ref())
            .set_some("memory", self.memory.as_ref())
            .set_some("networkMode", self.network_mode.as_ref())
            .set("requiresCompatibilities", &self.requires_compatibilities)
            .set_some_output("executionRoleArn", self.execution_role_arn.as_ref())
            .set_output("containerDefinitions", container_definitions)
            .set("volumes", &self.volumes)
            .set_some_output("taskRoleArn", self.task_role_arn.as_ref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskVolume {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_path: Option<String>,
}

/// Service-level placement and scaling
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceArgs {
    pub cluster: Option<Output<String>>,
    pub desired_count: Option<u32>,
    pub launch_type: Option<String>,
    pub network_configuration: Option<ServiceNetworkConfiguration>,
    pub load_balancers: Vec<ServiceLoadBalancer>,

    /// Overwritten with the ARN of the declared task definition
    pub task_definition: Option<Output<String>>,

    pub health_check_grace_period_seconds: Option<u32>,
}

impl ServiceArgs {
    fn properties(&self) -> Properties {
        let network_configuration = self
            .network_configuration
            .as_ref()
            .map(ServiceNetworkConfiguration::to_value);

        let mut properties = Properties::new()
            .set_some_output("cluster", self.cluster.as_ref())
            .set_some("desiredCount", self.desired_count)
            .set_some("launchType", self.launch_type.as_ref())
            .set_some_output("networkConfiguration", network_configuration.as_ref());

        if !self.load_balancers.is_empty() {
            let load_balancers = all(self.load_balancers.iter().map(ServiceLoadBalancer::to_value));
            properties = properties.set_output("loadBalancers", &load_balancers);
        }

        properties
            .set_some_output("taskDefinition", self.task_definition.as_ref())
            .set_some(
                "healthCheckGracePeriodSeconds",
                self.health_check_grace_period_seconds,
            )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceNetworkConfiguration {
    pub subnets: Vec<Output<String>>,
    pub security_groups: Vec<Output<String>>,
    pub assign_public_ip: bool,
}

impl ServiceNetworkConfiguration {
    fn to_value(&self) -> Output<Value> {
        let assign_public_ip = self.assign_public_ip;
        let subnets = all(self.subnets.iter().cloned());
        let security_groups = all(self.security_groups.iter().cloned());

        all2(&subnets, &security_groups).apply(move |(subnets, security_groups)| {
            json!({
                "subnets": subnets,
                "securityGroups": security_groups,
                "assignPublicIp": assign_public_ip,
            })
        })
    }
}

/// Target group registration of one container port
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceLoadBalancer {
    pub target_group_arn: Output<String>,
    pub container_name: String,
    pub container_port: u16,
}

impl ServiceLoadBalancer {
    fn to_value(&self) -> Output<Value> {
        let container_name = self.container_name.clone();
        let container_port = self.container_port;

        self.target_group_arn.apply(move |target_group_arn| {
            json!({
                "targetGroupArn": target_group_arn,
                "containerName": container_name,
                "containerPort": container_port,
            })
        })
    }
}

/// One Fargate service and everything it runs on
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Service {
    pub name: String,
    pub region: String,

    pub docker: Option<DockerBuild>,
    pub task: Option<TaskDefinitionArgs>,
    pub service: Option<ServiceArgs>,

    pub ports: Vec<ContainerPortMapping>,
    pub linux_parameters: Option<ContainerLinuxParameters>,
    pub mount_points: Vec<ContainerMountPoint>,

    /// Extra containers placed after the primary one
    pub sidecar_containers: Vec<ContainerDefinition>,

    pub env: Output<BTreeMap<String, String>>,
    pub docker_labels: Output<BTreeMap<String, String>>,

    /// Days the service logs are retained, one of [`LogRetentionDays::ALLOWED`]
    pub log_retention_days: u32,

    #[serde(skip)]
    pub out: ServiceOut,
}

/// Handles recorded while [`Service::run`] progresses
#[derive(Debug, Clone, Default)]
pub struct ServiceOut {
    pub docker: Option<DockerOut>,
    pub log_group: Option<ResourceHandle>,
    pub task: Option<ResourceHandle>,
    pub service: Option<ResourceHandle>,
}

impl Default for Service {
    fn default() -> Self {
        Self {
            name: String::new(),
            region: String::new(),
            docker: None,
            task: None,
            service: None,
            ports: Vec::new(),
            linux_parameters: None,
            mount_points: Vec::new(),
            sidecar_containers: Vec::new(),
            env: Output::default(),
            docker_labels: Output::default(),
            log_retention_days: LogRetentionDays::default().value(),
            out: ServiceOut::default(),
        }
    }
}

impl Service {
    pub fn new(name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            region: region.into(),
            ..Default::default()
        }
    }

    /// Name of the log group the service writes to
    pub fn log_group_name(&self) -> String {
        log_group_name(&self.name)
    }

    /// Container definitions payload, resolved once the image exists
    fn container_definitions(
        &self,
        image_name: &Output<String>,
        log_configuration: ContainerLogConfig,
    ) -> Output<String> {
        let name = self.name.clone();
        let ports = self.ports.clone();
        let linux_parameters = self.linux_parameters.clone();
        let mount_points = self.mount_points.clone();
        let sidecars = self.sidecar_containers.clone();

        all3(image_name, &self.env, &self.docker_labels).try_apply(
            move |(image, env, docker_labels)| {
                let primary = ContainerDefinition {
                    command: None,
                    name,
                    image,
                    port_mappings: ports,
                    environment: env_from_map(&env),
                    log_configuration: Some(log_configuration),
                    docker_labels,
                    linux_parameters,
                    mount_points,
                };

                assemble_container_definitions(&primary, &sidecars)
            },
        )
    }
}

fn log_group_name(service: &str) -> String {
    format!("/fargate/service/{service}")
}

fn retention(days: u32) -> InfrastructureResult<LogRetentionDays> {
    LogRetentionDays::new(days).map_err(|e| {
        InfrastructureError::invalid_format("Service.LogRetentionDays", days.to_string(), e.to_string())
    })
}

/// Declare the service's log group and return the matching `awslogs` config
pub fn service_log_configuration(
    engine: &dyn Engine,
    name: &str,
    region: &str,
    log_retention_days: u32,
) -> InfrastructureResult<(ResourceHandle, ContainerLogConfig)> {
    let retention = retention(log_retention_days)?;
    let group = log_group_name(name);

    let handle = engine.register(
        ResourceDeclaration::new(ResourceKind::LogGroup, &group).properties(
            Properties::new()
                .set("name", &group)
                .set("tags", json!({}))
                .set("retentionInDays", retention.value()),
        ),
    )?;

    Ok((
        handle,
        ContainerLogConfig::awslogs(group, region, FARGATE_STREAM_PREFIX),
    ))
}

impl Component for Service {
    fn component_type(&self) -> &'static str {
        "Service"
    }

    /// Validate the service configuration
    ///
    /// # Rules
    /// - Name and region must be set
    /// - Docker build, task and service args must be present
    /// - Log retention must be a CloudWatch day count
    ///
    /// Sidecars are checked when the container definitions resolve, after
    /// the image and log group are declared.
    fn validate(&self) -> ValidationResult {
        require_non_empty("Service.Name", &self.name)?;
        require_non_empty("Service.Region", &self.region)?;
        require_present("Service.Docker", self.docker.as_ref())?;
        require_present("Service.Task", self.task.as_ref())?;
        require_present("Service.Service", self.service.as_ref())?;
        retention(self.log_retention_days)?;
        Ok(())
    }

    fn run(&mut self, engine: &dyn Engine) -> InfrastructureResult<()> {
        self.validate()?;
        info!("Declaring service {} in {}", self.name, self.region);

        let build = self
            .docker
            .clone()
            .ok_or_else(|| InfrastructureError::missing("Service.Docker"))?;
        let task = self
            .task
            .clone()
            .ok_or_else(|| InfrastructureError::missing("Service.Task"))?;

        let mut docker = Docker::new(&self.name, build);
        docker.run(engine)?;
        let docker = docker
            .out
            .ok_or_else(|| InfrastructureError::upstream("Docker.run", "no image declared"))?;
        self.out.docker = Some(docker.clone());

        let (log_group, log_configuration) =
            service_log_configuration(engine, &self.name, &self.region, self.log_retention_days)?;
        self.out.log_group = Some(log_group);

        let container_definitions =
            self.container_definitions(&docker.image_name(), log_configuration);

        let task_name = format!("{}-task", self.name);
        debug!("Declaring task definition {}", task_name);
        let task_definition = engine.register(
            ResourceDeclaration::new(ResourceKind::TaskDefinition, &task_name)
                .properties(task.properties(&task_name, &container_definitions)),
        )?;
        self.out.task = Some(task_definition.clone());

        let service_args = self
            .service
            .as_mut()
            .ok_or_else(|| InfrastructureError::missing("Service.Service"))?;
        service_args.task_definition = Some(task_definition.arn());

        let service_name = format!("{}-svc", self.name);
        debug!("Declaring ECS service {}", service_name);
        let service = engine.register(
            ResourceDeclaration::new(ResourceKind::EcsService, service_name)
                .properties(service_args.properties()),
        )?;
        self.out.service = Some(service);

        info!("Declared service {}", self.name);
        Ok(())
    }
}
