// Copyright (c) 2025 - Cowboy AI, Inc.
//! ECS Cluster Provisioner
//!
//! Declares the cluster and the task execution role shared by every service
//! in it. Exports `CLUSTER-ID`.

use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::Component;
use crate::domain::invariants::{require_non_empty, ValidationResult};
use crate::engine::{Engine, Properties, ResourceDeclaration, ResourceHandle, ResourceKind};
use crate::errors::InfrastructureResult;

/// Managed policy granting image pulls and log delivery to ECS tasks
pub const TASK_EXECUTION_POLICY_ARN: &str =
    "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Ecs {
    pub name: String,

    #[serde(skip)]
    pub out: Option<EcsOut>,
}

#[derive(Debug, Clone)]
pub struct EcsOut {
    pub cluster: ResourceHandle,
    pub task_exec_role: ResourceHandle,
    pub task_exec_policy: ResourceHandle,
}

impl Ecs {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            out: None,
        }
    }
}

/// Trust policy letting ECS tasks assume a role
fn ecs_tasks_assume_role_policy() -> String {
    json!({
        "Version": "2008-10-17",
        "Statement": [{
            "Sid": "",
            "Effect": "Allow",
            "Principal": { "Service": "ecs-tasks.amazonaws.com" },
            "Action": "sts:AssumeRole",
        }],
    })
    .to_string()
}

impl Component for Ecs {
    fn component_type(&self) -> &'static str {
        "ECS"
    }

    fn validate(&self) -> ValidationResult {
        require_non_empty("ECS.Name", &self.name)
    }

    fn run(&mut self, engine: &dyn Engine) -> InfrastructureResult<()> {
        self.validate()?;
        info!("Declaring ECS cluster {}", self.name);

        let cluster = engine.register(
            ResourceDeclaration::new(ResourceKind::EcsCluster, &self.name).properties(
                Properties::new()
                    .set("capacityProviders", Vec::<String>::new())
                    .set("name", &self.name),
            ),
        )?;
        engine.export("CLUSTER-ID", cluster.id());

        let task_exec_role = engine.register(
            ResourceDeclaration::new(ResourceKind::IamRole, format!("{}-task-exec-role", self.name))
                .properties(Properties::new().set("assumeRolePolicy", ecs_tasks_assume_role_policy())),
        )?;

        let task_exec_policy = engine.register(
            ResourceDeclaration::new(
                ResourceKind::IamRolePolicyAttachment,
                format!("{}-task-exec-policy", self.name),
            )
            .properties(
                Properties::new()
                    .set_output("role", &task_exec_role.string_output("name"))
                    .set("policyArn", TASK_EXECUTION_POLICY_ARN),
            ),
        )?;

        self.out = Some(EcsOut {
            cluster,
            task_exec_role,
            task_exec_policy,
        });

        Ok(())
    }
}
