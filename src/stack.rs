// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Composition
//!
//! Runs every configured component in dependency order and feeds the
//! outputs of upstream components into downstream ones:
//!
//! ```text
//! Vpc ──> Postgres (all four subnets)
//!     ──> Redis (private subnet 1)
//!     ──> LoadBalancer <── Https certificates
//! Ecs ──> Service (cluster, task execution role)
//! Vpc + LoadBalancer ──> Service (private subnets, security group, target group)
//! ```
//!
//! Components that already carry a value for a wired field keep it.

use tracing::{debug, info};

use crate::aws::{
    Component, Ecs, Https, LoadBalancer, Postgres, Redis, ServiceLoadBalancer,
    ServiceNetworkConfiguration, Vpc,
};
use crate::config::{ServiceConfig, StackConfig};
use crate::docker_labels::DockerLabelExtractor;
use crate::engine::Engine;
use crate::errors::InfrastructureResult;
use crate::output::Output;

/// Every component of one stack
#[derive(Debug, Clone)]
pub struct Stack {
    pub name: String,
    pub region: String,
    pub vpc: Vpc,
    pub ecs: Option<Ecs>,
    pub https: Vec<Https>,
    pub load_balancer: Option<LoadBalancer>,
    pub postgres: Option<Postgres>,
    pub redis: Option<Redis>,
    pub services: Vec<ServiceConfig>,
}

impl Stack {
    /// Build the stack from its configuration
    ///
    /// Fills in the stack region where a component leaves it empty and reads
    /// docker labels from the configured Dockerfiles.
    pub fn from_config(config: StackConfig) -> InfrastructureResult<Self> {
        let StackConfig {
            name,
            region,
            mut vpc,
            ecs,
            https,
            load_balancer,
            postgres,
            redis,
            mut services,
            provider: _,
        } = config;

        if vpc.region.is_empty() {
            vpc.region = region.clone();
        }

        for config in &mut services {
            if config.service.region.is_empty() {
                config.service.region = region.clone();
            }

            if let Some(path) = &config.labels_from_dockerfile {
                let labels = DockerLabelExtractor::new(path).extract()?;
                debug!(
                    "Service {} takes {} docker labels from {}",
                    config.service.name,
                    labels.len(),
                    path.display()
                );
                config.service.docker_labels = Output::resolved(labels);
            }
        }

        Ok(Self {
            name,
            region,
            vpc,
            ecs,
            https,
            load_balancer,
            postgres,
            redis,
            services,
        })
    }

    /// Declare every component against the engine
    pub fn run(&mut self, engine: &dyn Engine) -> InfrastructureResult<()> {
        info!("Declaring stack {} in {}", self.name, self.region);

        run_component(&mut self.vpc, engine)?;
        let vpc = self.vpc.out.clone();

        if let Some(ecs) = &mut self.ecs {
            run_component(ecs, engine)?;
        }

        for https in &mut self.https {
            run_component(https, engine)?;
        }

        if let Some(lb) = &mut self.load_balancer {
            if lb.vpc.is_none() {
                lb.vpc = vpc.clone();
            }
            if lb.https.is_empty() {
                lb.https = self.https.iter().filter_map(|https| https.out.clone()).collect();
            }
            run_component(lb, engine)?;
        }

        if let Some(postgres) = &mut self.postgres {
            if postgres.vpc.is_none() {
                postgres.vpc = vpc.clone();
            }
            run_component(postgres, engine)?;
        }

        if let Some(redis) = &mut self.redis {
            if redis.subnet.is_none() {
                redis.subnet = vpc.as_ref().map(|vpc| vpc.private_subnets[0].clone());
            }
            run_component(redis, engine)?;
        }

        let ecs = self.ecs.as_ref().and_then(|ecs| ecs.out.clone());
        let lb = self.load_balancer.as_ref().and_then(|lb| lb.out.clone());

        for config in &mut self.services {
            let service = &mut config.service;

            if let Some(task) = &mut service.task {
                if task.execution_role_arn.is_none() {
                    task.execution_role_arn = ecs.as_ref().map(|ecs| ecs.task_exec_role.arn());
                }
            }

            if let Some(args) = &mut service.service {
                if args.cluster.is_none() {
                    args.cluster = ecs.as_ref().map(|ecs| ecs.cluster.id());
                }

                if args.network_configuration.is_none() {
                    if let Some(vpc) = &vpc {
                        args.network_configuration = Some(ServiceNetworkConfiguration {
                            subnets: vpc.private_subnets.iter().map(|subnet| subnet.id()).collect(),
                            security_groups: lb
                                .iter()
                                .map(|lb| lb.security_group.id())
                                .collect(),
                            assign_public_ip: false,
                        });
                    }
                }

                if let (Some(port), Some(lb)) = (config.load_balancer_port, &lb) {
                    let registered = args
                        .load_balancers
                        .iter()
                        .any(|entry| entry.container_name == service.name && entry.container_port == port);
                    if !registered {
                        args.load_balancers.push(ServiceLoadBalancer {
                            target_group_arn: lb.target_group.arn(),
                            container_name: service.name.clone(),
                            container_port: port,
                        });
                    }
                }
            }

            run_component(service, engine)?;
        }

        info!("Declared stack {}", self.name);
        Ok(())
    }
}

fn run_component(component: &mut dyn Component, engine: &dyn Engine) -> InfrastructureResult<()> {
    debug!("Running {} component", component.component_type());
    component.run(engine)
}
