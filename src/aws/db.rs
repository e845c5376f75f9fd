// Copyright (c) 2025 - Cowboy AI, Inc.
//! Postgres on RDS

use serde::Deserialize;
use tracing::info;

use super::vpc::VpcOut;
use super::{name_tag, Component};
use crate::domain::invariants::{require_non_empty, require_present, ValidationResult};
use crate::engine::{Engine, Properties, ResourceDeclaration, ResourceHandle, ResourceKind};
use crate::errors::{InfrastructureError, InfrastructureResult};
use crate::output::{all, Output};

/// RDS instance parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InstanceArgs {
    pub allocated_storage: Option<u32>,
    pub max_allocated_storage: Option<u32>,
    pub engine: Option<String>,
    pub engine_version: Option<String>,
    pub instance_class: Option<String>,
    pub multi_az: bool,
    pub parameter_group_name: Option<String>,
    pub publicly_accessible: bool,
    pub storage_type: Option<String>,
    pub username: Option<String>,
    pub password: Option<Output<String>>,
    pub skip_final_snapshot: bool,

    /// Set by [`Postgres::run`]
    pub db_subnet_group_name: Option<Output<String>>,

    /// Set by [`Postgres::run`] to the component name
    pub db_name: Option<String>,
}

impl InstanceArgs {
    /// Small single-AZ Postgres instance
    pub fn postgres(engine_version: impl Into<String>, instance_class: impl Into<String>) -> Self {
        Self {
            allocated_storage: Some(20),
            max_allocated_storage: Some(100),
            engine: Some("postgres".to_string()),
            engine_version: Some(engine_version.into()),
            instance_class: Some(instance_class.into()),
            storage_type: Some("gp2".to_string()),
            ..Default::default()
        }
    }

    fn properties(&self) -> Properties {
        Properties::new()
            .set_some("allocatedStorage", self.allocated_storage)
            .set_some("maxAllocatedStorage", self.max_allocated_storage)
            .set_some("engine", self.engine.as_ref())
            .set_some("engineVersion", self.engine_version.as_ref())
            .set_some("instanceClass", self.instance_class.as_ref())
            .set("multiAz", self.multi_az)
            .set_some("parameterGroupName", self.parameter_group_name.as_ref())
            .set("publiclyAccessible", self.publicly_accessible)
            .set_some("storageType", self.storage_type.as_ref())
            .set_some("username", self.username.as_ref())
            .set_some_output("password", self.password.as_ref())
            .set("skipFinalSnapshot", self.skip_final_snapshot)
            .set_some_output("dbSubnetGroupName", self.db_subnet_group_name.as_ref())
            .set_some("dbName", self.db_name.as_ref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Postgres {
    pub name: String,
    pub args: Option<InstanceArgs>,

    #[serde(skip)]
    pub vpc: Option<VpcOut>,

    #[serde(skip)]
    pub out: Option<PostgresOut>,
}

#[derive(Debug, Clone)]
pub struct PostgresOut {
    pub subnet_group: ResourceHandle,
    pub db: ResourceHandle,
}

impl PostgresOut {
    /// `host:port` of the instance
    pub fn endpoint(&self) -> Output<String> {
        self.db.string_output("endpoint")
    }
}

impl Component for Postgres {
    fn component_type(&self) -> &'static str {
        "Postgres"
    }

    fn validate(&self) -> ValidationResult {
        require_non_empty("Postgres.Name", &self.name)?;
        require_present("Postgres.Args", self.args.as_ref())?;
        require_present("Postgres.VPC", self.vpc.as_ref())?;
        Ok(())
    }

    fn run(&mut self, engine: &dyn Engine) -> InfrastructureResult<()> {
        self.validate()?;
        info!("Declaring Postgres instance {}", self.name);

        let vpc = self
            .vpc
            .as_ref()
            .ok_or_else(|| InfrastructureError::missing("Postgres.VPC"))?;
        let subnets: Vec<&ResourceHandle> =
            vpc.public_subnets.iter().chain(vpc.private_subnets.iter()).collect();

        let subnet_group_name = format!("{}-db-subnet", self.name);
        let subnet_group = engine.register(
            ResourceDeclaration::new(ResourceKind::RdsSubnetGroup, &subnet_group_name)
                .properties(
                    Properties::new()
                        .set_output("subnetIds", &all(subnets.iter().map(|subnet| subnet.id())))
                        .set("tags", name_tag(&subnet_group_name)),
                )
                .depends_on(subnets.iter().copied()),
        )?;

        let args = self
            .args
            .as_mut()
            .ok_or_else(|| InfrastructureError::missing("Postgres.Args"))?;
        args.db_subnet_group_name = Some(subnet_group.string_output("name"));
        args.db_name = Some(self.name.clone());

        let db = engine.register(
            ResourceDeclaration::new(ResourceKind::RdsInstance, &self.name)
                .properties(args.properties())
                .depends_on([&subnet_group]),
        )?;

        self.out = Some(PostgresOut { subnet_group, db });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_order() {
        let mut db = Postgres::default();
        assert_eq!(db.validate().unwrap_err().field(), Some("Postgres.Name"));

        db.name = "orders".to_string();
        assert_eq!(db.validate().unwrap_err().field(), Some("Postgres.Args"));

        db.args = Some(InstanceArgs::postgres("16.3", "db.t4g.micro"));
        assert_eq!(db.validate().unwrap_err().field(), Some("Postgres.VPC"));
    }
}
