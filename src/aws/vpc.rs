// Copyright (c) 2025 - Cowboy AI, Inc.
//! VPC Provisioner
//!
//! Declares a two-AZ network: a VPC, two public and two private subnets, an
//! internet gateway for the public side and a NAT gateway for the private
//! side.
//!
//! ```text
//! <name>-vpc
//!   ├── <name>-public-subnet-{1,2}   ──> <name>-public-route-table  (0.0.0.0/0 → IGW)
//!   ├── <name>-private-subnet-{1,2}  ──> <name>-private-route-table (0.0.0.0/0 → NAT)
//!   ├── <name>-internet-gateway
//!   └── <name>-nat-gateway (in public subnet 1, EIP <name>-nat-gateway-ip)
//! ```
//!
//! Exports `VPC-ID`, `IGW-ID` and `NAT-GATEWAY-ID`.

use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::{name_tag, parse_cidr, Component};
use crate::domain::invariants::{require_at_least, require_non_empty, ValidationResult};
use crate::engine::{Engine, Properties, ResourceDeclaration, ResourceHandle, ResourceKind};
use crate::errors::InfrastructureResult;
use crate::output::{all, Output};

/// Destination of the default route of both route tables
const DEFAULT_ROUTE: &str = "0.0.0.0/0";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Vpc {
    pub name: String,
    pub cidr_block: String,
    pub region: String,

    /// At least two; only the first two are used
    pub public_subnet_cidr_blocks: Vec<String>,

    /// At least two; only the first two are used
    pub private_subnet_cidr_blocks: Vec<String>,

    #[serde(skip)]
    pub out: Option<VpcOut>,
}

/// Resources declared by [`Vpc::run`]
#[derive(Debug, Clone)]
pub struct VpcOut {
    pub vpc: ResourceHandle,
    pub public_subnets: [ResourceHandle; 2],
    pub private_subnets: [ResourceHandle; 2],
    pub internet_gateway: ResourceHandle,
    pub nat_gateway: ResourceHandle,
    pub public_route_table: ResourceHandle,
    pub private_route_table: ResourceHandle,
}

impl VpcOut {
    pub fn id(&self) -> Output<String> {
        self.vpc.id()
    }

    pub fn public_subnet_ids(&self) -> Output<Vec<String>> {
        all(self.public_subnets.iter().map(ResourceHandle::id))
    }

    pub fn private_subnet_ids(&self) -> Output<Vec<String>> {
        all(self.private_subnets.iter().map(ResourceHandle::id))
    }
}

impl Vpc {
    fn subnet(
        &self,
        engine: &dyn Engine,
        vpc: &ResourceHandle,
        suffix: &str,
        cidr_block: &str,
        zone_letter: char,
    ) -> InfrastructureResult<ResourceHandle> {
        let name = format!("{}-{}", self.name, suffix);
        debug!("Declaring subnet {} ({})", name, cidr_block);

        engine.register(
            ResourceDeclaration::new(ResourceKind::Subnet, &name).properties(
                Properties::new()
                    .set("tags", name_tag(&name))
                    .set_output("vpcId", &vpc.id())
                    .set("cidrBlock", cidr_block)
                    .set("availabilityZone", format!("{}{}", self.region, zone_letter)),
            ),
        )
    }

    fn route_table(
        &self,
        engine: &dyn Engine,
        vpc: &ResourceHandle,
        suffix: &str,
        target_key: &'static str,
        target: &ResourceHandle,
    ) -> InfrastructureResult<ResourceHandle> {
        let name = format!("{}-{}", self.name, suffix);
        let routes = target
            .id()
            .apply(move |id| json!([{ "cidrBlock": DEFAULT_ROUTE, target_key: id }]));

        engine.register(
            ResourceDeclaration::new(ResourceKind::RouteTable, &name).properties(
                Properties::new()
                    .set_output("vpcId", &vpc.id())
                    .set("tags", name_tag(&name))
                    .set_output("routes", &routes),
            ),
        )
    }

    fn associate(
        &self,
        engine: &dyn Engine,
        subnet: &ResourceHandle,
        route_table: &ResourceHandle,
    ) -> InfrastructureResult<ResourceHandle> {
        let name = format!("{}-rt-assoc", subnet.name());

        engine.register(
            ResourceDeclaration::new(ResourceKind::RouteTableAssociation, name).properties(
                Properties::new()
                    .set_output("subnetId", &subnet.id())
                    .set_output("routeTableId", &route_table.id()),
            ),
        )
    }
}

impl Component for Vpc {
    fn component_type(&self) -> &'static str {
        "VPC"
    }

    /// Validate the VPC configuration
    ///
    /// # Rules
    /// - Name and CIDR block must be set
    /// - At least two public and two private subnet CIDR blocks
    /// - Region must be set
    /// - Every CIDR block must parse
    fn validate(&self) -> ValidationResult {
        require_non_empty("VPC.Name", &self.name)?;
        require_non_empty("VPC.CidrBlock", &self.cidr_block)?;
        require_at_least("VPC.PublicSubnetCidrBlocks", &self.public_subnet_cidr_blocks, 2)?;
        require_at_least("VPC.PrivateSubnetCidrBlocks", &self.private_subnet_cidr_blocks, 2)?;
        require_non_empty("VPC.Region", &self.region)?;

        parse_cidr("VPC.CidrBlock", &self.cidr_block)?;
        for block in &self.public_subnet_cidr_blocks {
            parse_cidr("VPC.PublicSubnetCidrBlocks", block)?;
        }
        for block in &self.private_subnet_cidr_blocks {
            parse_cidr("VPC.PrivateSubnetCidrBlocks", block)?;
        }

        Ok(())
    }

    fn run(&mut self, engine: &dyn Engine) -> InfrastructureResult<()> {
        self.validate()?;
        info!("Declaring VPC {} in {}", self.name, self.region);

        let vpc_name = format!("{}-vpc", self.name);
        let vpc = engine.register(
            ResourceDeclaration::new(ResourceKind::Vpc, &vpc_name).properties(
                Properties::new()
                    .set("enableDnsHostnames", true)
                    .set("cidrBlock", &self.cidr_block)
                    .set("tags", name_tag(&vpc_name)),
            ),
        )?;
        engine.export("VPC-ID", vpc.id());

        let public_1 = self.subnet(engine, &vpc, "public-subnet-1", &self.public_subnet_cidr_blocks[0], 'a')?;
        let public_2 = self.subnet(engine, &vpc, "public-subnet-2", &self.public_subnet_cidr_blocks[1], 'c')?;
        let private_1 = self.subnet(engine, &vpc, "private-subnet-1", &self.private_subnet_cidr_blocks[0], 'a')?;
        let private_2 = self.subnet(engine, &vpc, "private-subnet-2", &self.private_subnet_cidr_blocks[1], 'c')?;

        let igw_name = format!("{}-internet-gateway", self.name);
        let internet_gateway = engine.register(
            ResourceDeclaration::new(ResourceKind::InternetGateway, &igw_name)
                .properties(
                    Properties::new()
                        .set("tags", name_tag(&igw_name))
                        .set_output("vpcId", &vpc.id()),
                )
                .depends_on([&vpc]),
        )?;
        engine.export("IGW-ID", internet_gateway.id());

        let eip_name = format!("{}-nat-gateway-ip", self.name);
        let nat_ip = engine.register(
            ResourceDeclaration::new(ResourceKind::Eip, &eip_name).properties(
                Properties::new()
                    .set("tags", name_tag(&eip_name))
                    .set("vpc", true),
            ),
        )?;

        let nat_name = format!("{}-nat-gateway", self.name);
        let nat_gateway = engine.register(
            ResourceDeclaration::new(ResourceKind::NatGateway, &nat_name)
                .properties(
                    Properties::new()
                        .set("tags", name_tag(&nat_name))
                        .set_output("allocationId", &nat_ip.id())
                        .set_output("subnetId", &public_1.id()),
                )
                .depends_on([&public_1, &nat_ip]),
        )?;
        engine.export("NAT-GATEWAY-ID", nat_gateway.id());

        let public_route_table =
            self.route_table(engine, &vpc, "public-route-table", "gatewayId", &internet_gateway)?;
        let private_route_table =
            self.route_table(engine, &vpc, "private-route-table", "natGatewayId", &nat_gateway)?;

        self.associate(engine, &public_1, &public_route_table)?;
        self.associate(engine, &public_2, &public_route_table)?;
        self.associate(engine, &private_1, &private_route_table)?;
        self.associate(engine, &private_2, &private_route_table)?;

        self.out = Some(VpcOut {
            vpc,
            public_subnets: [public_1, public_2],
            private_subnets: [private_1, private_2],
            internet_gateway,
            nat_gateway,
            public_route_table,
            private_route_table,
        });

        info!("Declared VPC {}", self.name);
        Ok(())
    }
}
