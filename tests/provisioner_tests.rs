// Copyright (c) 2025 - Cowboy AI, Inc.
//! Network and Platform Provisioner Tests
//!
//! Each component runs against a local engine with the simulated provider;
//! tests check declaration names and order, then converge and check how
//! outputs were threaded between resources.

mod fixtures;

use cim_infrastructure_aws::aws::{Component, HealthCheck, LoadBalancer};
use cim_infrastructure_aws::engine::{ResourceKind, SimulatedProvider, SimulatedProviderConfig};
use cim_infrastructure_aws::InfrastructureError;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use test_case::test_case;

use fixtures::*;

fn declared_names<P: cim_infrastructure_aws::engine::Provider>(
    engine: &cim_infrastructure_aws::LocalEngine<P>,
) -> Vec<String> {
    engine.declarations().into_iter().map(|record| record.name).collect()
}

async fn state_of<P: cim_infrastructure_aws::engine::Provider>(
    engine: &cim_infrastructure_aws::LocalEngine<P>,
    kind: ResourceKind,
    name: &str,
) -> Value {
    engine
        .handle(kind, name)
        .unwrap_or_else(|| panic!("{name} was not declared"))
        .state()
        .resolve()
        .await
        .unwrap()
}

// ============================================================================
// VPC
// ============================================================================

#[test_case(vec![], 2, "VPC.PublicSubnetCidrBlocks" ; "no public subnets")]
#[test_case(vec!["10.0.1.0/24"], 2, "VPC.PublicSubnetCidrBlocks" ; "one public subnet")]
#[test_case(vec!["10.0.1.0/24", "10.0.2.0/24"], 1, "VPC.PrivateSubnetCidrBlocks" ; "one private subnet")]
#[test_case(vec!["10.0.1.0/24", "10.0.2.0/24"], 0, "VPC.PrivateSubnetCidrBlocks" ; "no private subnets")]
fn test_vpc_requires_two_subnets_each(public: Vec<&str>, private: usize, field: &str) {
    let mut vpc = vpc_fixture();
    vpc.public_subnet_cidr_blocks = public.into_iter().map(String::from).collect();
    vpc.private_subnet_cidr_blocks.truncate(private);

    assert_eq!(vpc.validate().unwrap_err().field(), Some(field));
}

#[test]
fn test_vpc_validation_failure_declares_nothing() {
    let engine = engine();
    let mut vpc = vpc_fixture();
    vpc.cidr_block = "10.0.0.0".to_string();

    assert!(matches!(vpc.run(&engine), Err(InfrastructureError::InvalidFormat { .. })));
    assert!(engine.declarations().is_empty());
    assert!(vpc.out.is_none());
}

#[tokio::test]
async fn test_vpc_declaration_order() {
    let engine = engine();
    let mut vpc = vpc_fixture();
    vpc.run(&engine).unwrap();

    assert_eq!(
        declared_names(&engine),
        vec![
            "main-vpc",
            "main-public-subnet-1",
            "main-public-subnet-2",
            "main-private-subnet-1",
            "main-private-subnet-2",
            "main-internet-gateway",
            "main-nat-gateway-ip",
            "main-nat-gateway",
            "main-public-route-table",
            "main-private-route-table",
            "main-public-subnet-1-rt-assoc",
            "main-public-subnet-2-rt-assoc",
            "main-private-subnet-1-rt-assoc",
            "main-private-subnet-2-rt-assoc",
        ]
    );
}

#[tokio::test]
async fn test_vpc_threads_ids() {
    let engine = engine();
    let mut vpc = vpc_fixture();
    vpc.run(&engine).unwrap();
    let out = vpc.out.clone().unwrap();

    let plan = engine.converge().await.unwrap();
    let vpc_id = out.id().resolve().await.unwrap();
    assert_eq!(plan.exports["VPC-ID"], vpc_id);
    assert!(plan.exports["IGW-ID"].starts_with("igw-"));
    assert!(plan.exports["NAT-GATEWAY-ID"].starts_with("nat-"));

    let subnet = state_of(&engine, ResourceKind::Subnet, "main-private-subnet-2").await;
    assert_eq!(subnet["vpcId"], vpc_id.as_str());
    assert_eq!(subnet["availabilityZone"], "us-east-1c");
    assert_eq!(subnet["cidrBlock"], "10.0.4.0/24");
    assert_eq!(subnet["tags"], json!({ "Name": "main-private-subnet-2" }));

    let nat = state_of(&engine, ResourceKind::NatGateway, "main-nat-gateway").await;
    assert_eq!(nat["subnetId"], out.public_subnets[0].id().resolve().await.unwrap().as_str());

    let private_routes = state_of(&engine, ResourceKind::RouteTable, "main-private-route-table").await;
    assert_eq!(
        private_routes["routes"],
        json!([{ "cidrBlock": "0.0.0.0/0", "natGatewayId": plan.exports["NAT-GATEWAY-ID"] }])
    );

    let public_routes = state_of(&engine, ResourceKind::RouteTable, "main-public-route-table").await;
    assert_eq!(public_routes["routes"][0]["gatewayId"], plan.exports["IGW-ID"].as_str());
}

// ============================================================================
// ECS
// ============================================================================

#[tokio::test]
async fn test_ecs_cluster_and_execution_role() {
    let engine = engine();
    let mut ecs = ecs_fixture();
    ecs.run(&engine).unwrap();

    assert_eq!(
        declared_names(&engine),
        vec!["main", "main-task-exec-role", "main-task-exec-policy"]
    );

    let plan = engine.converge().await.unwrap();
    assert!(plan.exports["CLUSTER-ID"].starts_with("cluster-"));

    let attachment = state_of(&engine, ResourceKind::IamRolePolicyAttachment, "main-task-exec-policy").await;
    assert_eq!(attachment["role"], "main-task-exec-role");
    assert_eq!(
        attachment["policyArn"],
        "arn:aws:iam::aws:policy/service-role/AmazonECSTaskExecutionRolePolicy"
    );
}

// ============================================================================
// HTTPS
// ============================================================================

#[test_case("", "example.com.", "api.example.com", "HTTPS.Name" ; "missing name")]
#[test_case("api", "", "api.example.com", "HTTPS.Zone" ; "missing zone")]
#[test_case("api", "example.com", "api.example.com", "HTTPS.Zone" ; "zone without trailing period")]
#[test_case("api", "example.com.", "", "HTTPS.DomainName" ; "missing domain")]
fn test_https_validation(name: &str, zone: &str, domain: &str, field: &str) {
    let https = cim_infrastructure_aws::aws::Https::new(name, zone, domain);
    assert_eq!(https.validate().unwrap_err().field(), Some(field));
}

#[tokio::test]
async fn test_https_validation_records() {
    let engine = engine();
    let mut https = https_with_sans_fixture();
    https.run(&engine).unwrap();

    assert_eq!(
        engine.names_of(ResourceKind::Route53Record),
        vec!["web-url", "web-1-subject-url", "web-2-subject-url"]
    );

    let cert = state_of(&engine, ResourceKind::AcmCertificate, "web-cert").await;
    assert_eq!(cert["validationMethod"], "DNS");
    assert_eq!(cert["subjectAlternativeNames"], json!(["www.example.com", "admin.example.com"]));

    let options = cert["domainValidationOptions"].as_array().unwrap();
    for (index, record) in ["web-url", "web-1-subject-url", "web-2-subject-url"].iter().enumerate() {
        let state = state_of(&engine, ResourceKind::Route53Record, record).await;
        assert_eq!(state["name"], options[index]["resourceRecordName"]);
        assert_eq!(state["type"], "CNAME");
        assert_eq!(state["ttl"], 300);
        assert_eq!(state["records"], json!([options[index]["resourceRecordValue"]]));
        assert!(state["zoneId"].as_str().unwrap().starts_with('Z'));
    }
}

#[tokio::test]
async fn test_https_without_sans_omits_them() {
    let engine = engine();
    let mut https = https_fixture();
    https.run(&engine).unwrap();

    assert_eq!(engine.names_of(ResourceKind::Route53Record), vec!["api-url"]);
    let cert = state_of(&engine, ResourceKind::AcmCertificate, "api-cert").await;
    assert!(cert.get("subjectAlternativeNames").is_none());
    assert!(https.out.unwrap().subject_records.is_empty());
}

// ============================================================================
// Load balancer
// ============================================================================

#[tokio::test]
async fn test_load_balancer_listener_certificates() {
    let engine = engine();
    let mut vpc = vpc_fixture();
    vpc.run(&engine).unwrap();
    let mut api = https_fixture();
    api.run(&engine).unwrap();
    let mut web = https_with_sans_fixture();
    web.run(&engine).unwrap();

    let mut lb = LoadBalancer {
        name: "edge".to_string(),
        vpc: vpc.out.clone(),
        https: vec![api.out.clone().unwrap(), web.out.clone().unwrap()],
        ..Default::default()
    };
    lb.validate().unwrap();
    assert!(lb.health_check.is_none());

    lb.run(&engine).unwrap();
    assert_eq!(lb.health_check, Some(HealthCheck::default()));

    let names = declared_names(&engine);
    let lb_names: Vec<&str> = names.iter().map(String::as_str).filter(|name| name.starts_with("edge-")).collect();
    assert_eq!(
        lb_names,
        vec!["edge-sg", "edge-lb", "edge-tg", "edge-listener", "edge-listener-cert-1"]
    );

    let api_cert = api.out.unwrap().cert.arn().resolve().await.unwrap();
    let web_cert = web.out.unwrap().cert.arn().resolve().await.unwrap();

    let listener = state_of(&engine, ResourceKind::Listener, "edge-listener").await;
    assert_eq!(listener["certificateArn"], api_cert.as_str());
    assert_eq!(listener["sslPolicy"], "ELBSecurityPolicy-FS-1-2-Res-2020-10");
    assert_eq!(listener["port"], 443);
    assert_eq!(listener["defaultActions"][0]["type"], "forward");

    let extra = state_of(&engine, ResourceKind::ListenerCertificate, "edge-listener-cert-1").await;
    assert_eq!(extra["certificateArn"], web_cert.as_str());

    let alb = state_of(&engine, ResourceKind::LoadBalancer, "edge-lb").await;
    let public_ids = vpc.out.unwrap().public_subnet_ids().resolve().await.unwrap();
    assert_eq!(alb["subnets"], json!(public_ids));
    assert_eq!(alb["dropInvalidHeaderFields"], true);
    assert!(alb.get("accessLogs").is_none());

    let target_group = state_of(&engine, ResourceKind::TargetGroup, "edge-tg").await;
    assert_eq!(target_group["healthCheck"]["path"], "/health");
    assert_eq!(target_group["targetType"], "ip");
}

#[test]
fn test_load_balancer_requires_https() {
    let engine = engine();
    let mut vpc = vpc_fixture();
    vpc.run(&engine).unwrap();

    let lb = LoadBalancer {
        name: "edge".to_string(),
        vpc: vpc.out,
        ..Default::default()
    };
    assert_eq!(lb.validate(), Err(InfrastructureError::missing("LoadBalancer.HTTPS")));
}

// ============================================================================
// Data stores
// ============================================================================

#[tokio::test]
async fn test_postgres_subnet_group_spans_all_subnets() {
    let engine = engine();
    let mut vpc = vpc_fixture();
    vpc.run(&engine).unwrap();

    let mut db = postgres_fixture();
    db.vpc = vpc.out.clone();
    db.run(&engine).unwrap();

    let group = engine
        .declarations()
        .into_iter()
        .find(|record| record.name == "orders-db-subnet")
        .unwrap();
    assert_eq!(group.depends_on.len(), 4);

    let instance = state_of(&engine, ResourceKind::RdsInstance, "orders").await;
    assert_eq!(instance["dbSubnetGroupName"], "orders-db-subnet");
    assert_eq!(instance["dbName"], "orders");
    assert_eq!(instance["engine"], "postgres");

    let group = state_of(&engine, ResourceKind::RdsSubnetGroup, "orders-db-subnet").await;
    assert_eq!(group["subnetIds"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_redis_uses_its_subnet_group() {
    let engine = engine();
    let mut vpc = vpc_fixture();
    vpc.run(&engine).unwrap();
    let subnet = vpc.out.unwrap().private_subnets[0].clone();
    let subnet_id = subnet.id().resolve().await.unwrap();

    let mut redis = redis_fixture();
    redis.subnet = Some(subnet);
    redis.run(&engine).unwrap();

    let group = state_of(&engine, ResourceKind::ElastiCacheSubnetGroup, "sessions-subnet").await;
    assert_eq!(group["subnetIds"], json!([subnet_id]));

    let cache = state_of(&engine, ResourceKind::ElastiCacheCluster, "sessions").await;
    assert_eq!(cache["subnetGroupName"], "sessions-subnet");
    assert_eq!(cache["cacheNodes"][0]["port"], 6379);
}

// ============================================================================
// Failure semantics
// ============================================================================

#[tokio::test]
async fn test_provider_failure_leaves_earlier_resources() {
    let engine = engine_with(
        SimulatedProvider::new(SimulatedProviderConfig::default()).fail_on("main-nat-gateway"),
    );
    let mut vpc = vpc_fixture();
    vpc.run(&engine).unwrap();

    let err = engine.converge().await.unwrap_err();
    assert!(matches!(err, InfrastructureError::Upstream { .. }));

    let created: Vec<String> = engine.provider().created().into_iter().map(|(_, name)| name).collect();
    assert!(created.contains(&"main-vpc".to_string()));
    assert!(created.contains(&"main-public-subnet-1".to_string()));
    assert!(!created.contains(&"main-private-route-table".to_string()));
}
