// Copyright (c) 2025 - Cowboy AI, Inc.
//! Stack Preview
//!
//! Declares every component of a stack against a local engine backed by the
//! simulated AWS provider, resolves the whole resource graph and logs the
//! resulting plan. Nothing is created in AWS.
//!
//! Run with: cargo run --bin stack-preview
//!
//! Configuration:
//! 1. `CIM_STACK_CONFIG` - stack configuration file (default: stack.json)
//! 2. `AWS_REGION` - overrides the configured region
//! 3. `RUST_LOG` - log filter (default: info)

use anyhow::{Context, Result};
use cim_infrastructure_aws::{LocalEngine, SimulatedProvider, Stack, StackConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting stack preview");

    // Load configuration
    let config = StackConfig::from_env().context("Failed to load stack configuration")?;
    info!("Configuration loaded:");
    info!("  - Stack: {}", config.name);
    info!("  - Region: {}", config.region);
    info!("  - Services: {}", config.services.len());
    info!("  - Simulated account: {}", config.provider.account_id);

    let engine = LocalEngine::new(config.name.clone(), SimulatedProvider::new(config.provider.clone()));

    let mut stack = Stack::from_config(config).context("Failed to assemble stack")?;
    stack
        .run(&engine)
        .context("Failed to declare stack resources")?;
    info!("Declared {} resources", engine.declarations().len());

    let plan = engine
        .converge()
        .await
        .context("Failed to resolve stack resources")?;

    for resource in &plan.resources {
        let id = resource.state.get("id").and_then(|id| id.as_str()).unwrap_or("-");
        info!("  {} ({})", resource.record.urn, id);
    }

    for (name, value) in &plan.exports {
        info!("Export {} = {}", name, value);
    }

    info!(
        "Preview of stack {} complete: {} resources via {} provider",
        plan.stack,
        plan.resources.len(),
        plan.provider
    );

    Ok(())
}
