// Copyright (c) 2025 - Cowboy AI, Inc.
//! Composition plan inspector
//!
//! Declares a demonstration stack, prints its materialization plan as JSON
//! and dry-runs the plan against the in-memory engine.
//!
//! Run with: cargo run --bin compose-plan
//!
//! Environment (all optional):
//! - AWS_REGION, GITHUB_OWNER, SENTRY_ORGANIZATION, CLOUDFLARE_ACCOUNT_ID
//! - RUST_LOG for log filtering

use anyhow::{Context, Result};
use cim_compose::components::{
    AwsAppRunner, AwsNetwork, CloudflarePagesProject, GithubRepository, SentryProject,
};
use cim_compose::{materialize, ComponentArgs, DefaultSource, GraphBuilder, SimulatedEngine};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

/// Fill in the settings the demo stack cannot do without
fn demo_defaults() -> DefaultSource {
    let mut source = DefaultSource::from_env();
    if source.github_owner.is_none() {
        source = source.with_github_owner("cowboy-ai");
    }
    if source.sentry_organization.is_none() {
        source = source.with_sentry_organization("cowboy-ai");
    }
    if source.cloudflare_account_id.is_none() {
        source = source.with_cloudflare_account("demo-account");
    }
    source
}

fn declare_stack(graph: &mut GraphBuilder) -> Result<()> {
    let registry = format!("123456789012.dkr.ecr.{}.amazonaws.com", graph.defaults().aws_region);

    graph
        .declare(
            GithubRepository,
            ComponentArgs::new("platform").with_overrides(json!({
                "git": { "branches": ["develop", "main"] },
                "repository": { "description": "Platform services" }
            })),
        )
        .context("declaring repository")?;

    graph
        .declare(
            SentryProject,
            ComponentArgs::new("platform-api").with_overrides(json!({
                "platform": "rust",
                "teams": ["backend"],
                "notifications": {
                    "email": { "enabled": true, "recipients": ["oncall@example.com"] }
                }
            })),
        )
        .context("declaring monitored project")?;

    let shared = graph
        .declare(
            AwsNetwork,
            ComponentArgs::new("shared").with_overrides(json!({ "numberOfSubnets": 2 })),
        )
        .context("declaring shared network")?;

    graph
        .declare(
            AwsAppRunner::with_network(Arc::new(shared)),
            ComponentArgs::new("api").with_overrides(json!({
                "image": { "repositoryUrl": format!("{registry}/api") },
                "environment": { "RUST_LOG": "info" }
            })),
        )
        .context("declaring api service")?;

    graph
        .declare(
            AwsAppRunner::new(),
            ComponentArgs::new("worker").with_overrides(json!({
                "image": { "repositoryUrl": format!("{registry}/worker") },
                "autoScaling": { "minSize": 1, "maxSize": 1 }
            })),
        )
        .context("declaring worker service")?;

    graph
        .declare(
            CloudflarePagesProject,
            ComponentArgs::new("docs").with_overrides(json!({ "build": { "cache": true } })),
        )
        .context("declaring pages project")?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let mut graph = GraphBuilder::new(demo_defaults());
    declare_stack(&mut graph)?;
    info!(
        components = graph.component_count(),
        nodes = graph.node_count(),
        "Declared demonstration stack"
    );

    let plan = graph.build().context("building materialization plan")?;
    let rendered = serde_json::to_string_pretty(&plan).context("serializing plan")?;
    println!("{rendered}");

    let engine = SimulatedEngine::new();
    let report = materialize(&plan, &engine).await;

    if report.is_success() {
        info!(
            run_id = %report.run_id,
            waves = report.waves,
            created = report.created.len(),
            "Dry run succeeded"
        );
    } else {
        warn!(
            failed = report.failed().len(),
            blocked = report.blocked().len(),
            "Dry run incomplete"
        );
    }

    Ok(())
}
