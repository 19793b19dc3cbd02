// Copyright (c) 2025 - Cowboy AI, Inc.
//! Materialization Boundary
//!
//! The composition engine does not talk to providers. It hands a
//! [`MaterializationPlan`] to an external [`MaterializationEngine`] one node
//! at a time, with every attribute reference already resolved.
//!
//! # Scheduling
//!
//! ```text
//! wave 1: nodes with no requirements            ─┐
//! wave 2: nodes whose requirements all succeeded ├─ each wave runs concurrently
//! ...                                           ─┘
//! ```
//!
//! A node is never started before every node it requires has succeeded. A
//! node that requires a failed or blocked node is reported
//! [`NodeOutcome::Blocked`] and never started.
//!
//! # Example
//!
//! ```rust
//! use cim_compose::component::ComponentArgs;
//! use cim_compose::components::CloudflarePagesProject;
//! use cim_compose::config::DefaultSource;
//! use cim_compose::graph::GraphBuilder;
//! use cim_compose::materialize::{materialize, SimulatedEngine};
//!
//! # tokio_test::block_on(async {
//! let mut graph = GraphBuilder::new(DefaultSource::default().with_cloudflare_account("abc"));
//! graph.declare(CloudflarePagesProject, ComponentArgs::new("docs")).unwrap();
//!
//! let plan = graph.build().unwrap();
//! let report = materialize(&plan, &SimulatedEngine::new()).await;
//! assert!(report.is_success());
//! # });
//! ```

pub mod simulated;

pub use simulated::SimulatedEngine;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::graph::{AttributeRef, MaterializationPlan, PlannedNode, VertexId};

/// Attributes reported by the engine for one node
pub type NodeAttributes = BTreeMap<String, Value>;

/// One node with concrete property values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRequest {
    pub id: VertexId,
    pub type_tag: String,
    pub logical_name: String,
    pub owner: Option<VertexId>,
    pub properties: BTreeMap<String, Value>,
}

/// Per-node materialization failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MaterializationError {
    /// The engine refused or failed to create the node
    #[error("Engine rejected {type_tag} '{logical_name}': {reason}")]
    Rejected {
        type_tag: String,
        logical_name: String,
        reason: String,
    },

    /// A required attribute was not reported by its node
    #[error("'{logical_name}' needs attribute '{attribute}' of {node}, which was not reported")]
    UnresolvedAttribute {
        logical_name: String,
        node: VertexId,
        attribute: String,
    },
}

/// Engine that brings one node to its desired state
#[async_trait]
pub trait MaterializationEngine: Send + Sync {
    /// Create `request` and report its attributes
    async fn create(&self, request: NodeRequest) -> Result<NodeAttributes, MaterializationError>;
}

/// What happened to one node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum NodeOutcome {
    /// Created; attributes as reported by the engine
    Materialized { attributes: NodeAttributes },
    /// The engine failed the node
    Failed { reason: String },
    /// Never started because a required node did not succeed
    Blocked { by: BTreeSet<VertexId> },
}

impl NodeOutcome {
    /// Whether the node was created
    pub fn is_materialized(&self) -> bool {
        matches!(self, NodeOutcome::Materialized { .. })
    }

    /// Whether dependents of this node must not start
    pub fn blocks_dependents(&self) -> bool {
        !self.is_materialized()
    }
}

/// Result of one materialization run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializationReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Number of concurrent waves executed
    pub waves: usize,
    /// Successfully created nodes in completion order
    pub created: Vec<VertexId>,
    pub outcomes: BTreeMap<VertexId, NodeOutcome>,
    /// Outputs of every component whose outputs fully resolved
    pub component_outputs: BTreeMap<VertexId, BTreeMap<String, Value>>,
}

impl MaterializationReport {
    /// Whether every node was created
    pub fn is_success(&self) -> bool {
        self.outcomes.values().all(NodeOutcome::is_materialized)
    }

    /// Outcome of one node
    pub fn outcome(&self, node: VertexId) -> Option<&NodeOutcome> {
        self.outcomes.get(&node)
    }

    /// Attributes of a created node
    pub fn attributes(&self, node: VertexId) -> Option<&NodeAttributes> {
        match self.outcomes.get(&node) {
            Some(NodeOutcome::Materialized { attributes }) => Some(attributes),
            _ => None,
        }
    }

    /// Nodes the engine failed
    pub fn failed(&self) -> Vec<VertexId> {
        self.matching(|outcome| matches!(outcome, NodeOutcome::Failed { .. }))
    }

    /// Nodes never started
    pub fn blocked(&self) -> Vec<VertexId> {
        self.matching(|outcome| matches!(outcome, NodeOutcome::Blocked { .. }))
    }

    /// A resolved component output
    pub fn component_output(&self, component: VertexId, name: &str) -> Option<&Value> {
        self.component_outputs.get(&component)?.get(name)
    }

    fn matching(&self, predicate: impl Fn(&NodeOutcome) -> bool) -> Vec<VertexId> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| predicate(outcome))
            .map(|(id, _)| *id)
            .collect()
    }
}

fn lookup_in(outcomes: &BTreeMap<VertexId, NodeOutcome>) -> impl Fn(&AttributeRef) -> Option<Value> + '_ {
    move |reference| match outcomes.get(&reference.node) {
        Some(NodeOutcome::Materialized { attributes }) => attributes.get(&reference.name).cloned(),
        _ => None,
    }
}

fn request_for(
    node: &PlannedNode,
    outcomes: &BTreeMap<VertexId, NodeOutcome>,
) -> Result<NodeRequest, MaterializationError> {
    let lookup = lookup_in(outcomes);
    let properties = node
        .properties
        .iter()
        .map(|(name, value)| {
            value
                .resolve(&lookup)
                .map(|value| (name.clone(), value))
                .map_err(|missing| MaterializationError::UnresolvedAttribute {
                    logical_name: node.logical_name.clone(),
                    node: missing.node,
                    attribute: missing.name,
                })
        })
        .collect::<Result<_, _>>()?;

    Ok(NodeRequest {
        id: node.id,
        type_tag: node.type_tag.clone(),
        logical_name: node.logical_name.clone(),
        owner: node.owner,
        properties,
    })
}

/// Drive `plan` through `engine`
///
/// Never fails as a whole; per-node failures are recorded in the report and
/// stop only the nodes that require the failed one.
#[instrument(skip_all, fields(nodes = plan.nodes.len()))]
pub async fn materialize<E>(plan: &MaterializationPlan, engine: &E) -> MaterializationReport
where
    E: MaterializationEngine + ?Sized,
{
    let run_id = Uuid::now_v7();
    let started_at = Utc::now();
    info!(%run_id, "Materialization started");

    let mut outcomes: BTreeMap<VertexId, NodeOutcome> = BTreeMap::new();
    let mut created = Vec::new();
    let mut pending: Vec<&PlannedNode> = plan.nodes.iter().collect();
    let mut waves = 0;

    while !pending.is_empty() {
        let mut wave = Vec::new();
        let mut waiting = Vec::new();

        for node in pending {
            let blocked_by: BTreeSet<VertexId> = node
                .requires
                .iter()
                .copied()
                .filter(|required| outcomes.get(required).is_some_and(NodeOutcome::blocks_dependents))
                .collect();

            if !blocked_by.is_empty() {
                debug!(node = %node.logical_name, "Blocked by a failed requirement");
                outcomes.insert(node.id, NodeOutcome::Blocked { by: blocked_by });
            } else if node
                .requires
                .iter()
                .all(|required| outcomes.get(required).is_some_and(NodeOutcome::is_materialized))
            {
                wave.push(node);
            } else {
                waiting.push(node);
            }
        }

        if wave.is_empty() {
            // Only requirements missing from the plan can leave nodes waiting
            for node in waiting {
                let by: BTreeSet<VertexId> = node
                    .requires
                    .iter()
                    .copied()
                    .filter(|required| !outcomes.contains_key(required))
                    .collect();
                warn!(node = %node.logical_name, "Requirements missing from plan");
                outcomes.insert(node.id, NodeOutcome::Blocked { by });
            }
            break;
        }

        waves += 1;
        debug!(wave = waves, nodes = wave.len(), "Starting wave");

        let requests: Vec<_> = wave.iter().map(|node| request_for(node, &outcomes)).collect();
        let results = join_all(requests.into_iter().map(|request| async move {
            match request {
                Ok(request) => engine.create(request).await,
                Err(error) => Err(error),
            }
        }))
        .await;

        for (node, result) in wave.iter().zip(results) {
            match result {
                Ok(attributes) => {
                    created.push(node.id);
                    outcomes.insert(node.id, NodeOutcome::Materialized { attributes });
                }
                Err(error) => {
                    warn!(node = %node.logical_name, %error, "Node failed");
                    outcomes.insert(
                        node.id,
                        NodeOutcome::Failed {
                            reason: error.to_string(),
                        },
                    );
                }
            }
        }

        pending = waiting;
    }

    let component_outputs = {
        let lookup = lookup_in(&outcomes);
        plan.components
            .iter()
            .filter_map(|component| {
                component
                    .outputs
                    .iter()
                    .map(|(name, value)| value.resolve(&lookup).map(|value| (name.clone(), value)))
                    .collect::<Result<BTreeMap<_, _>, _>>()
                    .ok()
                    .map(|outputs| (component.id, outputs))
            })
            .collect()
    };

    let report = MaterializationReport {
        run_id,
        started_at,
        finished_at: Utc::now(),
        waves,
        created,
        outcomes,
        component_outputs,
    };

    info!(
        %run_id,
        waves,
        created = report.created.len(),
        failed = report.failed().len(),
        blocked = report.blocked().len(),
        "Materialization finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentArgs;
    use crate::components::AwsNetwork;
    use crate::config::DefaultSource;
    use crate::graph::GraphBuilder;
    use serde_json::json;

    fn network_plan(subnets: u32) -> MaterializationPlan {
        let mut graph = GraphBuilder::new(DefaultSource::default());
        graph
            .declare(
                AwsNetwork,
                ComponentArgs::new("core").with_overrides(json!({ "numberOfSubnets": subnets })),
            )
            .unwrap();
        graph.build().unwrap()
    }

    #[tokio::test]
    async fn test_all_nodes_created_in_waves() {
        let plan = network_plan(2);
        let engine = SimulatedEngine::new();
        let report = materialize(&plan, &engine).await;

        assert!(report.is_success());
        assert_eq!(report.created.len(), plan.nodes.len());
        // vpc → rt/subnets/igw → rtas/igw-route
        assert_eq!(report.waves, 3);
    }

    #[tokio::test]
    async fn test_attribute_references_are_resolved() {
        let plan = network_plan(1);
        let engine = SimulatedEngine::new();
        let report = materialize(&plan, &engine).await;

        let vpc = plan.node_named("core-vpc").unwrap();
        let subnet = plan.node_named("core-subnet-0").unwrap();
        let vpc_id = report.attributes(vpc.id).unwrap().get("id").unwrap();
        assert_eq!(report.attributes(subnet.id).unwrap().get("vpcId"), Some(vpc_id));

        let network = plan.component_named("core").unwrap();
        assert_eq!(report.component_output(network.id, "vpcId"), Some(vpc_id));
    }

    #[tokio::test]
    async fn test_failure_blocks_dependents_only() {
        let plan = network_plan(2);
        let engine = SimulatedEngine::new().failing("core-subnet-0");
        let report = materialize(&plan, &engine).await;

        let id = |name: &str| plan.node_named(name).unwrap().id;
        assert_eq!(report.failed(), vec![id("core-subnet-0")]);
        assert_eq!(report.blocked(), vec![id("core-rta-0")]);
        assert!(report.outcome(id("core-rta-1")).unwrap().is_materialized());
        assert!(!engine.created_names().contains(&"core-rta-0".to_string()));

        // subnetIds cannot resolve with a failed subnet
        let network = plan.component_named("core").unwrap();
        assert!(report.component_outputs.get(&network.id).is_none());
    }

    #[test]
    fn test_empty_plan() {
        let plan = GraphBuilder::new(DefaultSource::default()).build().unwrap();
        let report = tokio_test::block_on(materialize(&plan, &SimulatedEngine::new()));

        assert!(report.is_success());
        assert_eq!(report.waves, 0);
        assert!(report.started_at <= report.finished_at);
    }
}
