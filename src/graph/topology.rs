// Copyright (c) 2025 - Cowboy AI, Inc.
//! Topological ordering and the materialization plan
//!
//! Ordering constraints of a vertex `v`:
//!
//! - its owner precedes it
//! - each explicit predecessor precedes it; a component predecessor means its
//!   whole ownership subtree
//! - each node whose attribute feeds one of `v`'s properties precedes it
//!
//! Kahn's algorithm with the ready set ordered by vertex id gives one
//! deterministic order with ties broken by declaration order. Vertices left
//! over when the ready set drains sit on, or behind, a cycle.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

use super::builder::GraphBuilder;
use super::outputs::OutputMap;
use super::vertex::{PropertyValue, Vertex, VertexId};
use crate::config::ConfigTree;
use crate::errors::{CompositionResult, GraphError};

/// Vertex → vertices that must precede it
pub(crate) type Requirements = BTreeMap<VertexId, BTreeSet<VertexId>>;

/// A node ready to hand to the materialization engine
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedNode {
    pub id: VertexId,
    pub type_tag: String,
    pub logical_name: String,
    pub properties: BTreeMap<String, PropertyValue>,
    pub owner: Option<VertexId>,
    pub predecessors: BTreeSet<VertexId>,
    /// Nodes that must succeed before this one may start
    pub requires: BTreeSet<VertexId>,
}

/// A component as recorded in the plan
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedComponent {
    pub id: VertexId,
    pub type_tag: String,
    pub name: String,
    pub owner: Option<VertexId>,
    pub predecessors: BTreeSet<VertexId>,
    pub effective_config: ConfigTree,
    pub outputs: OutputMap,
}

/// Graph handed to the materialization engine
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterializationPlan {
    /// Every vertex in materialization order
    pub order: Vec<VertexId>,
    /// Resource nodes in materialization order
    pub nodes: Vec<PlannedNode>,
    /// Components in materialization order
    pub components: Vec<PlannedComponent>,
}

impl MaterializationPlan {
    /// Position of a vertex in [`order`](Self::order)
    pub fn position(&self, id: VertexId) -> Option<usize> {
        self.order.iter().position(|candidate| *candidate == id)
    }

    /// Planned node by id
    pub fn node(&self, id: VertexId) -> Option<&PlannedNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// First planned node with the given logical name
    pub fn node_named(&self, logical_name: &str) -> Option<&PlannedNode> {
        self.nodes.iter().find(|node| node.logical_name == logical_name)
    }

    /// First planned component with the given name
    pub fn component_named(&self, name: &str) -> Option<&PlannedComponent> {
        self.components.iter().find(|component| component.name == name)
    }

    /// Logical names of the nodes in materialization order
    pub fn node_names(&self) -> Vec<&str> {
        self.nodes.iter().map(|node| node.logical_name.as_str()).collect()
    }

    /// Whether the plan has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl GraphBuilder {
    /// Deterministic topological order of every vertex
    pub fn topological_order(&self) -> Result<Vec<VertexId>, GraphError> {
        self.order_of(&self.requirements())
    }

    fn order_of(&self, requirements: &Requirements) -> Result<Vec<VertexId>, GraphError> {
        kahn(requirements).map_err(|stuck| GraphError::Cycle {
            members: stuck
                .iter()
                .filter_map(|id| self.vertices.get(id))
                .map(Vertex::label)
                .collect(),
        })
    }

    /// Validate the graph and produce the plan handed to materialization
    ///
    /// Fails on a predecessor cycle, or when called while a component is
    /// still populating.
    pub fn build(&self) -> CompositionResult<MaterializationPlan> {
        if let Some(record) = self.components().find(|record| !record.state().outputs_readable()) {
            return Err(GraphError::OutputsNotReady {
                component: record.name().to_string(),
                state: record.state(),
            }
            .into());
        }

        let requirements = self.requirements();
        let order = self.order_of(&requirements)?;

        // Node-level requirements: a component stands for whatever its own
        // requirements resolve to.
        let mut flattened: BTreeMap<VertexId, BTreeSet<VertexId>> = BTreeMap::new();
        for id in &order {
            let mut nodes = BTreeSet::new();
            for required in requirements.get(id).into_iter().flatten() {
                match self.vertices.get(required) {
                    Some(Vertex::Node(_)) => {
                        nodes.insert(*required);
                    }
                    _ => nodes.extend(flattened.get(required).into_iter().flatten().copied()),
                }
            }
            flattened.insert(*id, nodes);
        }

        let mut nodes = Vec::new();
        let mut components = Vec::new();
        for id in &order {
            match self.vertices.get(id) {
                Some(Vertex::Node(node)) => nodes.push(PlannedNode {
                    id: node.id(),
                    type_tag: node.type_tag().to_string(),
                    logical_name: node.logical_name().to_string(),
                    properties: node.properties().clone(),
                    owner: node.owner(),
                    predecessors: node.predecessors().clone(),
                    requires: flattened.remove(id).unwrap_or_default(),
                }),
                Some(Vertex::Component(record)) => components.push(PlannedComponent {
                    id: record.id(),
                    type_tag: record.type_tag().to_string(),
                    name: record.name().to_string(),
                    owner: record.owner(),
                    predecessors: record.predecessors().clone(),
                    effective_config: record.effective_config().clone(),
                    outputs: self.outputs.get(record.id()).cloned().unwrap_or_default(),
                }),
                None => return Err(GraphError::UnknownReference(*id).into()),
            }
        }

        info!(
            nodes = nodes.len(),
            components = components.len(),
            "Materialization plan built"
        );
        Ok(MaterializationPlan {
            order,
            nodes,
            components,
        })
    }

    pub(crate) fn requirements(&self) -> Requirements {
        let mut owned: BTreeMap<VertexId, Vec<VertexId>> = BTreeMap::new();
        for vertex in self.vertices.values() {
            if let Some(owner) = vertex.owner() {
                owned.entry(owner).or_default().push(vertex.id());
            }
        }

        let subtree = |root: VertexId| {
            let mut seen = BTreeSet::new();
            let mut stack = vec![root];
            while let Some(id) = stack.pop() {
                if seen.insert(id) {
                    if let Some(children) = owned.get(&id) {
                        stack.extend(children.iter().copied());
                    }
                }
            }
            seen
        };

        let mut requirements = Requirements::new();
        for vertex in self.vertices.values() {
            let required = requirements.entry(vertex.id()).or_default();
            required.extend(vertex.owner());

            for predecessor in vertex.predecessors() {
                match self.vertices.get(predecessor) {
                    Some(Vertex::Component(_)) => required.extend(subtree(*predecessor)),
                    _ => {
                        required.insert(*predecessor);
                    }
                }
            }

            if let Vertex::Node(node) = vertex {
                required.extend(node.data_dependencies());
            }
        }

        debug!(vertices = requirements.len(), "Ordering constraints collected");
        requirements
    }
}

/// Kahn's algorithm; on failure returns the vertices that never became ready
fn kahn(requirements: &Requirements) -> Result<Vec<VertexId>, BTreeSet<VertexId>> {
    let mut pending: BTreeMap<VertexId, usize> = requirements
        .iter()
        .map(|(id, required)| (*id, required.len()))
        .collect();

    let mut dependents: BTreeMap<VertexId, Vec<VertexId>> = BTreeMap::new();
    for (id, required) in requirements {
        for predecessor in required {
            dependents.entry(*predecessor).or_default().push(*id);
        }
    }

    let mut ready: BTreeSet<VertexId> = pending
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut order = Vec::with_capacity(requirements.len());
    while let Some(id) = ready.pop_first() {
        pending.remove(&id);
        order.push(id);

        for dependent in dependents.get(&id).into_iter().flatten() {
            if let Some(count) = pending.get_mut(dependent) {
                *count -= 1;
                if *count == 0 {
                    ready.insert(*dependent);
                }
            }
        }
    }

    if pending.is_empty() {
        Ok(order)
    } else {
        Err(pending.into_keys().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(n: u64) -> VertexId {
        VertexId(n)
    }

    fn requirements(edges: &[(u64, &[u64])]) -> Requirements {
        edges
            .iter()
            .map(|(vertex, required)| (id(*vertex), required.iter().map(|r| id(*r)).collect()))
            .collect()
    }

    #[test]
    fn test_kahn_orders_by_requirements_then_id() {
        let graph = requirements(&[(0, &[]), (1, &[3]), (2, &[0]), (3, &[])]);
        assert_eq!(kahn(&graph).unwrap(), vec![id(0), id(2), id(3), id(1)]);
    }

    #[test]
    fn test_kahn_reports_cycle_members() {
        let graph = requirements(&[(0, &[]), (1, &[2]), (2, &[1]), (3, &[2])]);
        let stuck = kahn(&graph).unwrap_err();
        assert_eq!(stuck, BTreeSet::from([id(1), id(2), id(3)]));
    }

    #[test]
    fn test_kahn_self_loop_is_cycle() {
        let graph = requirements(&[(0, &[0])]);
        assert!(kahn(&graph).is_err());
    }

    #[test]
    fn test_empty_graph_builds_empty_plan() {
        let graph = GraphBuilder::new(crate::config::DefaultSource::default());
        let plan = graph.build().unwrap();
        assert!(plan.is_empty());
        assert!(plan.order.is_empty());
    }
}
