// Copyright (c) 2025 - Cowboy AI, Inc.
//! Dependency Graph
//!
//! The graph holds two kinds of vertices (resource nodes and components) and
//! two distinct edge sets:
//!
//! ```text
//! ownership (tree)      component ──owns──► node ──owns──► node
//! predecessors (DAG)    node ──must follow──► node | component subtree
//! ```
//!
//! Ownership is acyclic by construction because an owner must exist before
//! its child. Predecessor cycles can only arise through component subtrees
//! and are reported by [`GraphBuilder::build`].
//!
//! # Module Organization
//!
//! - [`vertex`] - Vertex ids, typed handles, property values
//! - [`builder`] - Declaration, reference checks, rollback
//! - [`scope`] - Per-component construction scope and node declarations
//! - [`topology`] - Topological order and the materialization plan
//! - [`outputs`] - Write-once output registry

pub mod builder;
pub mod outputs;
pub mod scope;
pub mod topology;
pub mod vertex;

pub use builder::GraphBuilder;
pub use outputs::{OutputMap, OutputRegistry};
pub use scope::{NodeSpec, Scope};
pub use topology::{MaterializationPlan, PlannedComponent, PlannedNode};
pub use vertex::{
    AttributeRef, ComponentRecord, ComponentRef, NodeRef, PropertyValue, ResourceNode, Vertex,
    VertexId,
};
