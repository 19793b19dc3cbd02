// Copyright (c) 2025 - Cowboy AI, Inc.
//! Composable infrastructure components for the Composable Information Machine
//!
//! Components are declared against a [`GraphBuilder`]. Each declaration
//! resolves its configuration over environment defaults, validates it, and
//! populates a subtree of typed resource nodes. The finished graph is turned
//! into a dependency-ordered [`MaterializationPlan`] and handed to a
//! [`MaterializationEngine`].
//!
//! ```
//! use cim_compose::components::AwsNetwork;
//! use cim_compose::{ComponentArgs, DefaultSource, GraphBuilder};
//!
//! let mut graph = GraphBuilder::new(DefaultSource::default().with_region("eu-central-1"));
//! let network = graph.declare(AwsNetwork, ComponentArgs::new("core")).unwrap();
//!
//! let plan = graph.build().unwrap();
//! assert_eq!(plan.nodes.len(), graph.node_count());
//! assert_eq!(network.name().as_str(), "core");
//! ```

pub mod component;
pub mod components;
pub mod config;
pub mod domain;
pub mod errors;
pub mod graph;
pub mod materialize;
pub mod state_machine;

// Re-export commonly used types
pub use component::{Component, ComponentArgs, ComponentHandle, ComponentOutputs, NetworkCapability, Reference};
pub use config::{ConfigTree, DefaultSource};
pub use domain::{ResourceType, ValidationError, ValidationResult};
pub use errors::{CompositionError, CompositionResult, GraphError};
pub use graph::{GraphBuilder, MaterializationPlan, NodeSpec, PropertyValue, Scope, VertexId};
pub use materialize::{
    materialize, MaterializationEngine, MaterializationError, MaterializationReport, NodeOutcome, SimulatedEngine,
};
