// Copyright (c) 2025 - Cowboy AI, Inc.
//! Component Abstraction
//!
//! A component is a named, typed unit that resolves its configuration,
//! validates it, and then populates the graph with resource nodes and nested
//! components. The engine drives every component through the same sequence:
//!
//! ```text
//! defaults(source) ─► merge(overrides) ─► validate ─► populate ─► outputs
//! ```
//!
//! Implementations only describe the shape: the configuration type and its
//! defaults, the invariants, the children, and the outputs.

pub mod reference;

pub use reference::{NetworkCapability, Reference};

use serde::{de::DeserializeOwned, Serialize};
use std::fmt;

use crate::config::{ConfigTree, DefaultSource};
use crate::domain::{ComponentName, ValidationResult};
use crate::errors::CompositionResult;
use crate::graph::{ComponentRef, OutputMap, Scope, VertexId};

/// A reusable, parameterized unit of composition
pub trait Component: Sized {
    /// Type tag recorded on the component (`infra:networking:aws-network`)
    const TYPE_TAG: &'static str;

    /// Typed configuration; every option has a default
    type Config: Serialize + DeserializeOwned;

    /// Typed outputs published once populated
    type Outputs: ComponentOutputs;

    /// Static defaults, computed from the injected default source
    fn defaults(source: &DefaultSource) -> Self::Config;

    /// Invariants of the merged configuration
    ///
    /// Pure: called before anything is created, the first violation aborts
    /// construction.
    fn validate(config: &Self::Config) -> ValidationResult;

    /// Invariants relating the configuration to this instance's references
    ///
    /// Checked right after [`validate`](Self::validate), before anything is
    /// created.
    fn validate_inputs(&self, _config: &Self::Config) -> ValidationResult {
        Ok(())
    }

    /// Create children in declaration order and return the outputs
    fn populate(self, scope: &mut Scope<'_>, config: &Self::Config) -> CompositionResult<Self::Outputs>;
}

/// Typed outputs that can be published to the registry
pub trait ComponentOutputs: Clone + fmt::Debug {
    /// Outputs keyed by their camelCase name
    fn entries(&self) -> OutputMap;
}

/// Caller-supplied arguments of one component instance
#[derive(Debug, Clone)]
pub struct ComponentArgs {
    pub(crate) name: String,
    pub(crate) overrides: ConfigTree,
    pub(crate) depends_on: Vec<VertexId>,
}

impl ComponentArgs {
    /// Arguments with no overrides and no predecessors
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            overrides: ConfigTree::empty(),
            depends_on: Vec::new(),
        }
    }

    /// Partial configuration merged over the component's defaults
    pub fn with_overrides(mut self, overrides: impl Into<ConfigTree>) -> Self {
        self.overrides = overrides.into();
        self
    }

    /// Require `predecessor` to materialize before this component
    pub fn depends_on(mut self, predecessor: impl Into<VertexId>) -> Self {
        self.depends_on.push(predecessor.into());
        self
    }

    /// Requested component name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Partial configuration
    pub fn overrides(&self) -> &ConfigTree {
        &self.overrides
    }
}

/// A populated component together with its typed outputs
#[derive(Debug, Clone)]
pub struct ComponentHandle<O> {
    component: ComponentRef,
    name: ComponentName,
    outputs: O,
}

impl<O> ComponentHandle<O> {
    pub(crate) fn new(component: ComponentRef, name: ComponentName, outputs: O) -> Self {
        Self {
            component,
            name,
            outputs,
        }
    }

    /// Graph handle of the component
    pub fn component(&self) -> ComponentRef {
        self.component
    }

    /// Vertex id of the component
    pub fn id(&self) -> VertexId {
        self.component.id()
    }

    /// Component name
    pub fn name(&self) -> &ComponentName {
        &self.name
    }

    /// Typed outputs
    pub fn outputs(&self) -> &O {
        &self.outputs
    }
}

impl<O> From<&ComponentHandle<O>> for VertexId {
    fn from(handle: &ComponentHandle<O>) -> Self {
        handle.id()
    }
}

impl<O> From<&ComponentHandle<O>> for ComponentRef {
    fn from(handle: &ComponentHandle<O>) -> Self {
        handle.component
    }
}
