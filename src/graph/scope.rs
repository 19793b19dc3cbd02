// Copyright (c) 2025 - Cowboy AI, Inc.
//! Construction scope handed to a component while it populates

use std::collections::{BTreeMap, BTreeSet};

use super::builder::GraphBuilder;
use super::outputs::OutputMap;
use super::vertex::{ComponentRef, NodeRef, PropertyValue, VertexId};
use crate::component::{Component, ComponentArgs, ComponentHandle};
use crate::config::DefaultSource;
use crate::domain::ComponentName;
use crate::errors::{CompositionResult, GraphError};

/// Declaration of a resource node
///
/// Without [`owned_by`](Self::owned_by) the node is owned by the component
/// whose scope declares it.
///
/// ```rust
/// use cim_compose::domain::ResourceType;
/// use cim_compose::graph::NodeSpec;
///
/// let spec = NodeSpec::new(ResourceType::Vpc, "web-vpc")
///     .property("cidrBlock", "10.0.0.0/16")
///     .property("enableDnsSupport", true);
/// assert_eq!(spec.logical_name(), "web-vpc");
/// ```
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub(crate) type_tag: String,
    pub(crate) logical_name: String,
    pub(crate) properties: BTreeMap<String, PropertyValue>,
    pub(crate) owner: Option<VertexId>,
    pub(crate) predecessors: BTreeSet<VertexId>,
}

impl NodeSpec {
    /// Start a declaration
    pub fn new(type_tag: impl Into<String>, logical_name: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            logical_name: logical_name.into(),
            properties: BTreeMap::new(),
            owner: None,
            predecessors: BTreeSet::new(),
        }
    }

    /// Set an input property
    pub fn property(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Parent the node under another vertex of the same component subtree
    pub fn owned_by(mut self, owner: impl Into<VertexId>) -> Self {
        self.owner = Some(owner.into());
        self
    }

    /// Require `predecessor` to materialize first
    pub fn depends_on(mut self, predecessor: impl Into<VertexId>) -> Self {
        self.predecessors.insert(predecessor.into());
        self
    }

    /// Require every vertex in `predecessors` to materialize first
    pub fn depends_on_all<I, V>(mut self, predecessors: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<VertexId>,
    {
        self.predecessors
            .extend(predecessors.into_iter().map(Into::into));
        self
    }

    /// Logical name
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    /// Type tag
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }
}

/// The graph as seen from inside one component's `populate`
pub struct Scope<'g> {
    graph: &'g mut GraphBuilder,
    component: ComponentRef,
    name: ComponentName,
}

impl<'g> Scope<'g> {
    pub(crate) fn new(graph: &'g mut GraphBuilder, component: ComponentRef, name: ComponentName) -> Self {
        Self {
            graph,
            component,
            name,
        }
    }

    /// Name of the component being populated
    pub fn name(&self) -> &ComponentName {
        &self.name
    }

    /// Handle of the component being populated
    pub fn this(&self) -> ComponentRef {
        self.component
    }

    /// Defaults in effect for this graph
    pub fn defaults(&self) -> &DefaultSource {
        self.graph.defaults()
    }

    /// Declare a resource node owned by this component (or one of its nodes)
    ///
    /// A failure here fails the component even if the caller drops it.
    pub fn node(&mut self, spec: NodeSpec) -> CompositionResult<NodeRef> {
        let result = self.graph.insert_node(self.component, spec);
        if let Err(error) = &result {
            self.graph.record_failure(self.component.id(), error);
        }
        result
    }

    /// Construct a nested component owned by this one
    ///
    /// A failure here fails this component even if the caller drops it.
    pub fn component<C: Component>(
        &mut self,
        component: C,
        args: ComponentArgs,
    ) -> CompositionResult<ComponentHandle<C::Outputs>> {
        self.graph.instantiate(Some(self.component), component, args)
    }

    /// Published outputs of another component
    pub fn outputs_of(&self, component: ComponentRef) -> Result<&OutputMap, GraphError> {
        self.graph.outputs(component)
    }

    /// Read-only view of the whole graph
    pub fn graph(&self) -> &GraphBuilder {
        self.graph
    }
}
