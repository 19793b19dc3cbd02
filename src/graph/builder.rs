// Copyright (c) 2025 - Cowboy AI, Inc.
//! Dependency Graph Builder
//!
//! Accumulates components and resource nodes in one synchronous pass. Every
//! reference is checked at declaration time, so the builder never holds an
//! edge to a vertex that does not exist.
//!
//! A component that fails anywhere in its construction (configuration,
//! lifecycle, or a graph error raised by itself or a descendant) is rolled
//! back: every vertex allocated since it started is discarded and its
//! outputs are withdrawn. Vertex ids are never reused.
//!
//! A failure inside a component's scope fails that component even when its
//! `populate` drops the error, so the failure reaches the top-level
//! declaration.

use chrono::Utc;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};

use super::outputs::{OutputMap, OutputRegistry};
use super::scope::{NodeSpec, Scope};
use super::vertex::{
    ComponentRecord, ComponentRef, NodeRef, PropertyValue, ResourceNode, Vertex, VertexId,
};
use crate::component::{Component, ComponentArgs, ComponentHandle, ComponentOutputs};
use crate::config::{self, DefaultSource};
use crate::domain::{ComponentName, NameError, ValidationError};
use crate::errors::{CompositionError, CompositionResult, GraphError};
use crate::state_machine::{ComponentState, LifecycleCommand, StateMachineWithHistory};

/// Builder of the composition graph
///
/// # Example
///
/// ```rust
/// use cim_compose::components::AwsNetwork;
/// use cim_compose::component::ComponentArgs;
/// use cim_compose::config::DefaultSource;
/// use cim_compose::graph::GraphBuilder;
/// use serde_json::json;
///
/// let mut graph = GraphBuilder::new(DefaultSource::default());
/// let network = graph
///     .declare(
///         AwsNetwork,
///         ComponentArgs::new("core").with_overrides(json!({ "numberOfSubnets": 2 })),
///     )
///     .unwrap();
///
/// assert_eq!(network.outputs().subnet_ids.len(), 2);
/// let plan = graph.build().unwrap();
/// assert_eq!(plan.nodes.len(), graph.node_count());
/// ```
#[derive(Debug)]
pub struct GraphBuilder {
    defaults: DefaultSource,
    pub(crate) vertices: BTreeMap<VertexId, Vertex>,
    pub(crate) outputs: OutputRegistry,
    /// First failure raised inside each component still under construction
    failures: BTreeMap<VertexId, CompositionError>,
    next_id: u64,
}

impl GraphBuilder {
    /// Create an empty graph whose components draw defaults from `defaults`
    pub fn new(defaults: DefaultSource) -> Self {
        Self {
            defaults,
            vertices: BTreeMap::new(),
            outputs: OutputRegistry::new(),
            failures: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Defaults in effect for every component of this graph
    pub fn defaults(&self) -> &DefaultSource {
        &self.defaults
    }

    /// Construct a top-level component
    pub fn declare<C: Component>(
        &mut self,
        component: C,
        args: ComponentArgs,
    ) -> CompositionResult<ComponentHandle<C::Outputs>> {
        self.instantiate(None, component, args)
    }

    /// Any vertex by id
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.vertices.get(&id)
    }

    /// A resource node
    pub fn node(&self, node: NodeRef) -> Option<&ResourceNode> {
        match self.vertices.get(&node.id()) {
            Some(Vertex::Node(node)) => Some(node),
            _ => None,
        }
    }

    /// A component record
    pub fn component(&self, component: ComponentRef) -> Option<&ComponentRecord> {
        match self.vertices.get(&component.id()) {
            Some(Vertex::Component(record)) => Some(record),
            _ => None,
        }
    }

    /// All resource nodes in declaration order
    pub fn nodes(&self) -> impl Iterator<Item = &ResourceNode> {
        self.vertices.values().filter_map(|vertex| match vertex {
            Vertex::Node(node) => Some(node),
            Vertex::Component(_) => None,
        })
    }

    /// All components in declaration order
    pub fn components(&self) -> impl Iterator<Item = &ComponentRecord> {
        self.vertices.values().filter_map(|vertex| match vertex {
            Vertex::Component(record) => Some(record),
            Vertex::Node(_) => None,
        })
    }

    /// Number of resource nodes
    pub fn node_count(&self) -> usize {
        self.nodes().count()
    }

    /// Number of components
    pub fn component_count(&self) -> usize {
        self.components().count()
    }

    /// First node with the given identity
    pub fn find_node(&self, type_tag: &str, logical_name: &str) -> Option<&ResourceNode> {
        self.nodes()
            .find(|node| node.type_tag() == type_tag && node.logical_name() == logical_name)
    }

    /// All nodes of one type, in declaration order
    pub fn nodes_of_type<'a>(&'a self, type_tag: &'a str) -> impl Iterator<Item = &'a ResourceNode> {
        self.nodes().filter(move |node| node.type_tag() == type_tag)
    }

    /// First component with the given name
    pub fn find_component(&self, name: &str) -> Option<&ComponentRecord> {
        self.components().find(|record| record.name() == name)
    }

    /// Whether `candidate` is `ancestor` or lies in its ownership subtree
    pub fn is_within(&self, candidate: VertexId, ancestor: VertexId) -> bool {
        let mut current = Some(candidate);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.vertices.get(&id).and_then(Vertex::owner);
        }
        false
    }

    /// Published outputs of a component
    ///
    /// Fails with [`GraphError::OutputsNotReady`] until the component is
    /// `Populated`.
    pub fn outputs(&self, component: ComponentRef) -> Result<&OutputMap, GraphError> {
        let record = self
            .component(component)
            .ok_or(GraphError::UnknownReference(component.id()))?;

        let not_ready = || GraphError::OutputsNotReady {
            component: record.name().to_string(),
            state: record.state(),
        };

        if !record.state().outputs_readable() {
            return Err(not_ready());
        }
        self.outputs.get(component.id()).ok_or_else(not_ready)
    }

    /// A single named output of a component
    pub fn output(&self, component: ComponentRef, name: &str) -> Result<&PropertyValue, GraphError> {
        let outputs = self.outputs(component)?;
        outputs.get(name).ok_or_else(|| GraphError::UnknownOutput {
            component: self
                .component(component)
                .map(|record| record.name().to_string())
                .unwrap_or_default(),
            output: name.to_string(),
        })
    }

    /// The output registry
    pub fn registry(&self) -> &OutputRegistry {
        &self.outputs
    }

    #[instrument(
        level = "debug",
        skip_all,
        fields(type_tag = C::TYPE_TAG, component = %args.name())
    )]
    pub(crate) fn instantiate<C: Component>(
        &mut self,
        owner: Option<ComponentRef>,
        component: C,
        args: ComponentArgs,
    ) -> CompositionResult<ComponentHandle<C::Outputs>> {
        let checkpoint = VertexId(self.next_id);
        let result = self.construct(owner, component, args);

        if let Err(error) = &result {
            let discarded = self.rollback(checkpoint);
            warn!(%error, discarded, "Component construction failed, subtree discarded");
            if let Some(owner) = owner {
                self.record_failure(owner.id(), error);
            }
        }
        result
    }

    /// Remember a failure raised inside the scope of component `scope`
    pub(crate) fn record_failure(&mut self, scope: VertexId, error: &CompositionError) {
        self.failures.entry(scope).or_insert_with(|| error.clone());
    }

    fn construct<C: Component>(
        &mut self,
        owner: Option<ComponentRef>,
        component: C,
        args: ComponentArgs,
    ) -> CompositionResult<ComponentHandle<C::Outputs>> {
        let ComponentArgs {
            name,
            overrides,
            depends_on,
        } = args;

        let component_name = ComponentName::new(name.as_str()).map_err(|e| {
            let source = match e {
                NameError::Empty => ValidationError::Empty {
                    field: "name".to_string(),
                },
                other => ValidationError::invalid("name", other.to_string()),
            };
            configuration_error::<C>(&name, source)
        })?;

        let predecessors = depends_on
            .iter()
            .map(|id| self.ensure_exists(*id).map(|()| *id))
            .collect::<Result<BTreeSet<_>, _>>()?;

        let mut lifecycle = StateMachineWithHistory::new(ComponentState::Uninitialized);

        let resolved = config::resolve(&C::defaults(&self.defaults), &overrides)
            .map_err(|source| configuration_error::<C>(&name, source))?;
        advance(&mut lifecycle, LifecycleCommand::ResolveConfig, &name)?;

        if let Err(violation) =
            C::validate(&resolved.config).and_then(|()| component.validate_inputs(&resolved.config))
        {
            debug!(field = violation.field(), %violation, "Validation failed");
            return Err(configuration_error::<C>(&name, violation));
        }
        advance(&mut lifecycle, LifecycleCommand::Validate, &name)?;

        let owner_id = owner.map(VertexId::from);
        if let Some(owner_id) = owner_id {
            self.ensure_exists(owner_id)?;
        }
        self.ensure_unique(owner_id, C::TYPE_TAG, &name)?;
        advance(&mut lifecycle, LifecycleCommand::BeginPopulating, &name)?;

        let id = self.allocate();
        self.vertices.insert(
            id,
            Vertex::Component(ComponentRecord {
                id,
                type_tag: C::TYPE_TAG.to_string(),
                name: name.clone(),
                owner: owner_id,
                predecessors,
                effective_config: resolved.tree,
                children: Vec::new(),
                lifecycle,
            }),
        );
        if let Some(owner_id) = owner_id {
            self.attach(owner_id, id);
        }

        let this = ComponentRef(id);
        let populated = {
            let mut scope = Scope::new(self, this, component_name.clone());
            component.populate(&mut scope, &resolved.config)
        };
        let outputs = match (populated, self.failures.remove(&id)) {
            (Err(error), _) => return Err(error),
            (Ok(_), Some(error)) => {
                warn!(%error, "Failure inside the subtree was not propagated");
                return Err(error);
            }
            (Ok(outputs), None) => outputs,
        };

        self.outputs.publish(id, &name, outputs.entries())?;
        let children = match self.vertices.get_mut(&id) {
            Some(Vertex::Component(record)) => {
                advance(&mut record.lifecycle, LifecycleCommand::FinishPopulating, &name)?;
                record.children.len()
            }
            _ => return Err(GraphError::UnknownReference(id).into()),
        };

        info!(%id, children, "Component populated");
        Ok(ComponentHandle::new(this, component_name, outputs))
    }

    pub(crate) fn insert_node(
        &mut self,
        scope: ComponentRef,
        spec: NodeSpec,
    ) -> CompositionResult<NodeRef> {
        let NodeSpec {
            type_tag,
            logical_name,
            properties,
            owner,
            predecessors,
        } = spec;

        let scope_id = scope.id();
        let scope_name = self
            .component(scope)
            .map(|record| record.name().to_string())
            .ok_or(GraphError::UnknownReference(scope_id))?;

        let owner = owner.unwrap_or(scope_id);
        self.ensure_exists(owner)?;
        if !self.is_within(owner, scope_id) {
            return Err(GraphError::ForeignOwner {
                logical_name,
                owner,
                component: scope_name,
            }
            .into());
        }

        for predecessor in &predecessors {
            self.ensure_exists(*predecessor)?;
        }

        for reference in properties.values().flat_map(PropertyValue::attributes) {
            if !matches!(self.vertices.get(&reference.node), Some(Vertex::Node(_))) {
                return Err(GraphError::UnknownReference(reference.node).into());
            }
        }

        self.ensure_unique(Some(owner), &type_tag, &logical_name)?;

        let id = self.allocate();
        debug!(%id, %type_tag, %logical_name, %owner, "Node declared");
        self.vertices.insert(
            id,
            Vertex::Node(ResourceNode {
                id,
                type_tag,
                logical_name,
                properties,
                owner: Some(owner),
                predecessors,
            }),
        );
        self.attach(scope_id, id);

        Ok(NodeRef(id))
    }

    fn allocate(&mut self) -> VertexId {
        let id = VertexId(self.next_id);
        self.next_id += 1;
        id
    }

    fn attach(&mut self, component: VertexId, child: VertexId) {
        if let Some(Vertex::Component(record)) = self.vertices.get_mut(&component) {
            record.children.push(child);
        }
    }

    fn ensure_exists(&self, id: VertexId) -> Result<(), GraphError> {
        if self.vertices.contains_key(&id) {
            Ok(())
        } else {
            Err(GraphError::UnknownReference(id))
        }
    }

    fn ensure_unique(
        &self,
        owner: Option<VertexId>,
        type_tag: &str,
        logical_name: &str,
    ) -> Result<(), GraphError> {
        let clash = self.vertices.values().any(|vertex| {
            vertex.owner() == owner && vertex.type_tag() == type_tag && vertex.name() == logical_name
        });

        if clash {
            let scope = owner
                .and_then(|id| self.vertices.get(&id))
                .map_or_else(|| "<root>".to_string(), Vertex::label);
            return Err(GraphError::DuplicateName {
                type_tag: type_tag.to_string(),
                logical_name: logical_name.to_string(),
                scope,
            });
        }
        Ok(())
    }

    /// Discard every vertex allocated at or after `checkpoint`
    fn rollback(&mut self, checkpoint: VertexId) -> usize {
        let discarded = self.vertices.split_off(&checkpoint).len();
        self.outputs.withdraw_from(checkpoint);

        for vertex in self.vertices.values_mut() {
            if let Vertex::Component(record) = vertex {
                record.children.retain(|child| *child < checkpoint);
            }
        }
        discarded
    }
}

fn configuration_error<C: Component>(component: &str, source: ValidationError) -> CompositionError {
    CompositionError::Configuration {
        type_tag: C::TYPE_TAG.to_string(),
        component: component.to_string(),
        source,
    }
}

fn advance(
    lifecycle: &mut StateMachineWithHistory<ComponentState>,
    command: LifecycleCommand,
    component: &str,
) -> CompositionResult<()> {
    lifecycle
        .apply(command, Utc::now())
        .map_err(|source| CompositionError::Lifecycle {
            component: component.to_string(),
            source,
        })
}
