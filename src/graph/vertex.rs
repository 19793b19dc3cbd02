// Copyright (c) 2025 - Cowboy AI, Inc.
//! Graph vertices: resource nodes and component records
//!
//! Two distinct edge sets hang off every vertex:
//!
//! - `owner`: the ownership tree (created/destroyed as a unit)
//! - `predecessors`: explicit must-materialize-before constraints, which may
//!   cross ownership branches
//!
//! Both are fixed when the vertex is created.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::config::ConfigTree;
use crate::state_machine::{ComponentState, StateMachineWithHistory};

/// Identity of a vertex within one graph
///
/// Ids are allocated monotonically and never reused, including after a
/// failed component is rolled back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(pub(crate) u64);

impl VertexId {
    /// Raw numeric value
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Handle to a resource node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeRef(pub(crate) VertexId);

impl NodeRef {
    /// Vertex id of the node
    pub fn id(&self) -> VertexId {
        self.0
    }

    /// Reference to an attribute the engine reports once the node exists
    pub fn attr(&self, name: impl Into<String>) -> PropertyValue {
        PropertyValue::Attribute(AttributeRef {
            node: self.0,
            name: name.into(),
        })
    }
}

/// Handle to a component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentRef(pub(crate) VertexId);

impl ComponentRef {
    /// Vertex id of the component
    pub fn id(&self) -> VertexId {
        self.0
    }
}

impl From<NodeRef> for VertexId {
    fn from(node: NodeRef) -> Self {
        node.0
    }
}

impl From<&NodeRef> for VertexId {
    fn from(node: &NodeRef) -> Self {
        node.0
    }
}

impl From<ComponentRef> for VertexId {
    fn from(component: ComponentRef) -> Self {
        component.0
    }
}

impl From<&ComponentRef> for VertexId {
    fn from(component: &ComponentRef) -> Self {
        component.0
    }
}

/// Attribute of a node, known only after materialization
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributeRef {
    /// Node reporting the attribute
    pub node: VertexId,
    /// Attribute name (e.g. `id`)
    pub name: String,
}

/// Input property or output value
///
/// Either a literal known at construction time or a reference to an
/// attribute of another node, possibly nested in lists and maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyValue {
    /// Value known at construction time
    Literal(Value),
    /// Attribute of another node
    Attribute(AttributeRef),
    /// Sequence of values
    List(Vec<PropertyValue>),
    /// Mapping of values
    Map(BTreeMap<String, PropertyValue>),
}

impl PropertyValue {
    /// Literal value
    pub fn literal(value: impl Into<Value>) -> Self {
        PropertyValue::Literal(value.into())
    }

    /// Map built from `(key, value)` pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<PropertyValue>,
    {
        PropertyValue::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    /// The literal value, if this is one
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            PropertyValue::Literal(value) => Some(value),
            _ => None,
        }
    }

    /// The attribute reference, if this is one
    pub fn as_attribute(&self) -> Option<&AttributeRef> {
        match self {
            PropertyValue::Attribute(reference) => Some(reference),
            _ => None,
        }
    }

    /// Every attribute reference contained in this value
    pub fn attributes(&self) -> Vec<&AttributeRef> {
        let mut found = Vec::new();
        self.collect_attributes(&mut found);
        found
    }

    fn collect_attributes<'a>(&'a self, found: &mut Vec<&'a AttributeRef>) {
        match self {
            PropertyValue::Literal(_) => {}
            PropertyValue::Attribute(reference) => found.push(reference),
            PropertyValue::List(items) => {
                items.iter().for_each(|item| item.collect_attributes(found))
            }
            PropertyValue::Map(entries) => entries
                .values()
                .for_each(|value| value.collect_attributes(found)),
        }
    }

    /// Replace attribute references with concrete values
    ///
    /// Returns the first reference `lookup` cannot satisfy.
    pub fn resolve<F>(&self, lookup: &F) -> Result<Value, AttributeRef>
    where
        F: Fn(&AttributeRef) -> Option<Value>,
    {
        match self {
            PropertyValue::Literal(value) => Ok(value.clone()),
            PropertyValue::Attribute(reference) => {
                lookup(reference).ok_or_else(|| reference.clone())
            }
            PropertyValue::List(items) => items
                .iter()
                .map(|item| item.resolve(lookup))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            PropertyValue::Map(entries) => entries
                .iter()
                .map(|(key, value)| Ok((key.clone(), value.resolve(lookup)?)))
                .collect::<Result<serde_json::Map<_, _>, _>>()
                .map(Value::Object),
        }
    }
}

impl From<Value> for PropertyValue {
    fn from(value: Value) -> Self {
        PropertyValue::Literal(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Literal(Value::from(value))
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Literal(Value::from(value))
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Literal(Value::from(value))
    }
}

impl From<u32> for PropertyValue {
    fn from(value: u32) -> Self {
        PropertyValue::Literal(Value::from(value))
    }
}

impl From<u16> for PropertyValue {
    fn from(value: u16) -> Self {
        PropertyValue::Literal(Value::from(value))
    }
}

impl From<Vec<PropertyValue>> for PropertyValue {
    fn from(items: Vec<PropertyValue>) -> Self {
        PropertyValue::List(items)
    }
}

impl<T: Into<PropertyValue>> From<Option<T>> for PropertyValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(PropertyValue::Literal(Value::Null), Into::into)
    }
}

/// Atomic unit handed to the materialization engine
///
/// Identity is `(type_tag, logical_name)`; nothing changes after creation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceNode {
    pub(crate) id: VertexId,
    pub(crate) type_tag: String,
    pub(crate) logical_name: String,
    pub(crate) properties: BTreeMap<String, PropertyValue>,
    pub(crate) owner: Option<VertexId>,
    pub(crate) predecessors: BTreeSet<VertexId>,
}

impl ResourceNode {
    /// Vertex id
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Typed handle
    pub fn handle(&self) -> NodeRef {
        NodeRef(self.id)
    }

    /// Provider type tag
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Logical name
    pub fn logical_name(&self) -> &str {
        &self.logical_name
    }

    /// Input properties
    pub fn properties(&self) -> &BTreeMap<String, PropertyValue> {
        &self.properties
    }

    /// A single input property
    pub fn property(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Owning vertex
    pub fn owner(&self) -> Option<VertexId> {
        self.owner
    }

    /// Explicit predecessors
    pub fn predecessors(&self) -> &BTreeSet<VertexId> {
        &self.predecessors
    }

    /// Nodes whose attributes feed this node's properties
    pub fn data_dependencies(&self) -> BTreeSet<VertexId> {
        self.properties
            .values()
            .flat_map(|value| value.attributes())
            .map(|reference| reference.node)
            .collect()
    }
}

/// A declared component
#[derive(Debug, Clone)]
pub struct ComponentRecord {
    pub(crate) id: VertexId,
    pub(crate) type_tag: String,
    pub(crate) name: String,
    pub(crate) owner: Option<VertexId>,
    pub(crate) predecessors: BTreeSet<VertexId>,
    pub(crate) effective_config: ConfigTree,
    pub(crate) children: Vec<VertexId>,
    pub(crate) lifecycle: StateMachineWithHistory<ComponentState>,
}

impl ComponentRecord {
    /// Vertex id
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Typed handle
    pub fn handle(&self) -> ComponentRef {
        ComponentRef(self.id)
    }

    /// Component type tag
    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Component name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Owning component
    pub fn owner(&self) -> Option<VertexId> {
        self.owner
    }

    /// Explicit predecessors
    pub fn predecessors(&self) -> &BTreeSet<VertexId> {
        &self.predecessors
    }

    /// Merged configuration, fixed at construction
    pub fn effective_config(&self) -> &ConfigTree {
        &self.effective_config
    }

    /// Vertices declared by this component, in declaration order
    pub fn children(&self) -> &[VertexId] {
        &self.children
    }

    /// Current lifecycle state
    pub fn state(&self) -> ComponentState {
        *self.lifecycle.current()
    }

    /// Lifecycle transitions taken so far
    pub fn lifecycle(&self) -> &StateMachineWithHistory<ComponentState> {
        &self.lifecycle
    }
}

/// A vertex of the composition graph
#[derive(Debug, Clone)]
pub enum Vertex {
    /// Resource node
    Node(ResourceNode),
    /// Component
    Component(ComponentRecord),
}

impl Vertex {
    /// Vertex id
    pub fn id(&self) -> VertexId {
        match self {
            Vertex::Node(node) => node.id,
            Vertex::Component(component) => component.id,
        }
    }

    /// Type tag
    pub fn type_tag(&self) -> &str {
        match self {
            Vertex::Node(node) => &node.type_tag,
            Vertex::Component(component) => &component.type_tag,
        }
    }

    /// Logical name of a node, name of a component
    pub fn name(&self) -> &str {
        match self {
            Vertex::Node(node) => &node.logical_name,
            Vertex::Component(component) => &component.name,
        }
    }

    /// Owning vertex
    pub fn owner(&self) -> Option<VertexId> {
        match self {
            Vertex::Node(node) => node.owner,
            Vertex::Component(component) => component.owner,
        }
    }

    /// Explicit predecessors
    pub fn predecessors(&self) -> &BTreeSet<VertexId> {
        match self {
            Vertex::Node(node) => &node.predecessors,
            Vertex::Component(component) => &component.predecessors,
        }
    }

    /// Whether this is a component
    pub fn is_component(&self) -> bool {
        matches!(self, Vertex::Component(_))
    }

    /// Human-readable label: `type 'name'`
    pub fn label(&self) -> String {
        format!("{} '{}'", self.type_tag(), self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node(id: u64) -> NodeRef {
        NodeRef(VertexId(id))
    }

    #[test]
    fn test_attributes_are_collected_recursively() {
        let value = PropertyValue::map([
            ("vpcId", node(1).attr("id")),
            (
                "subnets",
                PropertyValue::List(vec![node(2).attr("id"), node(3).attr("id")]),
            ),
            ("name", PropertyValue::from("web")),
        ]);

        let nodes: Vec<u64> = value.attributes().iter().map(|r| r.node.value()).collect();
        assert_eq!(nodes, vec![2, 3, 1]);
    }

    #[test]
    fn test_resolve_substitutes_attributes() {
        let value = PropertyValue::List(vec![node(1).attr("id"), PropertyValue::from("x")]);
        let resolved = value
            .resolve(&|reference: &AttributeRef| {
                (reference.node == VertexId(1)).then(|| json!("vpc-123"))
            })
            .unwrap();

        assert_eq!(resolved, json!(["vpc-123", "x"]));
    }

    #[test]
    fn test_resolve_reports_missing_attribute() {
        let value = node(7).attr("arn");
        let missing = value.resolve(&|_: &AttributeRef| None).unwrap_err();
        assert_eq!(missing.node, VertexId(7));
        assert_eq!(missing.name, "arn");
    }

    #[test]
    fn test_option_becomes_null_literal() {
        let absent: Option<String> = None;
        assert_eq!(PropertyValue::from(absent), PropertyValue::Literal(json!(null)));
        assert_eq!(
            PropertyValue::from(Some("x")),
            PropertyValue::Literal(json!("x"))
        );
    }
}
