// Copyright (c) 2025 - Cowboy AI, Inc.
//! Output Registry
//!
//! Write-once store of each component's published outputs.

use std::collections::BTreeMap;

use super::vertex::{PropertyValue, VertexId};
use crate::errors::GraphError;

/// Named outputs of one component
pub type OutputMap = BTreeMap<String, PropertyValue>;

/// Published outputs keyed by component
#[derive(Debug, Clone, Default)]
pub struct OutputRegistry {
    published: BTreeMap<VertexId, OutputMap>,
}

impl OutputRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `outputs` for `component`; a second publish is rejected
    pub fn publish(
        &mut self,
        component: VertexId,
        name: &str,
        outputs: OutputMap,
    ) -> Result<(), GraphError> {
        if self.published.contains_key(&component) {
            return Err(GraphError::OutputsAlreadyPublished {
                component: name.to_string(),
            });
        }

        self.published.insert(component, outputs);
        Ok(())
    }

    /// Outputs of `component`, if published
    pub fn get(&self, component: VertexId) -> Option<&OutputMap> {
        self.published.get(&component)
    }

    /// Whether `component` has published
    pub fn contains(&self, component: VertexId) -> bool {
        self.published.contains_key(&component)
    }

    /// Remove everything published by components at or after `checkpoint`
    pub(crate) fn withdraw_from(&mut self, checkpoint: VertexId) -> usize {
        self.published.split_off(&checkpoint).len()
    }

    /// Number of publishing components
    pub fn len(&self) -> usize {
        self.published.len()
    }

    /// Whether nothing was published
    pub fn is_empty(&self) -> bool {
        self.published.is_empty()
    }
}
