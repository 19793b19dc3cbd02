// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory engine for dry runs and tests
//!
//! Echoes every input property back as an attribute, fabricates `id` and
//! `arn`, and adds the per-type attributes the bundled components read
//! (`dsnPublic`, `serviceUrl`, `subdomain`).

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::BTreeSet;
use std::sync::Mutex;
use tracing::debug;

use super::{MaterializationEngine, MaterializationError, NodeAttributes, NodeRequest};
use crate::domain::ResourceType;

/// Engine that pretends every node exists
#[derive(Debug, Default)]
pub struct SimulatedEngine {
    failures: BTreeSet<String>,
    created: Mutex<Vec<NodeRequest>>,
}

impl SimulatedEngine {
    /// Engine that succeeds for every node
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the node with `logical_name`
    pub fn failing(mut self, logical_name: impl Into<String>) -> Self {
        self.failures.insert(logical_name.into());
        self
    }

    /// Requests that succeeded, in completion order
    pub fn created(&self) -> Vec<NodeRequest> {
        self.created
            .lock()
            .map(|created| created.clone())
            .unwrap_or_default()
    }

    /// Logical names of the created nodes, in completion order
    pub fn created_names(&self) -> Vec<String> {
        self.created()
            .into_iter()
            .map(|request| request.logical_name)
            .collect()
    }
}

fn attributes_for(request: &NodeRequest) -> NodeAttributes {
    let name = &request.logical_name;
    let id = format!("sim-{name}");

    let mut attributes = request.properties.clone();
    attributes.insert("id".to_string(), json!(id));
    attributes.insert(
        "arn".to_string(),
        json!(format!("arn:sim:{}:{name}", request.type_tag)),
    );

    let extra = match ResourceType::from_token(&request.type_tag) {
        Some(ResourceType::SentryKey) => Some(("dsnPublic", format!("https://{id}@sentry.invalid/{name}"))),
        Some(ResourceType::AppRunnerService) => Some(("serviceUrl", format!("{name}.awsapprunner.com"))),
        Some(ResourceType::PagesProject) => Some(("subdomain", format!("{name}.pages.dev"))),
        _ => None,
    };
    if let Some((attribute, value)) = extra {
        attributes.insert(attribute.to_string(), Value::String(value));
    }

    attributes
}

#[async_trait]
impl MaterializationEngine for SimulatedEngine {
    async fn create(&self, request: NodeRequest) -> Result<NodeAttributes, MaterializationError> {
        tokio::task::yield_now().await;

        if self.failures.contains(&request.logical_name) {
            debug!(node = %request.logical_name, "Simulated failure");
            return Err(MaterializationError::Rejected {
                type_tag: request.type_tag,
                logical_name: request.logical_name,
                reason: "simulated failure".to_string(),
            });
        }

        let attributes = attributes_for(&request);
        debug!(node = %request.logical_name, "Simulated create");
        if let Ok(mut created) = self.created.lock() {
            created.push(request);
        }
        Ok(attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::VertexId;
    use std::collections::BTreeMap;

    fn request(type_tag: ResourceType, name: &str) -> NodeRequest {
        NodeRequest {
            id: VertexId(0),
            type_tag: type_tag.to_string(),
            logical_name: name.to_string(),
            owner: None,
            properties: BTreeMap::from([("name".to_string(), json!(name))]),
        }
    }

    #[tokio::test]
    async fn test_echoes_properties_and_fabricates_id() {
        let engine = SimulatedEngine::new();
        let attributes = engine.create(request(ResourceType::Repository, "site")).await.unwrap();

        assert_eq!(attributes.get("name"), Some(&json!("site")));
        assert_eq!(attributes.get("id"), Some(&json!("sim-site")));
        assert_eq!(engine.created_names(), vec!["site".to_string()]);
    }

    #[tokio::test]
    async fn test_type_specific_attributes() {
        let engine = SimulatedEngine::new();
        let pages = engine.create(request(ResourceType::PagesProject, "docs")).await.unwrap();
        assert_eq!(pages.get("subdomain"), Some(&json!("docs.pages.dev")));

        let key = engine.create(request(ResourceType::SentryKey, "api-key")).await.unwrap();
        assert!(key.contains_key("dsnPublic"));
    }

    #[tokio::test]
    async fn test_configured_failure() {
        let engine = SimulatedEngine::new().failing("site");
        let err = engine.create(request(ResourceType::Repository, "site")).await.unwrap_err();

        assert!(matches!(err, MaterializationError::Rejected { .. }));
        assert!(engine.created().is_empty());
    }
}
