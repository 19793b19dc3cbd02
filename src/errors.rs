// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for composition operations
//!
//! Construction fails with one of two deterministic error families:
//!
//! - **Configuration errors**: a component's merged configuration violates an
//!   invariant; reported with the component, its type tag and the field path
//! - **Graph-construction errors**: unknown references, duplicate identities,
//!   predecessor cycles, premature output reads
//!
//! Neither is retried. Materialization failures live in
//! [`crate::materialize::MaterializationError`].

use thiserror::Error;

use crate::domain::ValidationError;
use crate::graph::VertexId;
use crate::state_machine::{ComponentState, TransitionError};

/// Errors raised while declaring components and building the graph
#[derive(Debug, Clone, Error)]
pub enum CompositionError {
    /// Merged configuration violates a component invariant
    #[error("Configuration error in {type_tag} '{component}': {source}")]
    Configuration {
        type_tag: String,
        component: String,
        source: ValidationError,
    },

    /// Malformed graph
    #[error("Graph construction error: {0}")]
    Graph(#[from] GraphError),

    /// Lifecycle driven out of order
    #[error("Lifecycle error in component '{component}': {source}")]
    Lifecycle {
        component: String,
        source: TransitionError,
    },
}

impl CompositionError {
    /// The violated invariant, for configuration errors
    pub fn validation_error(&self) -> Option<&ValidationError> {
        match self {
            Self::Configuration { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Dotted path of the offending field, for configuration errors
    pub fn field(&self) -> Option<&str> {
        self.validation_error().map(ValidationError::field)
    }

    /// Whether this is a configuration error
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }

    /// The graph error, if any
    pub fn graph_error(&self) -> Option<&GraphError> {
        match self {
            Self::Graph(error) => Some(error),
            _ => None,
        }
    }
}

/// Errors detected by the dependency graph builder
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// Edge or owner names a vertex that does not exist
    #[error("Reference to {0} which does not exist")]
    UnknownReference(VertexId),

    /// Two siblings share a `(type tag, logical name)` identity
    #[error("Duplicate resource {type_tag} '{logical_name}' in scope of {scope}")]
    DuplicateName {
        type_tag: String,
        logical_name: String,
        scope: String,
    },

    /// Owner is outside the declaring component's subtree
    #[error("'{logical_name}' cannot be owned by {owner}: owner is outside component '{component}'")]
    ForeignOwner {
        logical_name: String,
        owner: VertexId,
        component: String,
    },

    /// Ordering constraints form a cycle
    #[error("Dependency cycle between: {}", members.join(", "))]
    Cycle { members: Vec<String> },

    /// Outputs read before the component finished populating
    #[error("Outputs of '{component}' are not available in state {state}")]
    OutputsNotReady {
        component: String,
        state: ComponentState,
    },

    /// Outputs published twice
    #[error("Outputs of '{component}' are already published")]
    OutputsAlreadyPublished { component: String },

    /// Named output does not exist
    #[error("Component '{component}' has no output '{output}'")]
    UnknownOutput { component: String, output: String },
}

/// Result type for composition operations
pub type CompositionResult<T> = Result<T, CompositionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_names_field() {
        let error = CompositionError::Configuration {
            type_tag: "project:repository:github".to_string(),
            component: "site".to_string(),
            source: ValidationError::Empty {
                field: "git.defaultBranch".to_string(),
            },
        };

        assert!(error.is_configuration());
        assert_eq!(error.field(), Some("git.defaultBranch"));
        assert_eq!(
            error.to_string(),
            "Configuration error in project:repository:github 'site': git.defaultBranch: must not be empty"
        );
    }

    #[test]
    fn test_cycle_message_lists_members() {
        let error: CompositionError = GraphError::Cycle {
            members: vec!["a".to_string(), "b".to_string()],
        }
        .into();

        assert!(!error.is_configuration());
        assert!(error.graph_error().is_some());
        assert_eq!(
            error.to_string(),
            "Graph construction error: Dependency cycle between: a, b"
        );
    }
}
