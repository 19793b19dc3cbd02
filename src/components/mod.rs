// Copyright (c) 2025 - Cowboy AI, Inc.
//! Bundled Components
//!
//! Concrete instances of the composition pattern:
//!
//! - [`AwsNetwork`] - VPC with N subnets (positional fan-out)
//! - [`GithubRepository`] - Repository with branch/environment fan-out
//! - [`SentryProject`] - Monitored project with conditional alert channels
//! - [`AwsAppRunner`] - Container service with an implicit nested network
//! - [`CloudflarePagesProject`] - Static site project

pub mod aws_app_runner;
pub mod aws_network;
pub mod cloudflare_pages;
pub mod github_repository;
pub mod sentry_project;

pub use aws_app_runner::{AppRunnerConfig, AppRunnerOutputs, AwsAppRunner};
pub use aws_network::{AwsNetwork, AwsNetworkConfig, NetworkOutputs, VpcConfig};
pub use cloudflare_pages::{CloudflarePagesConfig, CloudflarePagesProject, PagesOutputs};
pub use github_repository::{GithubRepository, GithubRepositoryConfig, RepositoryOutputs};
pub use sentry_project::{SentryProject, SentryProjectConfig, SentryProjectOutputs};

use std::collections::BTreeMap;
use std::fmt;

use crate::component::Component;
use crate::domain::ValidationError;
use crate::errors::CompositionError;
use crate::graph::{PropertyValue, Scope};

/// Configuration error raised while populating, after validation passed
pub(crate) fn populate_error<C: Component>(
    scope: &Scope<'_>,
    field: &str,
    error: impl fmt::Display,
) -> CompositionError {
    CompositionError::Configuration {
        type_tag: C::TYPE_TAG.to_string(),
        component: scope.name().to_string(),
        source: ValidationError::invalid(field, error.to_string()),
    }
}

/// Caller tags plus a `Name` tag for one node
pub(crate) fn name_tags(tags: &BTreeMap<String, String>, logical_name: &str) -> PropertyValue {
    PropertyValue::map(
        tags.iter()
            .map(|(key, value)| (key.clone(), PropertyValue::from(value.as_str())))
            .chain([("Name".to_string(), PropertyValue::from(logical_name))]),
    )
}

/// List of literal strings
pub(crate) fn string_list(values: &[String]) -> PropertyValue {
    PropertyValue::List(values.iter().map(|value| PropertyValue::from(value.as_str())).collect())
}
