// Copyright (c) 2025 - Cowboy AI, Inc.
//! Cloudflare Pages project

use serde::{Deserialize, Serialize};

use crate::component::{Component, ComponentOutputs};
use crate::config::DefaultSource;
use crate::domain::invariants::require_non_empty;
use crate::domain::{ResourceType, ValidationResult};
use crate::errors::CompositionResult;
use crate::graph::{NodeSpec, OutputMap, PropertyValue, Scope};

/// Static site component
#[derive(Debug, Clone, Copy, Default)]
pub struct CloudflarePagesProject;

/// Account settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CloudflareAccount {
    pub account_id: String,
}

/// Build settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BuildConfig {
    pub cache: bool,
    pub build_command: String,
    pub destination_dir: String,
}

/// Pages configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CloudflarePagesConfig {
    pub cloudflare: CloudflareAccount,
    pub build: BuildConfig,
    pub production_branch: String,
}

/// Pages outputs
#[derive(Debug, Clone, PartialEq)]
pub struct PagesOutputs {
    pub project_id: PropertyValue,
    pub subdomain: PropertyValue,
}

impl ComponentOutputs for PagesOutputs {
    fn entries(&self) -> OutputMap {
        OutputMap::from([
            ("projectId".to_string(), self.project_id.clone()),
            ("subdomain".to_string(), self.subdomain.clone()),
        ])
    }
}

impl Component for CloudflarePagesProject {
    const TYPE_TAG: &'static str = "web:cloudflare-pages:project";
    type Config = CloudflarePagesConfig;
    type Outputs = PagesOutputs;

    fn defaults(source: &DefaultSource) -> CloudflarePagesConfig {
        CloudflarePagesConfig {
            cloudflare: CloudflareAccount {
                account_id: source.cloudflare_account_id.clone().unwrap_or_default(),
            },
            build: BuildConfig {
                cache: false,
                build_command: "npm run build".to_string(),
                destination_dir: "dist".to_string(),
            },
            production_branch: "main".to_string(),
        }
    }

    fn validate(config: &CloudflarePagesConfig) -> ValidationResult {
        require_non_empty("cloudflare.accountId", &config.cloudflare.account_id)?;
        require_non_empty("build.buildCommand", &config.build.build_command)?;
        require_non_empty("build.destinationDir", &config.build.destination_dir)?;
        require_non_empty("productionBranch", &config.production_branch)
    }

    fn populate(self, scope: &mut Scope<'_>, config: &CloudflarePagesConfig) -> CompositionResult<PagesOutputs> {
        let name = scope.name().clone();

        let project = scope.node(
            NodeSpec::new(ResourceType::PagesProject, name.as_str())
                .property("name", name.as_str())
                .property("accountId", config.cloudflare.account_id.as_str())
                .property("productionBranch", config.production_branch.as_str())
                .property(
                    "buildConfig",
                    PropertyValue::map([
                        ("buildCaching", PropertyValue::from(config.build.cache)),
                        ("buildCommand", PropertyValue::from(config.build.build_command.as_str())),
                        ("destinationDir", PropertyValue::from(config.build.destination_dir.as_str())),
                    ]),
                ),
        )?;

        Ok(PagesOutputs {
            project_id: project.attr("id"),
            subdomain: project.attr("subdomain"),
        })
    }
}
