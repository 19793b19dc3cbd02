// Copyright (c) 2025 - Cowboy AI, Inc.
//! GitHub repository with branch, environment and team fan-out
//!
//! For every configured branch the repository gets a branch, a deployment
//! environment named by [`environment_slug`] and a deployment policy for
//! that environment. Environments wait for every branch and the default
//! branch; each policy waits only for its own environment.

use serde::{Deserialize, Serialize};

use super::string_list;
use crate::component::{Component, ComponentOutputs};
use crate::config::DefaultSource;
use crate::domain::invariants::{
    require_all_or_none, require_member, require_non_empty, require_unique,
};
use crate::domain::{environment_slug, ResourceType, ValidationResult};
use crate::errors::CompositionResult;
use crate::graph::{NodeRef, NodeSpec, OutputMap, PropertyValue, Scope};

const VISIBILITIES: [&str; 2] = ["public", "private"];

/// Repository component
#[derive(Debug, Clone, Copy, Default)]
pub struct GithubRepository;

/// Branch layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GitConfig {
    pub default_branch: String,
    pub branches: Vec<String>,
}

/// Template the repository is generated from
///
/// Both fields must be given once a template is supplied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TemplateSource {
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub repository: Option<String>,
}

/// Repository settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RepositorySettings {
    pub description: Option<String>,
    pub visibility: String,
    pub home_page_url: Option<String>,
    pub topics: Vec<String>,
    pub based_on_template: Option<TemplateSource>,
    pub is_template: bool,
}

/// Owning organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrganizationConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub teams: Vec<String>,
}

/// Optional repository features
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnabledFeatures {
    pub issues: bool,
    pub discussions: bool,
    pub projects: bool,
    pub wiki: bool,
    pub security_alerts: bool,
}

/// Repository configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct GithubRepositoryConfig {
    pub owner: Option<String>,
    pub git: GitConfig,
    pub repository: RepositorySettings,
    pub organization: Option<OrganizationConfig>,
    pub enabled_features: EnabledFeatures,
}

impl GithubRepositoryConfig {
    /// Account owning the repository: explicit owner, else the organization
    pub fn effective_owner(&self) -> Option<&str> {
        self.owner.as_deref().or_else(|| {
            self.organization
                .as_ref()
                .map(|organization| organization.name.as_str())
                .filter(|name| !name.is_empty())
        })
    }
}

/// Repository outputs
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryOutputs {
    pub repository_id: PropertyValue,
    pub repository_name: PropertyValue,
    /// Environment slugs in branch order
    pub environments: Vec<String>,
}

impl ComponentOutputs for RepositoryOutputs {
    fn entries(&self) -> OutputMap {
        OutputMap::from([
            ("repositoryId".to_string(), self.repository_id.clone()),
            ("repositoryName".to_string(), self.repository_name.clone()),
            ("environments".to_string(), string_list(&self.environments)),
        ])
    }
}

impl Component for GithubRepository {
    const TYPE_TAG: &'static str = "project:repository:github";
    type Config = GithubRepositoryConfig;
    type Outputs = RepositoryOutputs;

    fn defaults(source: &DefaultSource) -> GithubRepositoryConfig {
        GithubRepositoryConfig {
            owner: source.github_owner.clone(),
            git: GitConfig {
                default_branch: "main".to_string(),
                branches: vec!["develop".to_string(), "staging".to_string(), "main".to_string()],
            },
            repository: RepositorySettings {
                description: None,
                visibility: "private".to_string(),
                home_page_url: None,
                topics: Vec::new(),
                based_on_template: None,
                is_template: false,
            },
            organization: None,
            enabled_features: EnabledFeatures {
                issues: false,
                discussions: false,
                projects: false,
                wiki: false,
                security_alerts: true,
            },
        }
    }

    fn validate(config: &GithubRepositoryConfig) -> ValidationResult {
        let git = &config.git;
        require_non_empty("git.defaultBranch", &git.default_branch)?;
        for branch in &git.branches {
            require_non_empty("git.branches", branch)?;
        }
        require_unique("git.branches", git.branches.iter().map(String::as_str))?;
        require_member(
            "git.defaultBranch",
            &git.default_branch,
            "git.branches",
            &git.branches,
        )?;
        require_unique(
            "git.branches",
            git.branches.iter().map(|branch| environment_slug(branch)),
        )?;

        let allowed: Vec<String> = VISIBILITIES.iter().map(|v| v.to_string()).collect();
        require_member(
            "repository.visibility",
            &config.repository.visibility,
            "visibility options",
            &allowed,
        )?;

        if let Some(template) = &config.repository.based_on_template {
            require_all_or_none(&[
                ("repository.basedOnTemplate.owner", template.owner.is_some()),
                ("repository.basedOnTemplate.repository", template.repository.is_some()),
            ])?;
            if let Some(owner) = &template.owner {
                require_non_empty("repository.basedOnTemplate.owner", owner)?;
            }
            if let Some(repository) = &template.repository {
                require_non_empty("repository.basedOnTemplate.repository", repository)?;
            }
        }

        if let Some(organization) = &config.organization {
            require_non_empty("organization.name", &organization.name)?;
            require_unique("organization.teams", organization.teams.iter().map(String::as_str))?;
        }
        Ok(())
    }

    fn populate(self, scope: &mut Scope<'_>, config: &GithubRepositoryConfig) -> CompositionResult<RepositoryOutputs> {
        let name = scope.name().clone();
        let settings = &config.repository;
        let features = &config.enabled_features;

        let template_property = match settings
            .based_on_template
            .as_ref()
            .map(|template| (&template.owner, &template.repository))
        {
            Some((Some(owner), Some(repository))) => PropertyValue::map([
                ("owner", owner.as_str()),
                ("repository", repository.as_str()),
            ]),
            _ => PropertyValue::from(None::<String>),
        };

        let repository = scope.node(
            NodeSpec::new(ResourceType::Repository, name.as_str())
                .property("name", name.as_str())
                .property("owner", config.effective_owner())
                .property("description", settings.description.as_deref())
                .property("visibility", settings.visibility.as_str())
                .property("homepageUrl", settings.home_page_url.as_deref())
                .property("topics", string_list(&settings.topics))
                .property("autoInit", true)
                .property("deleteBranchOnMerge", true)
                .property("isTemplate", settings.is_template)
                .property("template", template_property)
                .property("hasIssues", features.issues)
                .property("hasWiki", features.wiki)
                .property("hasDownloads", false)
                .property("hasDiscussions", features.discussions)
                .property("hasProjects", features.projects)
                .property("vulnerabilityAlerts", features.security_alerts)
                .property("allowMergeCommit", true)
                .property("mergeCommitTitle", "MERGE_MESSAGE")
                .property("mergeCommitMessage", "PR_TITLE")
                .property("allowRebaseMerge", true)
                .property("allowSquashMerge", false),
        )?;

        let mut branches: Vec<NodeRef> = Vec::with_capacity(config.git.branches.len());
        for branch in &config.git.branches {
            let node = scope.node(
                NodeSpec::new(ResourceType::Branch, name.child(&format!("{branch}-branch")))
                    .property("repository", repository.attr("name"))
                    .property("branch", branch.as_str())
                    .property("sourceBranch", config.git.default_branch.as_str())
                    .owned_by(repository)
                    .depends_on(repository),
            )?;
            branches.push(node);
        }

        let default_branch = scope.node(
            NodeSpec::new(ResourceType::BranchDefault, name.child("default-branch"))
                .property("repository", repository.attr("name"))
                .property("branch", config.git.default_branch.as_str())
                .owned_by(repository)
                .depends_on(repository),
        )?;

        let mut environments = Vec::with_capacity(config.git.branches.len());
        for branch in &config.git.branches {
            let slug = environment_slug(branch);
            let environment = scope.node(
                NodeSpec::new(
                    ResourceType::RepositoryEnvironment,
                    name.child(&format!("{branch}-environment")),
                )
                .property("repository", repository.attr("name"))
                .property("environment", slug)
                .property(
                    "deploymentBranchPolicy",
                    PropertyValue::map([
                        ("customBranchPolicies", true),
                        ("protectedBranches", false),
                    ]),
                )
                .owned_by(repository)
                .depends_on(repository)
                .depends_on_all(branches.iter().copied())
                .depends_on(default_branch),
            )?;

            scope.node(
                NodeSpec::new(
                    ResourceType::EnvironmentDeploymentPolicy,
                    name.child(&format!("{branch}-environment-policy")),
                )
                .property("repository", repository.attr("name"))
                .property("environment", slug)
                .property("branchPattern", branch.as_str())
                .owned_by(environment)
                .depends_on(environment),
            )?;

            environments.push(slug.to_string());
        }

        if let Some(organization) = &config.organization {
            for team in &organization.teams {
                scope.node(
                    NodeSpec::new(ResourceType::TeamRepository, name.child(&format!("{team}-team")))
                        .property("repository", repository.attr("name"))
                        .property("teamId", team.as_str())
                        .owned_by(repository)
                        .depends_on(repository),
                )?;
            }
        }

        Ok(RepositoryOutputs {
            repository_id: repository.attr("id"),
            repository_name: repository.attr("name"),
            environments,
        })
    }
}
