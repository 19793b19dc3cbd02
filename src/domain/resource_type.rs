// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Node Type Taxonomy
//!
//! Type tags of the resource nodes created by the bundled components. A tag
//! is the provider token the materialization engine dispatches on
//! (`aws:ec2/vpc:Vpc`); the graph itself stores tags as plain strings so
//! components outside this crate may declare their own.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    // AWS networking
    /// Virtual private cloud
    Vpc,
    /// VPC subnet
    Subnet,
    /// Route table
    RouteTable,
    /// Subnet to route table association
    RouteTableAssociation,
    /// Internet gateway
    InternetGateway,
    /// Route entry
    Route,
    /// Security group
    SecurityGroup,

    // AWS application runtime
    /// App Runner VPC connector
    VpcConnector,
    /// App Runner service
    AppRunnerService,

    // GitHub
    /// Repository
    Repository,
    /// Git branch
    Branch,
    /// Default branch setting
    BranchDefault,
    /// Deployment environment
    RepositoryEnvironment,
    /// Environment deployment branch policy
    EnvironmentDeploymentPolicy,
    /// Team access to a repository
    TeamRepository,

    // Sentry
    /// Monitored project
    SentryProject,
    /// Client key (DSN)
    SentryKey,
    /// Issue alert rule
    SentryIssueAlert,

    // Cloudflare
    /// Pages project
    PagesProject,
}

impl ResourceType {
    /// All node types, in declaration order
    pub const ALL: [ResourceType; 19] = [
        Self::Vpc,
        Self::Subnet,
        Self::RouteTable,
        Self::RouteTableAssociation,
        Self::InternetGateway,
        Self::Route,
        Self::SecurityGroup,
        Self::VpcConnector,
        Self::AppRunnerService,
        Self::Repository,
        Self::Branch,
        Self::BranchDefault,
        Self::RepositoryEnvironment,
        Self::EnvironmentDeploymentPolicy,
        Self::TeamRepository,
        Self::SentryProject,
        Self::SentryKey,
        Self::SentryIssueAlert,
        Self::PagesProject,
    ];

    /// Get the provider type token
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vpc => "aws:ec2/vpc:Vpc",
            Self::Subnet => "aws:ec2/subnet:Subnet",
            Self::RouteTable => "aws:ec2/routeTable:RouteTable",
            Self::RouteTableAssociation => "aws:ec2/routeTableAssociation:RouteTableAssociation",
            Self::InternetGateway => "aws:ec2/internetGateway:InternetGateway",
            Self::Route => "aws:ec2/route:Route",
            Self::SecurityGroup => "aws:ec2/securityGroup:SecurityGroup",
            Self::VpcConnector => "aws:apprunner/vpcConnector:VpcConnector",
            Self::AppRunnerService => "aws:apprunner/service:Service",
            Self::Repository => "github:index/repository:Repository",
            Self::Branch => "github:index/branch:Branch",
            Self::BranchDefault => "github:index/branchDefault:BranchDefault",
            Self::RepositoryEnvironment => "github:index/repositoryEnvironment:RepositoryEnvironment",
            Self::EnvironmentDeploymentPolicy => {
                "github:index/repositoryEnvironmentDeploymentPolicy:RepositoryEnvironmentDeploymentPolicy"
            }
            Self::TeamRepository => "github:index/teamRepository:TeamRepository",
            Self::SentryProject => "sentry:index/sentryProject:SentryProject",
            Self::SentryKey => "sentry:index/sentryKey:SentryKey",
            Self::SentryIssueAlert => "sentry:index/sentryIssueAlert:SentryIssueAlert",
            Self::PagesProject => "cloudflare:index/pagesProject:PagesProject",
        }
    }

    /// Parse a provider type token
    pub fn from_token(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == token)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ResourceType> for String {
    fn from(kind: ResourceType) -> Self {
        kind.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        for kind in ResourceType::ALL {
            assert_eq!(ResourceType::from_token(kind.as_str()), Some(kind));
        }
        assert_eq!(ResourceType::from_token("aws:ec2/unknown:Unknown"), None);
    }
}
