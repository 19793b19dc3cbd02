// Copyright (c) 2025 - Cowboy AI, Inc.
//! Environment-derived default values
//!
//! Some component defaults (region, organization owners, account ids) come
//! from process environment. They are read once into a [`DefaultSource`] and
//! passed to every component's default computation as ordinary input.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Region used when `AWS_REGION` is not set
pub const FALLBACK_AWS_REGION: &str = "eu-central-1";

/// Process-wide inputs to default configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultSource {
    /// Default AWS region (`AWS_REGION`)
    pub aws_region: String,
    /// Default GitHub organization owner (`GITHUB_OWNER`)
    pub github_owner: Option<String>,
    /// Default Sentry organization slug (`SENTRY_ORGANIZATION`)
    pub sentry_organization: Option<String>,
    /// Default Cloudflare account id (`CLOUDFLARE_ACCOUNT_ID`)
    pub cloudflare_account_id: Option<String>,
}

impl DefaultSource {
    /// Load defaults from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load defaults through an arbitrary key lookup
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let source = Self {
            aws_region: read("AWS_REGION").unwrap_or_else(|| FALLBACK_AWS_REGION.to_string()),
            github_owner: read("GITHUB_OWNER"),
            sentry_organization: read("SENTRY_ORGANIZATION"),
            cloudflare_account_id: read("CLOUDFLARE_ACCOUNT_ID"),
        };

        debug!(region = %source.aws_region, "Resolved default source");
        source
    }

    /// Override the default region
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.aws_region = region.into();
        self
    }

    /// Override the default GitHub owner
    pub fn with_github_owner(mut self, owner: impl Into<String>) -> Self {
        self.github_owner = Some(owner.into());
        self
    }

    /// Override the default Sentry organization
    pub fn with_sentry_organization(mut self, organization: impl Into<String>) -> Self {
        self.sentry_organization = Some(organization.into());
        self
    }

    /// Override the default Cloudflare account
    pub fn with_cloudflare_account(mut self, account_id: impl Into<String>) -> Self {
        self.cloudflare_account_id = Some(account_id.into());
        self
    }
}

impl Default for DefaultSource {
    fn default() -> Self {
        Self {
            aws_region: FALLBACK_AWS_REGION.to_string(),
            github_owner: None,
            sentry_organization: None,
            cloudflare_account_id: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_lookup_populates_fields() {
        let env: HashMap<&str, &str> = [
            ("AWS_REGION", "us-east-1"),
            ("GITHUB_OWNER", "cowboyai"),
            ("SENTRY_ORGANIZATION", ""),
        ]
        .into_iter()
        .collect();

        let source = DefaultSource::from_lookup(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(source.aws_region, "us-east-1");
        assert_eq!(source.github_owner.as_deref(), Some("cowboyai"));
        assert_eq!(source.sentry_organization, None);
        assert_eq!(source.cloudflare_account_id, None);
    }

    #[test]
    fn test_missing_region_falls_back() {
        let source = DefaultSource::from_lookup(|_| None);
        assert_eq!(source.aws_region, FALLBACK_AWS_REGION);
        assert_eq!(source, DefaultSource::default());
    }
}
