// Copyright (c) 2025 - Cowboy AI, Inc.
//! Logical Name Value Objects
//!
//! Component names seed the logical names of everything they create
//! (`${name}-subnet-${i}`, `${name}-net`), so they are validated once when a
//! component is declared.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Name validation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("Name is empty")]
    Empty,

    #[error("Name exceeds maximum length of 100 characters: {0}")]
    TooLong(usize),

    #[error("Invalid character in name: {0:?}")]
    InvalidCharacter(char),

    #[error("Name cannot start or end with a separator: {0}")]
    InvalidBoundary(String),
}

/// Validated component name
///
/// Invariants:
/// - Non-empty, at most 100 characters
/// - ASCII alphanumerics, `-`, `_` and `.` only
/// - Does not start or end with a separator
///
/// # Examples
///
/// ```rust
/// use cim_compose::domain::ComponentName;
///
/// assert!(ComponentName::new("billing-api").is_ok());
/// assert!(ComponentName::new("").is_err());
/// assert!(ComponentName::new("-edge").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentName(String);

impl ComponentName {
    /// Maximum name length
    pub const MAX_LENGTH: usize = 100;

    /// Create a validated name
    pub fn new(name: impl Into<String>) -> Result<Self, NameError> {
        let name = name.into();

        if name.is_empty() {
            return Err(NameError::Empty);
        }

        if name.len() > Self::MAX_LENGTH {
            return Err(NameError::TooLong(name.len()));
        }

        if let Some(ch) = name
            .chars()
            .find(|ch| !ch.is_ascii_alphanumeric() && !matches!(ch, '-' | '_' | '.'))
        {
            return Err(NameError::InvalidCharacter(ch));
        }

        let is_separator = |ch: char| matches!(ch, '-' | '_' | '.');
        if name.starts_with(is_separator) || name.ends_with(is_separator) {
            return Err(NameError::InvalidBoundary(name));
        }

        Ok(Self(name))
    }

    /// Get the name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Derive a child name by suffixing a role (`web` + `net` → `web-net`)
    pub fn child(&self, role: &str) -> String {
        format!("{}-{}", self.0, role)
    }
}

impl fmt::Display for ComponentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ComponentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Deployment environment slug for a git branch
///
/// `develop` → `development`, `main`/`master` → `production`, any other
/// branch keeps its own name.
pub fn environment_slug(branch: &str) -> &str {
    match branch {
        "develop" => "development",
        "main" | "master" => "production",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("develop" => "development")]
    #[test_case("main" => "production")]
    #[test_case("master" => "production")]
    #[test_case("staging" => "staging")]
    #[test_case("feature-x" => "feature-x")]
    fn test_environment_slug(branch: &str) -> String {
        environment_slug(branch).to_string()
    }

    #[test]
    fn test_valid_names() {
        assert!(ComponentName::new("web").is_ok());
        assert!(ComponentName::new("web.api_v2-eu").is_ok());
    }

    #[test]
    fn test_invalid_names() {
        assert_eq!(ComponentName::new(""), Err(NameError::Empty));
        assert_eq!(
            ComponentName::new("web api"),
            Err(NameError::InvalidCharacter(' '))
        );
        assert!(matches!(
            ComponentName::new("web-"),
            Err(NameError::InvalidBoundary(_))
        ));
        assert!(matches!(
            ComponentName::new("a".repeat(101)),
            Err(NameError::TooLong(101))
        ));
    }

    #[test]
    fn test_child_name() {
        let name = ComponentName::new("web").unwrap();
        assert_eq!(name.child("net"), "web-net");
    }
}
