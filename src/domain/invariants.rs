// Copyright (c) 2025 - Cowboy AI, Inc.
//! Pure Validation Functions - Configuration Invariants
//!
//! Building blocks for component validators. Every function is pure and
//! returns the first violation it finds, naming the offending field by its
//! dotted configuration path (e.g. `git.defaultBranch`).
//!
//! # Invariant Categories
//!
//! 1. **Required values**: identifiers that must be non-empty
//! 2. **Membership**: a chosen value must belong to a declared set
//! 3. **Uniqueness**: fan-out sequences must not derive duplicate names
//! 4. **Consistency**: related fields are all set or all absent
//! 5. **Ranges**: numeric options stay within their bounds

use std::collections::BTreeSet;
use std::fmt::Debug;

/// Validation result with detailed error information
pub type ValidationResult = Result<(), ValidationError>;

/// Violated configuration invariant
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Required value is empty
    #[error("{field}: must not be empty")]
    Empty { field: String },

    /// Value is not a member of its declared set
    #[error("{field}: {value:?} is not in {set_field} {allowed:?}")]
    NotAMember {
        field: String,
        value: String,
        set_field: String,
        allowed: Vec<String>,
    },

    /// Sequence derives the same value twice
    #[error("{field}: {value:?} appears more than once")]
    Duplicate { field: String, value: String },

    /// Field is set without its companion fields
    #[error("{field}: must be set together with {missing}")]
    Incomplete { field: String, missing: String },

    /// Numeric value outside its bounds
    #[error("{field}: {value} is outside {min}..={max}")]
    OutOfRange {
        field: String,
        value: i64,
        min: i64,
        max: i64,
    },

    /// Value is malformed or violates a component-specific rule
    #[error("{field}: {condition}")]
    Invalid { field: String, condition: String },
}

impl ValidationError {
    /// Dotted path of the offending field
    pub fn field(&self) -> &str {
        match self {
            Self::Empty { field }
            | Self::NotAMember { field, .. }
            | Self::Duplicate { field, .. }
            | Self::Incomplete { field, .. }
            | Self::OutOfRange { field, .. }
            | Self::Invalid { field, .. } => field,
        }
    }

    /// Build an [`ValidationError::Invalid`] error
    pub fn invalid(field: impl Into<String>, condition: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            condition: condition.into(),
        }
    }

    /// Translate a failure to deserialize merged configuration
    ///
    /// The field is the dotted path at which deserialization stopped. serde
    /// reports a missing key on its enclosing group, so the key named in
    /// ``missing field `region` `` is appended to that path.
    pub fn from_deserialize(error: &serde_path_to_error::Error<serde_json::Error>) -> Self {
        let message = error.inner().to_string();
        let mut segments: Vec<String> = error
            .path()
            .iter()
            .map(|segment| segment.to_string())
            .collect();

        if message.starts_with("missing field") {
            if let Some(key) = message.split('`').nth(1).filter(|key| !key.is_empty()) {
                segments.push(key.to_string());
            }
        }

        let field = if segments.is_empty() {
            "<config>".to_string()
        } else {
            segments.join(".")
        };
        Self::Invalid {
            field,
            condition: message,
        }
    }
}

/// Require a non-empty (after trimming) string
pub fn require_non_empty(field: &str, value: &str) -> ValidationResult {
    if value.trim().is_empty() {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Require a non-empty sequence
pub fn require_non_empty_list<T>(field: &str, values: &[T]) -> ValidationResult {
    if values.is_empty() {
        return Err(ValidationError::Empty {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Require `value` to be one of `allowed`
///
/// # Rules
/// - `field` names the chosen value, `set_field` names the declared set
pub fn require_member(
    field: &str,
    value: &str,
    set_field: &str,
    allowed: &[String],
) -> ValidationResult {
    if !allowed.iter().any(|candidate| candidate == value) {
        return Err(ValidationError::NotAMember {
            field: field.to_string(),
            value: value.to_string(),
            set_field: set_field.to_string(),
            allowed: allowed.to_vec(),
        });
    }
    Ok(())
}

/// Require every derived value to be distinct
pub fn require_unique<I, T>(field: &str, values: I) -> ValidationResult
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    let mut seen = BTreeSet::new();
    for value in values {
        let value = value.into();
        if !seen.insert(value.clone()) {
            return Err(ValidationError::Duplicate {
                field: field.to_string(),
                value,
            });
        }
    }
    Ok(())
}

/// Require a group of related fields to be all present or all absent
///
/// Each entry is `(field, is_present)`. The first absent field of a
/// partially specified group is reported.
pub fn require_all_or_none(fields: &[(&str, bool)]) -> ValidationResult {
    let present: Vec<&str> = fields
        .iter()
        .filter(|(_, set)| *set)
        .map(|(name, _)| *name)
        .collect();

    if present.is_empty() || present.len() == fields.len() {
        return Ok(());
    }

    match fields.iter().find(|(_, set)| !*set) {
        Some((missing, _)) => Err(ValidationError::Incomplete {
            field: present.join(", "),
            missing: (*missing).to_string(),
        }),
        None => Ok(()),
    }
}

/// Require `min <= value <= max`
pub fn require_range<T>(field: &str, value: T, min: i64, max: i64) -> ValidationResult
where
    T: TryInto<i64> + Copy + Debug,
{
    let value = value
        .try_into()
        .map_err(|_| ValidationError::invalid(field, format!("{value:?} does not fit in i64")))?;

    if value < min || value > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            value,
            min,
            max,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_non_empty() {
        assert!(require_non_empty("name", "web").is_ok());

        let err = require_non_empty("name", "  ").unwrap_err();
        assert_eq!(err.field(), "name");
        assert_eq!(err.to_string(), "name: must not be empty");
    }

    #[test]
    fn test_require_member() {
        let branches = vec!["a".to_string(), "b".to_string()];
        assert!(require_member("git.defaultBranch", "a", "git.branches", &branches).is_ok());

        let err = require_member("git.defaultBranch", "x", "git.branches", &branches).unwrap_err();
        assert_eq!(err.field(), "git.defaultBranch");
        assert!(matches!(err, ValidationError::NotAMember { .. }));
    }

    #[test]
    fn test_require_unique() {
        assert!(require_unique("git.branches", ["a", "b"]).is_ok());

        let err = require_unique("git.branches", ["a", "b", "a"]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Duplicate {
                field: "git.branches".to_string(),
                value: "a".to_string()
            }
        );
    }

    #[test]
    fn test_require_all_or_none() {
        assert!(require_all_or_none(&[("t.owner", false), ("t.repository", false)]).is_ok());
        assert!(require_all_or_none(&[("t.owner", true), ("t.repository", true)]).is_ok());

        let err = require_all_or_none(&[("t.owner", true), ("t.repository", false)]).unwrap_err();
        assert_eq!(
            err,
            ValidationError::Incomplete {
                field: "t.owner".to_string(),
                missing: "t.repository".to_string()
            }
        );
    }

    #[test]
    fn test_require_range() {
        assert!(require_range("numberOfSubnets", 3u32, 0, 26).is_ok());
        assert!(require_range("numberOfSubnets", 27u32, 0, 26).is_err());
        assert!(require_range("port", 0u32, 1, 65535).is_err());
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    #[allow(dead_code)]
    struct Network {
        region: String,
        vpc: Vpc,
    }

    #[derive(Debug, serde::Deserialize)]
    #[serde(rename_all = "camelCase", deny_unknown_fields)]
    #[allow(dead_code)]
    struct Vpc {
        cidr_block: String,
        number_of_subnets: u32,
    }

    fn deserialize_error(value: serde_json::Value) -> ValidationError {
        let error = serde_path_to_error::deserialize::<_, Network>(value).unwrap_err();
        ValidationError::from_deserialize(&error)
    }

    #[test]
    fn test_from_deserialize_unknown_nested_key() {
        let err = deserialize_error(serde_json::json!({
            "region": "eu-central-1",
            "vpc": { "cidrBlok": "x", "numberOfSubnets": 1 }
        }));
        assert_eq!(err.field(), "vpc.cidrBlok");
    }

    #[test]
    fn test_from_deserialize_wrong_type() {
        let err = deserialize_error(serde_json::json!({
            "region": "eu-central-1",
            "vpc": { "cidrBlock": "10.0.0.0/16", "numberOfSubnets": "three" }
        }));
        assert_eq!(err.field(), "vpc.numberOfSubnets");
        assert!(err.to_string().contains("expected u32"));
    }

    #[test]
    fn test_from_deserialize_missing_key() {
        let err = deserialize_error(serde_json::json!({
            "vpc": { "cidrBlock": "10.0.0.0/16", "numberOfSubnets": 1 }
        }));
        assert_eq!(err.field(), "region");

        let err = deserialize_error(serde_json::json!({
            "region": "eu-central-1",
            "vpc": { "numberOfSubnets": 1 }
        }));
        assert_eq!(err.field(), "vpc.cidrBlock");
    }
}
