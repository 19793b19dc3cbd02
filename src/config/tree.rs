// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tagged Configuration Tree
//!
//! Configuration is carried as an explicit tree of value leaves and nested
//! groups. JSON objects always become groups; every other JSON value
//! (including arrays and `null`) is a leaf. Whether a key is merged
//! recursively or replaced is therefore decided by the tree shape alone.

use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Configuration tree: a value leaf or a nested group of named options
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigTree {
    /// Concrete option value (scalar, sequence or null)
    Leaf(Value),

    /// Nested configuration group
    Group(BTreeMap<String, ConfigTree>),
}

impl ConfigTree {
    /// An empty group, the "no overrides" partial configuration
    pub fn empty() -> Self {
        ConfigTree::Group(BTreeMap::new())
    }

    /// Build a tree from any serializable value
    pub fn from_serialize<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(Self::from(serde_json::to_value(value)?))
    }

    /// Whether this tree is a nested group
    pub fn is_group(&self) -> bool {
        matches!(self, ConfigTree::Group(_))
    }

    /// Whether this tree is an empty group
    pub fn is_empty(&self) -> bool {
        matches!(self, ConfigTree::Group(children) if children.is_empty())
    }

    /// Look up an option by dotted path (e.g. `git.defaultBranch`)
    pub fn get(&self, path: &str) -> Option<&ConfigTree> {
        path.split('.').try_fold(self, |tree, key| match tree {
            ConfigTree::Group(children) => children.get(key),
            ConfigTree::Leaf(_) => None,
        })
    }

    /// Look up a leaf value by dotted path
    pub fn value(&self, path: &str) -> Option<&Value> {
        match self.get(path)? {
            ConfigTree::Leaf(value) => Some(value),
            ConfigTree::Group(_) => None,
        }
    }

    /// Convert back into a plain JSON value
    pub fn into_value(self) -> Value {
        match self {
            ConfigTree::Leaf(value) => value,
            ConfigTree::Group(children) => Value::Object(
                children
                    .into_iter()
                    .map(|(key, child)| (key, child.into_value()))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }
}

impl Default for ConfigTree {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Value> for ConfigTree {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => ConfigTree::Group(
                map.into_iter()
                    .map(|(key, child)| (key, ConfigTree::from(child)))
                    .collect(),
            ),
            other => ConfigTree::Leaf(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_objects_become_groups_and_arrays_stay_leaves() {
        let tree = ConfigTree::from(json!({
            "git": { "branches": ["main"], "defaultBranch": "main" },
            "organization": null,
        }));

        assert!(tree.is_group());
        assert!(tree.get("git").unwrap().is_group());
        assert_eq!(tree.value("git.branches"), Some(&json!(["main"])));
        assert_eq!(tree.value("organization"), Some(&Value::Null));
    }

    #[test]
    fn test_missing_path_is_none() {
        let tree = ConfigTree::from(json!({ "region": "eu-central-1" }));
        assert!(tree.get("vpc.cidrBlock").is_none());
        assert!(tree.get("region.inner").is_none());
    }

    #[test]
    fn test_into_value_round_trips_structure() {
        let value = json!({ "vpc": { "cidrBlock": "10.0.0.0/16" }, "tags": {} });
        assert_eq!(ConfigTree::from(value.clone()).into_value(), value);
    }

    #[test]
    fn test_empty_group() {
        assert!(ConfigTree::empty().is_empty());
        assert!(!ConfigTree::Leaf(json!(1)).is_empty());
    }
}
