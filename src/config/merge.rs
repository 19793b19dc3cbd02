// Copyright (c) 2025 - Cowboy AI, Inc.
//! Configuration Merger
//!
//! Pure, total merge of a partial configuration over a component's defaults.
//!
//! # Rules
//!
//! - Both sides are groups: merge key by key, recursing into shared keys
//! - Otherwise the override replaces the default wholesale
//! - Sequences are leaves, so a supplied list replaces the default list;
//!   there is no index-wise partial override of a sequence
//! - A key absent from the override keeps its default
//!
//! Neither input is mutated; the result is a fresh tree.

use super::ConfigTree;
use std::collections::BTreeMap;

/// Merge `overrides` over `defaults`
///
/// # Examples
///
/// ```rust
/// use cim_compose::config::{merge, ConfigTree};
/// use serde_json::json;
///
/// let defaults = ConfigTree::from(json!({
///     "vpc": { "cidrBlock": "10.0.0.0/16", "enableDnsSupport": true },
///     "numberOfSubnets": 3,
/// }));
/// let overrides = ConfigTree::from(json!({ "vpc": { "enableDnsSupport": false } }));
///
/// let merged = merge(&defaults, &overrides);
/// assert_eq!(merged.value("vpc.cidrBlock"), Some(&json!("10.0.0.0/16")));
/// assert_eq!(merged.value("vpc.enableDnsSupport"), Some(&json!(false)));
/// assert_eq!(merged.value("numberOfSubnets"), Some(&json!(3)));
/// ```
pub fn merge(defaults: &ConfigTree, overrides: &ConfigTree) -> ConfigTree {
    match (defaults, overrides) {
        (ConfigTree::Group(base), ConfigTree::Group(layer)) => {
            ConfigTree::Group(merge_groups(base, layer))
        }
        (_, replacement) => replacement.clone(),
    }
}

fn merge_groups(
    base: &BTreeMap<String, ConfigTree>,
    layer: &BTreeMap<String, ConfigTree>,
) -> BTreeMap<String, ConfigTree> {
    let mut merged = base.clone();

    for (key, value) in layer {
        let entry = match base.get(key) {
            Some(default) => merge(default, value),
            None => value.clone(),
        };
        merged.insert(key.clone(), entry);
    }

    merged
}
