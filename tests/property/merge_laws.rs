// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for the Configuration Merge
//!
//! The merge is pure and total, so its laws can be checked over arbitrary
//! trees: an empty override is the identity, override leaves always win,
//! untouched keys keep their defaults, and merging a result over the same
//! defaults (or applying the same override again) changes nothing.

use cim_compose::config::{merge, ConfigTree};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::BTreeMap;

// ============================================================================
// Strategies
// ============================================================================

fn leaf_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z]{0,8}".prop_map(Value::String),
        prop::collection::vec(any::<u8>(), 0..4).prop_map(|items| json!(items)),
        Just(Value::Null),
    ]
}

fn config_tree() -> impl Strategy<Value = ConfigTree> {
    leaf_value()
        .prop_map(ConfigTree::Leaf)
        .prop_recursive(4, 32, 4, |inner| {
            prop::collection::btree_map("[a-e]", inner, 0..4).prop_map(ConfigTree::Group)
        })
}

fn config_group() -> impl Strategy<Value = BTreeMap<String, ConfigTree>> {
    prop::collection::btree_map("[a-e]", config_tree(), 0..5)
}

// ============================================================================
// Laws
// ============================================================================

proptest! {
    #[test]
    fn prop_empty_override_is_identity(defaults in config_group()) {
        let defaults = ConfigTree::Group(defaults);
        prop_assert_eq!(merge(&defaults, &ConfigTree::empty()), defaults);
    }

    #[test]
    fn prop_override_of_empty_defaults_is_override(overrides in config_group()) {
        let overrides = ConfigTree::Group(overrides);
        prop_assert_eq!(merge(&ConfigTree::empty(), &overrides), overrides);
    }

    #[test]
    fn prop_override_leaf_wins(
        defaults in config_group(),
        key in "[a-e]",
        value in leaf_value(),
    ) {
        let overrides = ConfigTree::Group(BTreeMap::from([(key.clone(), ConfigTree::Leaf(value.clone()))]));
        let merged = merge(&ConfigTree::Group(defaults), &overrides);

        prop_assert_eq!(merged.get(&key), Some(&ConfigTree::Leaf(value)));
    }

    #[test]
    fn prop_absent_keys_keep_defaults(
        defaults in config_group(),
        overrides in config_group(),
    ) {
        let merged = merge(&ConfigTree::Group(defaults.clone()), &ConfigTree::Group(overrides.clone()));

        for (key, default) in defaults.iter().filter(|(key, _)| !overrides.contains_key(*key)) {
            prop_assert_eq!(merged.get(key), Some(default));
        }
    }

    #[test]
    fn prop_merged_keys_are_union(
        defaults in config_group(),
        overrides in config_group(),
    ) {
        let merged = merge(&ConfigTree::Group(defaults.clone()), &ConfigTree::Group(overrides.clone()));

        let ConfigTree::Group(children) = merged else {
            return Err(TestCaseError::fail("group merge produced a leaf"));
        };
        let expected: Vec<&String> = {
            let mut keys: Vec<&String> = defaults.keys().chain(overrides.keys()).collect();
            keys.sort();
            keys.dedup();
            keys
        };
        prop_assert_eq!(children.keys().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn prop_remerging_over_defaults_is_stable(
        defaults in config_tree(),
        overrides in config_tree(),
    ) {
        let merged = merge(&defaults, &overrides);
        prop_assert_eq!(merge(&defaults, &merged), merged);
    }

    #[test]
    fn prop_reapplying_override_is_stable(
        defaults in config_tree(),
        overrides in config_tree(),
    ) {
        let once = merge(&defaults, &overrides);
        let twice = merge(&once, &overrides);
        prop_assert_eq!(twice, once);
    }
}
