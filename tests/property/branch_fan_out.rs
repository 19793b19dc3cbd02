// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Branch Fan-Out
//!
//! A repository with N distinct branches gets N branches, N environments and
//! N deployment policies, and every environment carries its branch's slug.

use cim_compose::components::GithubRepository;
use cim_compose::domain::environment_slug;
use cim_compose::{ComponentArgs, DefaultSource, GraphBuilder, PropertyValue, ResourceType};
use proptest::prelude::*;
use serde_json::json;

// Aliased branches first, then feature branches whose slug is their name
fn branch_list() -> impl Strategy<Value = Vec<String>> {
    (
        any::<bool>(),
        prop::option::of(prop::sample::select(vec!["main", "master"])),
        prop::collection::btree_set("feat-[a-z]{1,6}", 1..6),
    )
        .prop_map(|(develop, production, features)| {
            let mut branches = Vec::new();
            if develop {
                branches.push("develop".to_string());
            }
            if let Some(production) = production {
                branches.push(production.to_string());
            }
            branches.extend(features);
            branches
        })
}

proptest! {
    #[test]
    fn prop_branch_fan_out_matches_count(branches in branch_list()) {
        let count = branches.len();
        let mut graph = GraphBuilder::new(DefaultSource::default());
        let repository = graph
            .declare(
                GithubRepository,
                ComponentArgs::new("site").with_overrides(json!({
                    "git": { "branches": branches, "defaultBranch": branches[0] }
                })),
            )
            .unwrap();

        prop_assert_eq!(graph.nodes_of_type(ResourceType::Branch.as_str()).count(), count);
        prop_assert_eq!(
            graph.nodes_of_type(ResourceType::RepositoryEnvironment.as_str()).count(),
            count
        );
        prop_assert_eq!(
            graph.nodes_of_type(ResourceType::EnvironmentDeploymentPolicy.as_str()).count(),
            count
        );

        let expected: Vec<String> = branches
            .iter()
            .map(|branch| environment_slug(branch).to_string())
            .collect();
        prop_assert_eq!(&repository.outputs().environments, &expected);

        for (branch, slug) in branches.iter().zip(&expected) {
            let environment = graph
                .find_node(
                    ResourceType::RepositoryEnvironment.as_str(),
                    &format!("site-{branch}-environment"),
                )
                .unwrap();
            prop_assert_eq!(
                environment.property("environment"),
                Some(&PropertyValue::from(slug.as_str()))
            );
        }
    }
}
