// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Network Fan-Out
//!
//! Every admissible subnet count yields exactly that many subnets and
//! associations, each in its own availability zone, and a plan whose order
//! puts every subnet before its association.

use cim_compose::components::AwsNetwork;
use cim_compose::{ComponentArgs, DefaultSource, GraphBuilder, ResourceType};
use proptest::prelude::*;
use serde_json::json;
use std::collections::BTreeSet;

proptest! {
    #[test]
    fn prop_subnet_fan_out_matches_count(count in 0u32..=26) {
        let mut graph = GraphBuilder::new(DefaultSource::default());
        graph
            .declare(
                AwsNetwork,
                ComponentArgs::new("core").with_overrides(json!({
                    "region": "eu-central-1",
                    "numberOfSubnets": count
                })),
            )
            .unwrap();

        let subnets: Vec<_> = graph.nodes_of_type(ResourceType::Subnet.as_str()).collect();
        let associations = graph
            .nodes_of_type(ResourceType::RouteTableAssociation.as_str())
            .count();

        prop_assert_eq!(subnets.len(), count as usize);
        prop_assert_eq!(associations, count as usize);
        prop_assert_eq!(graph.node_count(), 4 + 2 * count as usize);

        let zones: BTreeSet<String> = subnets
            .iter()
            .filter_map(|subnet| subnet.property("availabilityZone"))
            .filter_map(|zone| zone.as_literal())
            .filter_map(|zone| zone.as_str().map(str::to_string))
            .collect();
        prop_assert_eq!(zones.len(), count as usize);
    }

    #[test]
    fn prop_subnets_precede_their_associations(count in 1u32..=8) {
        let mut graph = GraphBuilder::new(DefaultSource::default());
        graph
            .declare(
                AwsNetwork,
                ComponentArgs::new("core").with_overrides(json!({ "numberOfSubnets": count })),
            )
            .unwrap();
        let plan = graph.build().unwrap();

        for index in 0..count {
            let subnet = plan.node_named(&format!("core-subnet-{index}")).unwrap();
            let association = plan.node_named(&format!("core-rta-{index}")).unwrap();
            prop_assert!(plan.position(subnet.id) < plan.position(association.id));
        }
    }

    #[test]
    fn prop_subnet_count_above_zone_letters_rejected(count in 27u32..200) {
        let mut graph = GraphBuilder::new(DefaultSource::default());
        let err = graph
            .declare(
                AwsNetwork,
                ComponentArgs::new("core").with_overrides(json!({ "numberOfSubnets": count })),
            )
            .unwrap_err();

        prop_assert_eq!(err.field(), Some("numberOfSubnets"));
        prop_assert_eq!(graph.node_count(), 0);
    }
}
