// Copyright (c) 2025 - Cowboy AI, Inc.
//! AWS network: VPC, shared route table, N subnets, internet gateway
//!
//! ```text
//! <name>-vpc ──owns──► <name>-subnet-i
//! <name>-rt  ──owns──► <name>-rta-i          (after subnet-i and rt)
//! <name>-igw ──owns──► <name>-igw-route      (after rt and igw)
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{name_tags, populate_error};
use crate::component::{Component, ComponentHandle, ComponentOutputs, NetworkCapability};
use crate::config::DefaultSource;
use crate::domain::invariants::{require_non_empty, require_range};
use crate::domain::{
    availability_zone, Ipv4Cidr, ResourceType, ValidationError, ValidationResult, ZONE_LETTERS,
};
use crate::errors::CompositionResult;
use crate::graph::{ComponentRef, NodeSpec, OutputMap, PropertyValue, Scope};

/// Network component
#[derive(Debug, Clone, Copy, Default)]
pub struct AwsNetwork;

/// VPC settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct VpcConfig {
    pub cidr_block: String,
    pub enable_dns_hostnames: bool,
    pub enable_dns_support: bool,
}

/// Network configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AwsNetworkConfig {
    pub region: String,
    pub vpc: VpcConfig,
    pub number_of_subnets: u32,
    pub tags: BTreeMap<String, String>,
}

/// Network outputs
#[derive(Debug, Clone, PartialEq)]
pub struct NetworkOutputs {
    pub region: String,
    pub vpc_id: PropertyValue,
    pub route_table_id: PropertyValue,
    pub subnet_ids: Vec<PropertyValue>,
    pub route_table_association_ids: Vec<PropertyValue>,
    pub internet_gateway_id: PropertyValue,
    pub internet_gateway_route_id: PropertyValue,
}

impl ComponentOutputs for NetworkOutputs {
    fn entries(&self) -> OutputMap {
        OutputMap::from([
            ("region".to_string(), PropertyValue::from(self.region.as_str())),
            ("vpcId".to_string(), self.vpc_id.clone()),
            ("routeTableId".to_string(), self.route_table_id.clone()),
            ("subnetIds".to_string(), PropertyValue::List(self.subnet_ids.clone())),
            (
                "routeTableAssociationIds".to_string(),
                PropertyValue::List(self.route_table_association_ids.clone()),
            ),
            ("internetGatewayId".to_string(), self.internet_gateway_id.clone()),
            ("internetGatewayRouteId".to_string(), self.internet_gateway_route_id.clone()),
        ])
    }
}

impl NetworkCapability for ComponentHandle<NetworkOutputs> {
    fn component(&self) -> ComponentRef {
        ComponentHandle::component(self)
    }

    fn region(&self) -> &str {
        &self.outputs().region
    }

    fn network_id(&self) -> PropertyValue {
        self.outputs().vpc_id.clone()
    }

    fn subnet_ids(&self) -> Vec<PropertyValue> {
        self.outputs().subnet_ids.clone()
    }
}

fn parse_block(cidr: &str) -> Result<Ipv4Cidr, ValidationError> {
    let block = Ipv4Cidr::new(cidr).map_err(|e| ValidationError::invalid("vpc.cidrBlock", e.to_string()))?;
    block
        .ensure_carvable()
        .map_err(|e| ValidationError::invalid("vpc.cidrBlock", e.to_string()))?;
    Ok(block)
}

impl Component for AwsNetwork {
    const TYPE_TAG: &'static str = "infra:networking:aws-network";
    type Config = AwsNetworkConfig;
    type Outputs = NetworkOutputs;

    fn defaults(source: &DefaultSource) -> AwsNetworkConfig {
        AwsNetworkConfig {
            region: source.aws_region.clone(),
            vpc: VpcConfig {
                cidr_block: "10.0.0.0/16".to_string(),
                enable_dns_hostnames: true,
                enable_dns_support: true,
            },
            number_of_subnets: 3,
            tags: BTreeMap::new(),
        }
    }

    fn validate(config: &AwsNetworkConfig) -> ValidationResult {
        require_non_empty("region", &config.region)?;
        parse_block(&config.vpc.cidr_block)?;
        require_range("numberOfSubnets", config.number_of_subnets, 0, ZONE_LETTERS.len() as i64)
    }

    fn populate(self, scope: &mut Scope<'_>, config: &AwsNetworkConfig) -> CompositionResult<NetworkOutputs> {
        let name = scope.name().clone();
        let block = parse_block(&config.vpc.cidr_block)
            .map_err(|e| populate_error::<Self>(scope, e.field(), &e))?;

        let vpc_name = name.child("vpc");
        let vpc = scope.node(
            NodeSpec::new(ResourceType::Vpc, vpc_name.as_str())
                .property("cidrBlock", config.vpc.cidr_block.as_str())
                .property("enableDnsHostnames", config.vpc.enable_dns_hostnames)
                .property("enableDnsSupport", config.vpc.enable_dns_support)
                .property("tags", name_tags(&config.tags, &vpc_name)),
        )?;

        let route_table_name = name.child("rt");
        let route_table = scope.node(
            NodeSpec::new(ResourceType::RouteTable, route_table_name.as_str())
                .property("vpcId", vpc.attr("id"))
                .property("tags", name_tags(&config.tags, &route_table_name))
                .depends_on(vpc),
        )?;

        let mut subnet_ids = Vec::new();
        let mut route_table_association_ids = Vec::new();
        for index in 0..config.number_of_subnets as usize {
            let subnet_block = block
                .subnet_24(index)
                .map_err(|e| populate_error::<Self>(scope, "vpc.cidrBlock", e))?;
            let zone = availability_zone(&config.region, index)
                .map_err(|e| populate_error::<Self>(scope, "numberOfSubnets", e))?;

            let subnet_name = name.child(&format!("subnet-{index}"));
            let subnet = scope.node(
                NodeSpec::new(ResourceType::Subnet, subnet_name.as_str())
                    .property("vpcId", vpc.attr("id"))
                    .property("cidrBlock", subnet_block.to_string())
                    .property("availabilityZone", zone)
                    .property("tags", name_tags(&config.tags, &subnet_name))
                    .owned_by(vpc)
                    .depends_on(vpc),
            )?;

            let association = scope.node(
                NodeSpec::new(ResourceType::RouteTableAssociation, name.child(&format!("rta-{index}")))
                    .property("routeTableId", route_table.attr("id"))
                    .property("subnetId", subnet.attr("id"))
                    .owned_by(route_table)
                    .depends_on(subnet)
                    .depends_on(route_table),
            )?;

            subnet_ids.push(subnet.attr("id"));
            route_table_association_ids.push(association.attr("id"));
        }

        let gateway_name = name.child("igw");
        let gateway = scope.node(
            NodeSpec::new(ResourceType::InternetGateway, gateway_name.as_str())
                .property("vpcId", vpc.attr("id"))
                .property("tags", name_tags(&config.tags, &gateway_name))
                .depends_on(vpc),
        )?;

        let gateway_route = scope.node(
            NodeSpec::new(ResourceType::Route, name.child("igw-route"))
                .property("routeTableId", route_table.attr("id"))
                .property("destinationCidrBlock", "0.0.0.0/0")
                .property("gatewayId", gateway.attr("id"))
                .owned_by(gateway)
                .depends_on(route_table)
                .depends_on(gateway),
        )?;

        Ok(NetworkOutputs {
            region: config.region.clone(),
            vpc_id: vpc.attr("id"),
            route_table_id: route_table.attr("id"),
            subnet_ids,
            route_table_association_ids,
            internet_gateway_id: gateway.attr("id"),
            internet_gateway_route_id: gateway_route.attr("id"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentArgs;
    use crate::graph::GraphBuilder;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tag(name: &str) -> String {
        name.to_string()
    }

    #[test]
    fn test_default_network_has_three_subnets() {
        let mut graph = GraphBuilder::new(DefaultSource::default());
        let network = graph.declare(AwsNetwork, ComponentArgs::new("core")).unwrap();

        assert_eq!(network.outputs().subnet_ids.len(), 3);
        assert_eq!(network.outputs().region, "eu-central-1");
        // vpc, rt, igw, igw-route + 3 × (subnet, rta)
        assert_eq!(graph.node_count(), 10);
    }

    #[test]
    fn test_subnets_are_carved_from_the_vpc_block() {
        let mut graph = GraphBuilder::new(DefaultSource::default());
        graph
            .declare(
                AwsNetwork,
                ComponentArgs::new("core").with_overrides(json!({
                    "vpc": { "cidrBlock": "172.16.0.0/12" },
                    "numberOfSubnets": 2
                })),
            )
            .unwrap();

        let subnet = graph
            .find_node(ResourceType::Subnet.as_str(), "core-subnet-1")
            .unwrap();
        assert_eq!(
            subnet.property("cidrBlock"),
            Some(&PropertyValue::from("172.16.1.0/24"))
        );

        // Sibling VPC options keep their defaults
        let vpc = graph.find_node(ResourceType::Vpc.as_str(), "core-vpc").unwrap();
        assert_eq!(vpc.property("enableDnsSupport"), Some(&PropertyValue::from(true)));
    }

    #[test]
    fn test_tags_merge_with_name_tag() {
        let mut graph = GraphBuilder::new(DefaultSource::default());
        graph
            .declare(
                AwsNetwork,
                ComponentArgs::new("core").with_overrides(json!({
                    "numberOfSubnets": 0,
                    "tags": { "team": "platform" }
                })),
            )
            .unwrap();

        let gateway = graph
            .find_node(ResourceType::InternetGateway.as_str(), "core-igw")
            .unwrap();
        assert_eq!(
            gateway.property("tags"),
            Some(&PropertyValue::map([
                (tag("Name"), PropertyValue::from("core-igw")),
                (tag("team"), PropertyValue::from("platform")),
            ]))
        );
    }

    #[test]
    fn test_zero_subnets_is_allowed() {
        let mut graph = GraphBuilder::new(DefaultSource::default());
        let network = graph
            .declare(
                AwsNetwork,
                ComponentArgs::new("core").with_overrides(json!({ "numberOfSubnets": 0 })),
            )
            .unwrap();

        assert!(network.outputs().subnet_ids.is_empty());
        assert_eq!(graph.node_count(), 4);
    }

    #[test]
    fn test_region_defaults_from_source() {
        let source = DefaultSource::default().with_region("us-west-2");
        let mut graph = GraphBuilder::new(source);
        let network = graph
            .declare(
                AwsNetwork,
                ComponentArgs::new("core").with_overrides(json!({ "numberOfSubnets": 1 })),
            )
            .unwrap();

        assert_eq!(network.region(), "us-west-2");
        let subnet = graph
            .find_node(ResourceType::Subnet.as_str(), "core-subnet-0")
            .unwrap();
        assert_eq!(
            subnet.property("availabilityZone"),
            Some(&PropertyValue::from("us-west-2a"))
        );
    }

    #[test]
    fn test_validation_rejects_small_block() {
        let config = AwsNetworkConfig {
            vpc: VpcConfig {
                cidr_block: "10.0.0.0/24".to_string(),
                enable_dns_hostnames: true,
                enable_dns_support: true,
            },
            ..AwsNetwork::defaults(&DefaultSource::default())
        };

        assert_eq!(AwsNetwork::validate(&config).unwrap_err().field(), "vpc.cidrBlock");
    }

    #[test]
    fn test_validation_rejects_too_many_subnets() {
        let config = AwsNetworkConfig {
            number_of_subnets: 27,
            ..AwsNetwork::defaults(&DefaultSource::default())
        };

        assert_eq!(
            AwsNetwork::validate(&config).unwrap_err(),
            ValidationError::OutOfRange {
                field: "numberOfSubnets".to_string(),
                value: 27,
                min: 0,
                max: 26,
            }
        );
    }

    #[test]
    fn test_validation_rejects_empty_region() {
        let config = AwsNetworkConfig {
            region: String::new(),
            ..AwsNetwork::defaults(&DefaultSource::default())
        };

        assert_eq!(AwsNetwork::validate(&config).unwrap_err().field(), "region");
    }
}
