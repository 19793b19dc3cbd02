// Copyright (c) 2025 - Cowboy AI, Inc.
//! AWS App Runner service attached to a VPC
//!
//! The network is an optional collaborator. A supplied network is used as is
//! and stays owned by whoever built it; without one, an [`AwsNetwork`] named
//! `<name>-net` is built as an owned child. Only the region is forwarded to
//! that child, every other network option keeps its own default.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::{name_tags, AwsNetwork};
use crate::component::{Component, ComponentArgs, ComponentOutputs, NetworkCapability, Reference};
use crate::config::DefaultSource;
use crate::domain::invariants::{require_non_empty, require_range};
use crate::domain::{ResourceType, ValidationError, ValidationResult};
use crate::errors::CompositionResult;
use crate::graph::{NodeSpec, OutputMap, PropertyValue, Scope};

/// Largest App Runner instance count
pub const MAX_INSTANCES: i64 = 25;

/// Container service component
#[derive(Debug, Clone, Default)]
pub struct AwsAppRunner {
    network: Reference<Arc<dyn NetworkCapability>>,
}

impl AwsAppRunner {
    /// Service that builds its own network
    pub fn new() -> Self {
        Self::default()
    }

    /// Service attached to an existing network
    pub fn with_network(network: Arc<dyn NetworkCapability>) -> Self {
        Self {
            network: Reference::Supplied(network),
        }
    }

    /// The network slot
    pub fn network(&self) -> &Reference<Arc<dyn NetworkCapability>> {
        &self.network
    }
}

/// Container image
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImageConfig {
    pub repository_url: String,
    pub tag: String,
    pub port: u32,
}

/// Instance size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct InstanceConfig {
    pub cpu: String,
    pub memory: String,
}

/// Instance count bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AutoScalingConfig {
    pub min_size: u32,
    pub max_size: u32,
}

/// Service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AppRunnerConfig {
    pub region: String,
    pub image: ImageConfig,
    pub instance: InstanceConfig,
    pub auto_scaling: AutoScalingConfig,
    pub environment: BTreeMap<String, String>,
    pub tags: BTreeMap<String, String>,
}

/// Service outputs
#[derive(Debug, Clone, PartialEq)]
pub struct AppRunnerOutputs {
    pub service_id: PropertyValue,
    pub service_url: PropertyValue,
    pub network_id: PropertyValue,
}

impl ComponentOutputs for AppRunnerOutputs {
    fn entries(&self) -> OutputMap {
        OutputMap::from([
            ("serviceId".to_string(), self.service_id.clone()),
            ("serviceUrl".to_string(), self.service_url.clone()),
            ("networkId".to_string(), self.network_id.clone()),
        ])
    }
}

impl Component for AwsAppRunner {
    const TYPE_TAG: &'static str = "backend:docker-runner:aws-apprunner";
    type Config = AppRunnerConfig;
    type Outputs = AppRunnerOutputs;

    fn defaults(source: &DefaultSource) -> AppRunnerConfig {
        AppRunnerConfig {
            region: source.aws_region.clone(),
            image: ImageConfig {
                repository_url: String::new(),
                tag: "latest".to_string(),
                port: 8080,
            },
            instance: InstanceConfig {
                cpu: "1024".to_string(),
                memory: "2048".to_string(),
            },
            auto_scaling: AutoScalingConfig {
                min_size: 1,
                max_size: 3,
            },
            environment: BTreeMap::new(),
            tags: BTreeMap::new(),
        }
    }

    fn validate(config: &AppRunnerConfig) -> ValidationResult {
        require_non_empty("region", &config.region)?;
        require_non_empty("image.repositoryUrl", &config.image.repository_url)?;
        require_non_empty("image.tag", &config.image.tag)?;
        require_range("image.port", config.image.port, 1, 65535)?;
        require_range("autoScaling.minSize", config.auto_scaling.min_size, 1, MAX_INSTANCES)?;
        require_range(
            "autoScaling.maxSize",
            config.auto_scaling.max_size,
            i64::from(config.auto_scaling.min_size),
            MAX_INSTANCES,
        )
    }

    fn validate_inputs(&self, config: &AppRunnerConfig) -> ValidationResult {
        match &self.network {
            Reference::Supplied(network) if network.region() != config.region => Err(
                ValidationError::invalid("region", format!("supplied network is in {}", network.region())),
            ),
            _ => Ok(()),
        }
    }

    fn populate(self, scope: &mut Scope<'_>, config: &AppRunnerConfig) -> CompositionResult<AppRunnerOutputs> {
        let name = scope.name().clone();

        let network: Arc<dyn NetworkCapability> = match self.network {
            Reference::Supplied(network) => network,
            Reference::Absent => {
                debug!(component = %name, "No network supplied, building an owned one");
                let handle = scope.component(
                    AwsNetwork,
                    ComponentArgs::new(name.child("net"))
                        .with_overrides(json!({ "region": config.region })),
                )?;
                Arc::new(handle)
            }
        };

        let security_group_name = name.child("sg");
        let security_group = scope.node(
            NodeSpec::new(ResourceType::SecurityGroup, security_group_name.as_str())
                .property("vpcId", network.network_id())
                .property("description", format!("Egress for {name}"))
                .property(
                    "egress",
                    PropertyValue::List(vec![PropertyValue::map([
                        ("protocol", PropertyValue::from("-1")),
                        ("fromPort", PropertyValue::from(0u16)),
                        ("toPort", PropertyValue::from(0u16)),
                        ("cidrBlocks", PropertyValue::List(vec![PropertyValue::from("0.0.0.0/0")])),
                    ])]),
                )
                .property("tags", name_tags(&config.tags, &security_group_name))
                .depends_on(network.component()),
        )?;

        let connector_name = name.child("connector");
        let connector = scope.node(
            NodeSpec::new(ResourceType::VpcConnector, connector_name.as_str())
                .property("vpcConnectorName", connector_name.as_str())
                .property("subnets", PropertyValue::List(network.subnet_ids()))
                .property("securityGroups", PropertyValue::List(vec![security_group.attr("id")]))
                .property("tags", name_tags(&config.tags, &connector_name))
                .depends_on(network.component())
                .depends_on(security_group),
        )?;

        let image_identifier = format!("{}:{}", config.image.repository_url, config.image.tag);
        let service_name = name.child("service");
        let service = scope.node(
            NodeSpec::new(ResourceType::AppRunnerService, service_name.as_str())
                .property("serviceName", name.as_str())
                .property(
                    "sourceConfiguration",
                    PropertyValue::map([
                        (
                            "imageRepository",
                            PropertyValue::map([
                                ("imageIdentifier", PropertyValue::from(image_identifier)),
                                ("imageRepositoryType", PropertyValue::from("ECR")),
                                (
                                    "imageConfiguration",
                                    PropertyValue::map([
                                        ("port", PropertyValue::from(config.image.port.to_string())),
                                        (
                                            "runtimeEnvironmentVariables",
                                            PropertyValue::map(
                                                config
                                                    .environment
                                                    .iter()
                                                    .map(|(key, value)| (key.as_str(), value.as_str())),
                                            ),
                                        ),
                                    ]),
                                ),
                            ]),
                        ),
                        ("autoDeploymentsEnabled", PropertyValue::from(false)),
                    ]),
                )
                .property(
                    "instanceConfiguration",
                    PropertyValue::map([
                        ("cpu", config.instance.cpu.as_str()),
                        ("memory", config.instance.memory.as_str()),
                    ]),
                )
                .property(
                    "networkConfiguration",
                    PropertyValue::map([(
                        "egressConfiguration",
                        PropertyValue::map([
                            ("egressType", PropertyValue::from("VPC")),
                            ("vpcConnectorArn", connector.attr("arn")),
                        ]),
                    )]),
                )
                .property(
                    "autoScaling",
                    PropertyValue::map([
                        ("minSize", config.auto_scaling.min_size),
                        ("maxSize", config.auto_scaling.max_size),
                    ]),
                )
                .property("tags", name_tags(&config.tags, &service_name))
                .depends_on(connector),
        )?;

        Ok(AppRunnerOutputs {
            service_id: service.attr("id"),
            service_url: service.attr("serviceUrl"),
            network_id: network.network_id(),
        })
    }
}
