// Copyright (c) 2025 - Cowboy AI, Inc.
//! Sentry project with a client key and conditional alert channels
//!
//! One issue-alert rule is created per enabled notification channel: email
//! when `notifications.email.enabled`, Slack when both workspace and channel
//! are set. With neither, the project has no alert rules.

use serde::{Deserialize, Serialize};

use super::string_list;
use crate::component::{Component, ComponentOutputs};
use crate::config::DefaultSource;
use crate::domain::invariants::{
    require_all_or_none, require_non_empty, require_non_empty_list, require_range, require_unique,
};
use crate::domain::{ResourceType, ValidationResult};
use crate::errors::CompositionResult;
use crate::graph::{NodeRef, NodeSpec, OutputMap, PropertyValue, Scope};

const FIRST_SEEN_CONDITION: &str = "sentry.rules.conditions.first_seen_event.FirstSeenEventCondition";
const EMAIL_ACTION: &str = "sentry.mail.actions.NotifyEmailAction";
const SLACK_ACTION: &str = "sentry.integrations.slack.notify_action.SlackNotifyServiceAction";

/// Monitored project component
#[derive(Debug, Clone, Copy, Default)]
pub struct SentryProject;

/// Email alerting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmailNotification {
    pub enabled: bool,
    pub recipients: Vec<String>,
}

/// Slack alerting; active when both fields are set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SlackNotification {
    pub workspace: Option<String>,
    pub channel: Option<String>,
}

/// Alert channels and throttling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NotificationConfig {
    pub email: EmailNotification,
    pub slack: SlackNotification,
    pub frequency_minutes: u32,
}

/// Project configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SentryProjectConfig {
    pub organization: String,
    pub platform: String,
    pub teams: Vec<String>,
    pub notifications: NotificationConfig,
}

/// Project outputs
#[derive(Debug, Clone, PartialEq)]
pub struct SentryProjectOutputs {
    pub project_id: PropertyValue,
    pub dsn: PropertyValue,
    pub alert_rule_ids: Vec<PropertyValue>,
}

impl ComponentOutputs for SentryProjectOutputs {
    fn entries(&self) -> OutputMap {
        OutputMap::from([
            ("projectId".to_string(), self.project_id.clone()),
            ("dsn".to_string(), self.dsn.clone()),
            ("alertRuleIds".to_string(), PropertyValue::List(self.alert_rule_ids.clone())),
        ])
    }
}

fn alert_rule(
    project: NodeRef,
    logical_name: String,
    config: &SentryProjectConfig,
    action: PropertyValue,
) -> NodeSpec {
    NodeSpec::new(ResourceType::SentryIssueAlert, logical_name.as_str())
        .property("organization", config.organization.as_str())
        .property("project", project.attr("slug"))
        .property("name", logical_name.as_str())
        .property("actionMatch", "any")
        .property("filterMatch", "any")
        .property("frequency", config.notifications.frequency_minutes)
        .property(
            "conditions",
            PropertyValue::List(vec![PropertyValue::map([("id", FIRST_SEEN_CONDITION)])]),
        )
        .property("actions", PropertyValue::List(vec![action]))
        .owned_by(project)
        .depends_on(project)
}

impl Component for SentryProject {
    const TYPE_TAG: &'static str = "monitoring:sentry:sentry-project";
    type Config = SentryProjectConfig;
    type Outputs = SentryProjectOutputs;

    fn defaults(source: &DefaultSource) -> SentryProjectConfig {
        SentryProjectConfig {
            organization: source.sentry_organization.clone().unwrap_or_default(),
            platform: "other".to_string(),
            teams: Vec::new(),
            notifications: NotificationConfig {
                email: EmailNotification {
                    enabled: false,
                    recipients: Vec::new(),
                },
                slack: SlackNotification::default(),
                frequency_minutes: 30,
            },
        }
    }

    fn validate(config: &SentryProjectConfig) -> ValidationResult {
        require_non_empty("organization", &config.organization)?;
        require_non_empty("platform", &config.platform)?;
        require_non_empty_list("teams", &config.teams)?;
        require_unique("teams", config.teams.iter().map(String::as_str))?;

        let notifications = &config.notifications;
        if notifications.email.enabled {
            require_non_empty_list("notifications.email.recipients", &notifications.email.recipients)?;
        }
        require_all_or_none(&[
            ("notifications.slack.workspace", notifications.slack.workspace.is_some()),
            ("notifications.slack.channel", notifications.slack.channel.is_some()),
        ])?;
        if let Some(workspace) = &notifications.slack.workspace {
            require_non_empty("notifications.slack.workspace", workspace)?;
        }
        if let Some(channel) = &notifications.slack.channel {
            require_non_empty("notifications.slack.channel", channel)?;
        }
        require_range("notifications.frequencyMinutes", notifications.frequency_minutes, 5, 1440)
    }

    fn populate(self, scope: &mut Scope<'_>, config: &SentryProjectConfig) -> CompositionResult<SentryProjectOutputs> {
        let name = scope.name().clone();

        let project = scope.node(
            NodeSpec::new(ResourceType::SentryProject, name.as_str())
                .property("organization", config.organization.as_str())
                .property("name", name.as_str())
                .property("slug", name.as_str())
                .property("platform", config.platform.as_str())
                .property("teams", string_list(&config.teams)),
        )?;

        let key = scope.node(
            NodeSpec::new(ResourceType::SentryKey, name.child("key"))
                .property("organization", config.organization.as_str())
                .property("project", project.attr("slug"))
                .property("name", name.child("key"))
                .owned_by(project)
                .depends_on(project),
        )?;

        let notifications = &config.notifications;
        let mut alert_rule_ids = Vec::new();

        if notifications.email.enabled {
            let action = PropertyValue::map([
                ("id", PropertyValue::from(EMAIL_ACTION)),
                ("targetType", PropertyValue::from("IssueOwners")),
                ("recipients", string_list(&notifications.email.recipients)),
            ]);
            let rule = scope.node(alert_rule(project, name.child("email-alert"), config, action))?;
            alert_rule_ids.push(rule.attr("id"));
        }

        if let (Some(workspace), Some(channel)) = (&notifications.slack.workspace, &notifications.slack.channel) {
            let action = PropertyValue::map([
                ("id", PropertyValue::from(SLACK_ACTION)),
                ("workspace", PropertyValue::from(workspace.as_str())),
                ("channel", PropertyValue::from(channel.as_str())),
            ]);
            let rule = scope.node(alert_rule(project, name.child("slack-alert"), config, action))?;
            alert_rule_ids.push(rule.attr("id"));
        }

        Ok(SentryProjectOutputs {
            project_id: project.attr("id"),
            dsn: key.attr("dsnPublic"),
            alert_rule_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentArgs;
    use crate::domain::ValidationError;
    use crate::graph::GraphBuilder;
    use serde_json::json;

    fn graph() -> GraphBuilder {
        GraphBuilder::new(DefaultSource::default().with_sentry_organization("acme"))
    }

    fn alert_names(graph: &GraphBuilder) -> Vec<String> {
        graph
            .nodes_of_type(ResourceType::SentryIssueAlert.as_str())
            .map(|node| node.logical_name().to_string())
            .collect()
    }

    #[test]
    fn test_no_channels_no_alerts() {
        let mut graph = graph();
        let project = graph
            .declare(
                SentryProject,
                ComponentArgs::new("api").with_overrides(json!({ "teams": ["backend"] })),
            )
            .unwrap();

        assert!(project.outputs().alert_rule_ids.is_empty());
        assert!(alert_names(&graph).is_empty());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_enabled_channels_create_alerts() {
        let mut graph = graph();
        let project = graph
            .declare(
                SentryProject,
                ComponentArgs::new("api").with_overrides(json!({
                    "teams": ["backend"],
                    "notifications": {
                        "email": { "enabled": true, "recipients": ["oncall@example.com"] },
                        "slack": { "workspace": "acme", "channel": "#alerts" }
                    }
                })),
            )
            .unwrap();

        assert_eq!(project.outputs().alert_rule_ids.len(), 2);
        assert_eq!(alert_names(&graph), vec!["api-email-alert", "api-slack-alert"]);

        let rule = graph
            .find_node(ResourceType::SentryIssueAlert.as_str(), "api-email-alert")
            .unwrap();
        assert_eq!(rule.property("frequency"), Some(&PropertyValue::from(30u32)));
    }

    #[test]
    fn test_organization_required() {
        let mut graph = GraphBuilder::new(DefaultSource::default());
        let err = graph
            .declare(
                SentryProject,
                ComponentArgs::new("api").with_overrides(json!({ "teams": ["backend"] })),
            )
            .unwrap_err();

        assert_eq!(err.field(), Some("organization"));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_partial_slack_rejected() {
        let mut config = SentryProject::defaults(&DefaultSource::default().with_sentry_organization("acme"));
        config.teams = vec!["backend".to_string()];
        config.notifications.slack.channel = Some("#alerts".to_string());

        assert_eq!(
            SentryProject::validate(&config).unwrap_err(),
            ValidationError::Incomplete {
                field: "notifications.slack.channel".to_string(),
                missing: "notifications.slack.workspace".to_string(),
            }
        );
    }

    #[test]
    fn test_empty_slack_workspace_rejected() {
        let mut graph = graph();
        let err = graph
            .declare(
                SentryProject,
                ComponentArgs::new("api").with_overrides(json!({
                    "teams": ["backend"],
                    "notifications": { "slack": { "workspace": "", "channel": "#alerts" } }
                })),
            )
            .unwrap_err();

        assert_eq!(err.field(), Some("notifications.slack.workspace"));
        assert_eq!(graph.node_count(), 0);
    }

    #[test]
    fn test_enabled_email_needs_recipients() {
        let mut config = SentryProject::defaults(&DefaultSource::default().with_sentry_organization("acme"));
        config.teams = vec!["backend".to_string()];
        config.notifications.email.enabled = true;

        assert_eq!(
            SentryProject::validate(&config).unwrap_err().field(),
            "notifications.email.recipients"
        );
    }
}
