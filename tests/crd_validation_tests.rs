//! # CRD Validation Tests
//!
//! Sample manifests for every managed kind, deserialized the way the API
//! server hands them to the controller, to catch schema drift early.

use kube::CustomResourceExt;
use prometheus_service_controller::crd::{
    AlertManagerDefinition, ConditionStatus, ConditionType, LoggingConfiguration,
    RuleGroupsNamespace, StatusCode, Workspace,
};

#[test]
fn test_workspace_with_status() {
    let yaml = r#"
apiVersion: prometheusservice.amp.dev/v1alpha1
kind: Workspace
metadata:
  name: metrics
  namespace: default
spec:
  alias: prod
  kmsKeyARN: arn:aws:kms:us-west-2:111122223333:key/abc
  tags:
    team: observability
status:
  workspaceID: ws-1
  prometheusEndpoint: https://aps-workspaces.us-west-2.amazonaws.com/workspaces/ws-1/
  statusCode: ACTIVE
  resourceMetadata:
    arn: arn:aws:aps:us-west-2:111122223333:workspace/ws-1
    ownerAccountID: "111122223333"
    region: us-west-2
  conditions:
    - type: ResourceSynced
      status: "True"
      lastTransitionTime: "2024-01-01T00:00:00Z"
"#;

    let ws: Workspace = serde_yaml::from_str(yaml).expect("Should deserialize workspace");

    assert_eq!(ws.spec.alias.as_deref(), Some("prod"));
    assert_eq!(
        ws.spec.kms_key_arn.as_deref(),
        Some("arn:aws:kms:us-west-2:111122223333:key/abc")
    );
    assert_eq!(ws.spec.tags.get("team").map(String::as_str), Some("observability"));

    let status = ws.status.as_ref().expect("status");
    assert_eq!(status.workspace_id.as_deref(), Some("ws-1"));
    assert_eq!(status.status_code, Some(StatusCode::Active));
    assert_eq!(
        status.arn(),
        Some("arn:aws:aps:us-west-2:111122223333:workspace/ws-1")
    );
    let metadata = status.resource_metadata.as_ref().expect("metadata");
    assert_eq!(metadata.owner_account_id.as_deref(), Some("111122223333"));
    assert!(status.is_condition_true(ConditionType::Synced));
}

#[test]
fn test_rule_groups_namespace() {
    let yaml = r#"
apiVersion: prometheusservice.amp.dev/v1alpha1
kind: RuleGroupsNamespace
metadata:
  name: rules
  namespace: default
spec:
  name: rules
  workspaceID: ws-1
  configuration: |
    groups:
      - name: example
        rules:
          - record: job:up:sum
            expr: sum(up) by (job)
"#;

    let rgn: RuleGroupsNamespace =
        serde_yaml::from_str(yaml).expect("Should deserialize rule groups namespace");

    assert_eq!(rgn.spec.name, "rules");
    assert_eq!(rgn.spec.workspace_id, "ws-1");
    assert!(rgn
        .spec
        .configuration
        .as_deref()
        .is_some_and(|c| c.starts_with("groups:")));
    assert!(rgn.spec.tags.is_empty());
    assert!(rgn.status.is_none());
}

#[test]
fn test_alert_manager_definition_failed_status() {
    let yaml = r#"
apiVersion: prometheusservice.amp.dev/v1alpha1
kind: AlertManagerDefinition
metadata:
  name: alerts
  namespace: default
spec:
  workspaceID: ws-1
  configuration: |
    alertmanager_config: |
      route:
        receiver: default
status:
  statusCode: UPDATE_FAILED
  statusReason: "error validating alertmanager configuration: unknown receiver"
  conditions:
    - type: Terminal
      status: "True"
      message: "error validating alertmanager configuration: unknown receiver"
    - type: ResourceSynced
      status: "True"
"#;

    let amd: AlertManagerDefinition =
        serde_yaml::from_str(yaml).expect("Should deserialize alert manager definition");

    let status = amd.status.as_ref().expect("status");
    assert_eq!(status.status_code, Some(StatusCode::UpdateFailed));
    let terminal = status.condition(ConditionType::Terminal).expect("terminal");
    assert_eq!(terminal.status, ConditionStatus::True);
    assert!(terminal
        .message
        .as_deref()
        .is_some_and(|m| m.contains("error validating")));
}

#[test]
fn test_unknown_status_code_is_tolerated() {
    let yaml = r#"
apiVersion: prometheusservice.amp.dev/v1alpha1
kind: LoggingConfiguration
metadata:
  name: logs
  namespace: default
spec:
  workspaceID: ws-1
  logGroupARN: arn:aws:logs:us-west-2:111122223333:log-group:/aws/prometheus/ws-1:*
status:
  statusCode: UNKNOWN
"#;

    let logging: LoggingConfiguration =
        serde_yaml::from_str(yaml).expect("Should deserialize logging configuration");

    assert_eq!(
        logging.spec.log_group_arn,
        "arn:aws:logs:us-west-2:111122223333:log-group:/aws/prometheus/ws-1:*"
    );
    assert_eq!(
        logging.status.and_then(|s| s.status_code),
        Some(StatusCode::Unknown)
    );
}

#[test]
fn test_missing_workspace_id_is_rejected() {
    let yaml = r#"
apiVersion: prometheusservice.amp.dev/v1alpha1
kind: AlertManagerDefinition
metadata:
  name: alerts
spec:
  configuration: "route: {}"
"#;

    let result: Result<AlertManagerDefinition, _> = serde_yaml::from_str(yaml);
    assert!(result.is_err(), "workspaceID is required");
}

#[test]
fn test_crds_share_group_and_version() {
    let crds = [
        Workspace::crd(),
        RuleGroupsNamespace::crd(),
        AlertManagerDefinition::crd(),
        LoggingConfiguration::crd(),
    ];

    for crd in &crds {
        assert_eq!(crd.spec.group, "prometheusservice.amp.dev");
        assert_eq!(crd.spec.scope, "Namespaced");
        let version = &crd.spec.versions[0];
        assert_eq!(version.name, "v1alpha1");
        assert!(
            version.subresources.as_ref().is_some_and(|s| s.status.is_some()),
            "{} must expose the status subresource",
            crd.spec.names.kind
        );
    }
}
