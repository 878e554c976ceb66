//! Common test utilities for reconciler integration tests
//!
//! Provides an in-memory backend that records every call and answers from
//! per-operation scripts, plus builders for the managed resources.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use async_trait::async_trait;
use prometheus_service_controller::prelude::*;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

pub const WORKSPACE_ID: &str = "ws-1";
pub const WORKSPACE_ARN: &str = "arn:aws:aps:us-west-2:111122223333:workspace/ws-1";
pub const RULES_ARN: &str = "arn:aws:aps:us-west-2:111122223333:rulegroupsnamespace/ws-1/rules";
pub const REGION: &str = "us-west-2";
pub const ACCOUNT_ID: &str = "111122223333";

/// A backend call as the reconciler issued it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Describe(Kind, ResourceKey),
    Create(Kind, WireRequest),
    Update(Kind, Mutation),
    Delete(Kind, ResourceKey),
}

/// Scripted backend
///
/// Each operation pops its next scripted answer; an empty script answers
/// not-found for describe and an empty success for everything else.
#[derive(Debug, Default)]
pub struct MockBackend {
    describe: Mutex<VecDeque<Result<Option<WireObject>, BackendError>>>,
    create: Mutex<VecDeque<Result<WireObject, BackendError>>>,
    update: Mutex<VecDeque<Result<Option<WireObject>, BackendError>>>,
    delete: Mutex<VecDeque<Result<(), BackendError>>>,
    calls: Mutex<Vec<Call>>,
    hang: AtomicBool,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn on_describe(&self, answer: Result<Option<WireObject>, BackendError>) -> &Self {
        self.describe.lock().unwrap().push_back(answer);
        self
    }

    pub fn on_create(&self, answer: Result<WireObject, BackendError>) -> &Self {
        self.create.lock().unwrap().push_back(answer);
        self
    }

    pub fn on_update(&self, answer: Result<Option<WireObject>, BackendError>) -> &Self {
        self.update.lock().unwrap().push_back(answer);
        self
    }

    pub fn on_delete(&self, answer: Result<(), BackendError>) -> &Self {
        self.delete.lock().unwrap().push_back(answer);
        self
    }

    /// Make every call hang until the caller gives up on it
    pub fn hang(&self) {
        self.hang.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Mutating calls only (create, update, delete)
    pub fn mutations(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, Call::Describe(..)))
            .collect()
    }

    async fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
        if self.hang.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn describe(
        &self,
        kind: Kind,
        key: &ResourceKey,
    ) -> Result<Option<WireObject>, BackendError> {
        self.record(Call::Describe(kind, key.clone())).await;
        self.describe.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    async fn create(&self, kind: Kind, request: &WireRequest) -> Result<WireObject, BackendError> {
        self.record(Call::Create(kind, request.clone())).await;
        self.create
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(WireObject::default()))
    }

    async fn update(
        &self,
        kind: Kind,
        mutation: &Mutation,
    ) -> Result<Option<WireObject>, BackendError> {
        self.record(Call::Update(kind, mutation.clone())).await;
        self.update.lock().unwrap().pop_front().unwrap_or(Ok(None))
    }

    async fn delete(&self, kind: Kind, key: &ResourceKey) -> Result<(), BackendError> {
        self.record(Call::Delete(kind, key.clone())).await;
        self.delete.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}

pub fn settings() -> ReconcilerSettings {
    ReconcilerSettings {
        identity: AwsIdentity {
            region: Some(REGION.into()),
            account_id: Some(ACCOUNT_ID.into()),
        },
        ..ReconcilerSettings::default()
    }
}

pub fn reconciler(backend: &Arc<MockBackend>) -> Reconciler<MockBackend> {
    Reconciler::new(Arc::clone(backend), settings())
}

pub fn tags(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

pub fn wire_status(code: &str, reason: Option<&str>) -> Option<WireStatus> {
    Some(WireStatus {
        code: code.into(),
        reason: reason.map(str::to_string),
    })
}

/// Describe answer for the bound workspace
pub fn workspace_description(code: &str, alias: Option<&str>, tag_pairs: &[(&str, &str)]) -> WireObject {
    WireObject {
        arn: Some(WORKSPACE_ARN.into()),
        workspace_id: Some(WORKSPACE_ID.into()),
        alias: alias.map(str::to_string),
        status: wire_status(code, None),
        tags: Some(tags(tag_pairs)),
        prometheus_endpoint: Some(format!(
            "https://aps-workspaces.{REGION}.amazonaws.com/workspaces/{WORKSPACE_ID}/"
        )),
        ..WireObject::default()
    }
}

/// Describe answer for a rule groups namespace named `rules`
pub fn rules_description(code: &str, data: &str) -> WireObject {
    WireObject {
        arn: Some(RULES_ARN.into()),
        name: Some("rules".into()),
        status: wire_status(code, None),
        data: Some(data.as_bytes().to_vec()),
        tags: Some(BTreeMap::new()),
        ..WireObject::default()
    }
}

/// Describe answer for an alert manager definition
pub fn definition_description(code: &str, reason: Option<&str>, data: &str) -> WireObject {
    WireObject {
        status: wire_status(code, reason),
        data: Some(data.as_bytes().to_vec()),
        ..WireObject::default()
    }
}

/// Workspace not created yet
pub fn workspace(alias: Option<&str>, tag_pairs: &[(&str, &str)]) -> Workspace {
    let mut ws = Workspace::new(
        "metrics",
        WorkspaceSpec {
            alias: alias.map(str::to_string),
            tags: tags(tag_pairs),
            ..WorkspaceSpec::default()
        },
    );
    ws.metadata.namespace = Some("default".into());
    ws.metadata.uid = Some("uid-workspace".into());
    ws
}

/// Workspace the backend already assigned `ws-1` to
pub fn bound_workspace(alias: Option<&str>, tag_pairs: &[(&str, &str)]) -> Workspace {
    let mut ws = workspace(alias, tag_pairs);
    ws.status = Some(ResourceStatus {
        workspace_id: Some(WORKSPACE_ID.into()),
        resource_metadata: Some(ResourceMetadata {
            arn: Some(WORKSPACE_ARN.into()),
            ..ResourceMetadata::default()
        }),
        status_code: Some(StatusCode::Active),
        ..ResourceStatus::default()
    });
    ws
}

pub fn rule_groups_namespace(configuration: Option<&str>) -> RuleGroupsNamespace {
    let mut rgn = RuleGroupsNamespace::new(
        "rules",
        RuleGroupsNamespaceSpec {
            name: "rules".into(),
            workspace_id: WORKSPACE_ID.into(),
            configuration: configuration.map(str::to_string),
            ..RuleGroupsNamespaceSpec::default()
        },
    );
    rgn.metadata.namespace = Some("default".into());
    rgn.metadata.uid = Some("uid-rules".into());
    rgn
}

pub fn alert_manager_definition(configuration: &str) -> AlertManagerDefinition {
    let mut amd = AlertManagerDefinition::new(
        "alerts",
        AlertManagerDefinitionSpec {
            workspace_id: WORKSPACE_ID.into(),
            configuration: Some(configuration.into()),
        },
    );
    amd.metadata.namespace = Some("default".into());
    amd.metadata.uid = Some("uid-alerts".into());
    amd.status = Some(ResourceStatus {
        status_code: Some(StatusCode::Active),
        ..ResourceStatus::default()
    });
    amd
}

pub fn condition<K: ManagedResource>(resource: &K, condition_type: ConditionType) -> Option<Condition> {
    resource
        .status()
        .and_then(|s| s.condition(condition_type))
        .cloned()
}

pub fn condition_status<K: ManagedResource>(
    resource: &K,
    condition_type: ConditionType,
) -> Option<ConditionStatus> {
    condition(resource, condition_type).map(|c| c.status)
}
