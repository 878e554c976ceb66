//! # Operations
//!
//! Implements `Backend` for Amazon Managed Service for Prometheus. Each method
//! dispatches on the resource kind to a single SDK call.

use super::convert::{backend_error, to_btree, to_hash, wire_status, Observed};
use super::AmpBackend;
use crate::constants::RESOURCE_NOT_FOUND_EXCEPTION;
use crate::provider::{
    Backend, BackendError, Kind, Mutation, ResourceKey, WireObject, WireRequest,
};
use async_trait::async_trait;
use aws_sdk_amp::primitives::Blob;
use tracing::debug;

fn is_not_found(error: &BackendError) -> bool {
    error.code() == Some(RESOURCE_NOT_FOUND_EXCEPTION)
}

/// Key of a request; only a workspace create goes without one
fn request_key(request: &WireRequest) -> Result<&ResourceKey, BackendError> {
    request
        .key
        .as_ref()
        .ok_or_else(|| BackendError::Transport("request carries no resource key".to_string()))
}

fn rule_groups_name(key: &ResourceKey) -> Result<&str, BackendError> {
    key.name
        .as_deref()
        .ok_or_else(|| BackendError::Transport("rule groups namespace key carries no name".to_string()))
}

fn blob(data: Option<&Vec<u8>>) -> Option<Blob> {
    data.map(|bytes| Blob::new(bytes.clone()))
}

#[async_trait]
impl Backend for AmpBackend {
    async fn describe(
        &self,
        kind: Kind,
        key: &ResourceKey,
    ) -> Result<Option<WireObject>, BackendError> {
        debug!(kind = kind.as_str(), key = %key, "describe");
        let described = match kind {
            Kind::Workspace => self.describe_workspace(key).await,
            Kind::RuleGroupsNamespace => self.describe_rule_groups_namespace(key).await,
            Kind::AlertManagerDefinition => self.describe_alert_manager_definition(key).await,
            Kind::LoggingConfiguration => self.describe_logging_configuration(key).await,
        };
        match described {
            Err(e) if is_not_found(&e) => Ok(None),
            other => other,
        }
    }

    async fn create(&self, kind: Kind, request: &WireRequest) -> Result<WireObject, BackendError> {
        match kind {
            Kind::Workspace => {
                let output = self
                    .client
                    .create_workspace()
                    .set_alias(request.alias.clone())
                    .set_kms_key_arn(request.kms_key_arn.clone())
                    .set_tags(to_hash(&request.tags))
                    .set_client_token(request.client_token.clone())
                    .send()
                    .await
                    .map_err(|e| backend_error(&e))?;
                Ok(WireObject {
                    arn: output.arn().observed().map(str::to_string),
                    workspace_id: output.workspace_id().observed().map(str::to_string),
                    status: output
                        .status()
                        .observed()
                        .and_then(|s| s.status_code().observed())
                        .map(|code| wire_status(code.as_str(), None)),
                    tags: to_btree(output.tags().observed()),
                    kms_key_arn: output.kms_key_arn().observed().map(str::to_string),
                    ..Default::default()
                })
            }
            Kind::RuleGroupsNamespace => {
                let key = request_key(request)?;
                let output = self
                    .client
                    .create_rule_groups_namespace()
                    .workspace_id(&key.workspace_id)
                    .name(rule_groups_name(key)?)
                    .set_data(blob(request.data.as_ref()))
                    .set_tags(to_hash(&request.tags))
                    .set_client_token(request.client_token.clone())
                    .send()
                    .await
                    .map_err(|e| backend_error(&e))?;
                Ok(WireObject {
                    arn: output.arn().observed().map(str::to_string),
                    name: output.name().observed().map(str::to_string),
                    status: output.status().observed().and_then(|s| {
                        s.status_code()
                            .observed()
                            .map(|code| wire_status(code.as_str(), s.status_reason()))
                    }),
                    tags: to_btree(output.tags().observed()),
                    ..Default::default()
                })
            }
            Kind::AlertManagerDefinition => {
                let key = request_key(request)?;
                let output = self
                    .client
                    .create_alert_manager_definition()
                    .workspace_id(&key.workspace_id)
                    .set_data(blob(request.data.as_ref()))
                    .set_client_token(request.client_token.clone())
                    .send()
                    .await
                    .map_err(|e| backend_error(&e))?;
                Ok(WireObject {
                    status: output.status().observed().and_then(|s| {
                        s.status_code()
                            .observed()
                            .map(|code| wire_status(code.as_str(), s.status_reason()))
                    }),
                    ..Default::default()
                })
            }
            Kind::LoggingConfiguration => {
                let key = request_key(request)?;
                let output = self
                    .client
                    .create_logging_configuration()
                    .workspace_id(&key.workspace_id)
                    .set_log_group_arn(request.log_group_arn.clone())
                    .set_client_token(request.client_token.clone())
                    .send()
                    .await
                    .map_err(|e| backend_error(&e))?;
                Ok(WireObject {
                    status: output.status().observed().and_then(|s| {
                        s.status_code()
                            .observed()
                            .map(|code| wire_status(code.as_str(), s.status_reason()))
                    }),
                    ..Default::default()
                })
            }
        }
    }

    async fn update(
        &self,
        kind: Kind,
        mutation: &Mutation,
    ) -> Result<Option<WireObject>, BackendError> {
        match mutation {
            Mutation::TagResource { arn, tags } => {
                self.client
                    .tag_resource()
                    .resource_arn(arn)
                    .set_tags(to_hash(tags))
                    .send()
                    .await
                    .map_err(|e| backend_error(&e))?;
                Ok(None)
            }
            Mutation::UntagResource { arn, keys } => {
                self.client
                    .untag_resource()
                    .resource_arn(arn)
                    .set_tag_keys(Some(keys.clone()))
                    .send()
                    .await
                    .map_err(|e| backend_error(&e))?;
                Ok(None)
            }
            Mutation::Put(request) => self.put(kind, request).await,
        }
    }

    async fn delete(&self, kind: Kind, key: &ResourceKey) -> Result<(), BackendError> {
        let deleted = match kind {
            Kind::Workspace => self
                .client
                .delete_workspace()
                .workspace_id(&key.workspace_id)
                .send()
                .await
                .map(|_| ())
                .map_err(|e| backend_error(&e)),
            Kind::RuleGroupsNamespace => self
                .client
                .delete_rule_groups_namespace()
                .workspace_id(&key.workspace_id)
                .name(rule_groups_name(key)?)
                .send()
                .await
                .map(|_| ())
                .map_err(|e| backend_error(&e)),
            Kind::AlertManagerDefinition => self
                .client
                .delete_alert_manager_definition()
                .workspace_id(&key.workspace_id)
                .send()
                .await
                .map(|_| ())
                .map_err(|e| backend_error(&e)),
            Kind::LoggingConfiguration => self
                .client
                .delete_logging_configuration()
                .workspace_id(&key.workspace_id)
                .send()
                .await
                .map(|_| ())
                .map_err(|e| backend_error(&e)),
        };
        match deleted {
            Err(e) if is_not_found(&e) => Ok(()),
            other => other,
        }
    }
}

impl AmpBackend {
    async fn describe_workspace(&self, key: &ResourceKey) -> Result<Option<WireObject>, BackendError> {
        let output = self
            .client
            .describe_workspace()
            .workspace_id(&key.workspace_id)
            .send()
            .await
            .map_err(|e| backend_error(&e))?;
        Ok(output.workspace().observed().map(|ws| WireObject {
            arn: ws.arn().observed().map(str::to_string),
            workspace_id: ws.workspace_id().observed().map(str::to_string),
            alias: ws.alias().observed().map(str::to_string),
            status: ws
                .status()
                .observed()
                .and_then(|s| s.status_code().observed())
                .map(|code| wire_status(code.as_str(), None)),
            tags: Some(to_btree(ws.tags().observed()).unwrap_or_default()),
            prometheus_endpoint: ws.prometheus_endpoint().observed().map(str::to_string),
            kms_key_arn: ws.kms_key_arn().observed().map(str::to_string),
            ..Default::default()
        }))
    }

    async fn describe_rule_groups_namespace(
        &self,
        key: &ResourceKey,
    ) -> Result<Option<WireObject>, BackendError> {
        let output = self
            .client
            .describe_rule_groups_namespace()
            .workspace_id(&key.workspace_id)
            .name(rule_groups_name(key)?)
            .send()
            .await
            .map_err(|e| backend_error(&e))?;
        Ok(output.rule_groups_namespace().observed().map(|rgn| WireObject {
            arn: rgn.arn().observed().map(str::to_string),
            name: rgn.name().observed().map(str::to_string),
            status: rgn.status().observed().and_then(|s| {
                s.status_code()
                    .observed()
                    .map(|code| wire_status(code.as_str(), s.status_reason()))
            }),
            data: rgn.data().observed().map(|d| d.as_ref().to_vec()),
            tags: Some(to_btree(rgn.tags().observed()).unwrap_or_default()),
            ..Default::default()
        }))
    }

    async fn describe_alert_manager_definition(
        &self,
        key: &ResourceKey,
    ) -> Result<Option<WireObject>, BackendError> {
        let output = self
            .client
            .describe_alert_manager_definition()
            .workspace_id(&key.workspace_id)
            .send()
            .await
            .map_err(|e| backend_error(&e))?;
        Ok(output.alert_manager_definition().observed().map(|amd| WireObject {
            status: amd.status().observed().and_then(|s| {
                s.status_code()
                    .observed()
                    .map(|code| wire_status(code.as_str(), s.status_reason()))
            }),
            data: amd.data().observed().map(|d| d.as_ref().to_vec()),
            ..Default::default()
        }))
    }

    async fn describe_logging_configuration(
        &self,
        key: &ResourceKey,
    ) -> Result<Option<WireObject>, BackendError> {
        let output = self
            .client
            .describe_logging_configuration()
            .workspace_id(&key.workspace_id)
            .send()
            .await
            .map_err(|e| backend_error(&e))?;
        Ok(output.logging_configuration().observed().map(|lc| WireObject {
            status: lc.status().observed().and_then(|s| {
                s.status_code()
                    .observed()
                    .map(|code| wire_status(code.as_str(), s.status_reason()))
            }),
            log_group_arn: lc.log_group_arn().observed().map(str::to_string),
            ..Default::default()
        }))
    }

    async fn put(&self, kind: Kind, request: &WireRequest) -> Result<Option<WireObject>, BackendError> {
        let key = request_key(request)?;
        match kind {
            Kind::Workspace => {
                self.client
                    .update_workspace_alias()
                    .workspace_id(&key.workspace_id)
                    .set_alias(request.alias.clone())
                    .send()
                    .await
                    .map_err(|e| backend_error(&e))?;
                Ok(None)
            }
            Kind::RuleGroupsNamespace => {
                let output = self
                    .client
                    .put_rule_groups_namespace()
                    .workspace_id(&key.workspace_id)
                    .name(rule_groups_name(key)?)
                    .set_data(blob(request.data.as_ref()))
                    .send()
                    .await
                    .map_err(|e| backend_error(&e))?;
                Ok(Some(WireObject {
                    arn: output.arn().observed().map(str::to_string),
                    name: output.name().observed().map(str::to_string),
                    status: output.status().observed().and_then(|s| {
                        s.status_code()
                            .observed()
                            .map(|code| wire_status(code.as_str(), s.status_reason()))
                    }),
                    tags: to_btree(output.tags().observed()),
                    ..Default::default()
                }))
            }
            Kind::AlertManagerDefinition => {
                let output = self
                    .client
                    .put_alert_manager_definition()
                    .workspace_id(&key.workspace_id)
                    .set_data(blob(request.data.as_ref()))
                    .send()
                    .await
                    .map_err(|e| backend_error(&e))?;
                Ok(Some(WireObject {
                    status: output.status().observed().and_then(|s| {
                        s.status_code()
                            .observed()
                            .map(|code| wire_status(code.as_str(), s.status_reason()))
                    }),
                    ..Default::default()
                }))
            }
            Kind::LoggingConfiguration => {
                let output = self
                    .client
                    .update_logging_configuration()
                    .workspace_id(&key.workspace_id)
                    .set_log_group_arn(request.log_group_arn.clone())
                    .send()
                    .await
                    .map_err(|e| backend_error(&e))?;
                Ok(Some(WireObject {
                    status: output.status().observed().and_then(|s| {
                        s.status_code()
                            .observed()
                            .map(|code| wire_status(code.as_str(), s.status_reason()))
                    }),
                    ..Default::default()
                }))
            }
        }
    }
}
