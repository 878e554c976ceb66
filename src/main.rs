//! # Prometheus Service Controller
//!
//! A Kubernetes controller that reconciles Amazon Managed Service for
//! Prometheus resources declared as custom resources.
//!
//! ## Overview
//!
//! Each managed kind runs its own watch loop. A pass describes the backend
//! resource, creates, updates or deletes it as needed, and records the
//! outcome as `ResourceSynced`, `Terminal` and `Recoverable` conditions.
//!
//! - **Workspace** - the workspace itself, its alias and tags
//! - **RuleGroupsNamespace** - recording and alerting rules of a workspace
//! - **AlertManagerDefinition** - the workspace's Alertmanager configuration
//! - **LoggingConfiguration** - the CloudWatch log group of a workspace

use anyhow::Result;
use prometheus_service_controller::config::ControllerConfig;
use prometheus_service_controller::runtime::initialization::{initialize, spawn_shutdown_listener};
use prometheus_service_controller::runtime::watch_loop::run_controllers;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let config = ControllerConfig::from_env();
    let runtime = initialize(config).await?;

    spawn_shutdown_listener(
        runtime.context.cancel.clone(),
        Arc::clone(&runtime.server_state),
    );

    run_controllers(Arc::clone(&runtime.context)).await;

    runtime.server_shutdown.cancel();
    if let Err(e) = runtime.server_handle.await {
        warn!("HTTP server task failed: {}", e);
    }

    info!("Controller stopped");
    Ok(())
}
