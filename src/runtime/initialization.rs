//! # Initialization
//!
//! Controller start-up: rustls setup, tracing, metrics, server startup,
//! Kubernetes client, AWS SDK configuration and reconciler setup.

use crate::config::{ControllerConfig, LogFormat};
use crate::controller::reconciler::Reconciler;
use crate::controller::server::{start_server, ServerState};
use crate::observability;
use crate::provider::aws::{load_sdk_config, resolve_identity, AmpBackend};
use crate::provider::Backend;
use crate::runtime::Context;
use anyhow::{Context as _, Result};
use kube::Client;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Everything the binary needs to run the watch loops and shut down
pub struct InitializationResult {
    pub context: Arc<Context>,
    pub server_state: Arc<ServerState>,
    /// Stops the HTTP server; cancelled after the watch loops drain
    pub server_shutdown: CancellationToken,
    pub server_handle: JoinHandle<()>,
}

impl std::fmt::Debug for InitializationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InitializationResult")
            .field("server_ready", &self.server_state.is_ready())
            .finish_non_exhaustive()
    }
}

/// Initialize the controller runtime
pub async fn initialize(config: ControllerConfig) -> Result<InitializationResult> {
    // Required for rustls 0.23+ when no default provider is selected by features
    let provider_installed = rustls::crypto::ring::default_provider()
        .install_default()
        .is_ok();

    init_tracing(config.log_format)?;
    if !provider_installed {
        warn!("rustls crypto provider was already installed");
    }

    info!("Starting Prometheus Service Controller");
    info!(
        "Build info: timestamp={}, datetime={}, git_hash={}",
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_DATETIME"),
        env!("BUILD_GIT_HASH")
    );

    observability::metrics::register_metrics()?;

    let server_state = Arc::new(ServerState::default());
    let server_shutdown = CancellationToken::new();
    let server_handle = {
        let state = Arc::clone(&server_state);
        let shutdown = server_shutdown.clone();
        let port = config.metrics_port;
        tokio::spawn(async move {
            if let Err(e) = start_server(port, state, shutdown).await {
                error!("HTTP server error: {}", e);
            }
        })
    };
    wait_for_server_ready(&server_state, &server_handle, &config).await?;

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let sdk_config = load_sdk_config(config.aws_region.as_deref()).await;
    let identity = resolve_identity(&sdk_config).await;
    info!(
        region = identity.region.as_deref().unwrap_or("unset"),
        account = identity.account_id.as_deref().unwrap_or("unknown"),
        "AWS identity resolved"
    );

    let backend: Arc<dyn Backend> = Arc::new(AmpBackend::new(&sdk_config));
    let reconciler = Reconciler::new(backend, config.reconciler_settings(identity));
    let context = Arc::new(Context::new(
        client,
        reconciler,
        config,
        CancellationToken::new(),
    ));

    info!("Controller initialized, starting watch loops...");
    Ok(InitializationResult {
        context,
        server_state,
        server_shutdown,
        server_handle,
    })
}

/// Install the global subscriber; `RUST_LOG` overrides the default filter
fn init_tracing(format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("prometheus_service_controller=info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.try_init(),
    }
    .map_err(|e| anyhow::anyhow!("Failed to initialize tracing subscriber: {e}"))
}

/// Poll until the HTTP server is bound, so readiness probes pass immediately
async fn wait_for_server_ready(
    server_state: &ServerState,
    server_handle: &JoinHandle<()>,
    config: &ControllerConfig,
) -> Result<()> {
    let startup_timeout = Duration::from_secs(config.server_startup_timeout_secs);
    let poll_interval = Duration::from_millis(config.server_poll_interval_ms);
    let start_time = Instant::now();

    loop {
        if server_handle.is_finished() {
            return Err(anyhow::anyhow!("HTTP server failed to start"));
        }
        if server_state.is_ready() {
            info!("HTTP server is ready and accepting connections");
            return Ok(());
        }
        if start_time.elapsed() > startup_timeout {
            return Err(anyhow::anyhow!(
                "HTTP server failed to become ready within {} seconds",
                startup_timeout.as_secs()
            ));
        }
        tokio::time::sleep(poll_interval).await;
    }
}

/// Cancel `cancel` and mark the server not ready on SIGINT or SIGTERM
pub fn spawn_shutdown_listener(cancel: CancellationToken, server_state: Arc<ServerState>) {
    tokio::spawn(async move {
        shutdown_signal().await;
        info!("Received shutdown signal (SIGINT/SIGTERM), initiating graceful shutdown...");
        server_state.set_ready(false);
        cancel.cancel();
    });
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
