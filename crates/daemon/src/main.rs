//! Codeintel Delete Worker - Main Entry Point
//! JSON-RPC server + queue worker for repository deletes

mod config;

use anyhow::{Context, Result};
use config::{DaemonConfig, LogFormat};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use codeintel_api_rpc::{RpcServer, RpcServerConfig};
use codeintel_core::application::retry::RetryPolicy;
use codeintel_core::application::worker::constants::SHUTDOWN_GRACE_PERIOD;
use codeintel_core::application::{shutdown_channel, DeleteTaskService, DeleteWorker, QueueWorker};
use codeintel_core::port::id_provider::UuidProvider;
use codeintel_core::port::time_provider::SystemTimeProvider;
use codeintel_infra_search::{ElasticsearchClient, SearchClientConfig};
use codeintel_infra_system::{
    BroadcastProgressNotifier, InMemoryCancellationRegistry, InMemoryJobQueue,
    LocalRepositoryStorageFactory, LocalWorkspaceService,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");
const WORKER_NAME: &str = "repository-delete";

fn init_logging(format: LogFormat) -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("codeintel=info"))
        .context("Failed to create env filter")?;

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().pretty())
            .try_init(),
    }
    .context("Failed to install tracing subscriber")
}

/// Log every progress event; socket sessions subscribe the same way
fn spawn_progress_logger(notifier: &BroadcastProgressNotifier) {
    let mut rx = notifier.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => debug!(uri = %event.uri, progress = event.progress, "Delete progress"),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped = skipped, "Progress logger lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Configuration and logging
    let config = DaemonConfig::from_env()?;
    init_logging(config.log_format)?;

    info!("Codeintel delete worker v{} starting...", VERSION);
    info!(
        es_url = %config.es_url,
        index_prefix = %config.index_prefix,
        workspace = %config.workspace_path.display(),
        "Configuration loaded"
    );

    // 2. Adapters (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let search_client = Arc::new(
        ElasticsearchClient::new(&SearchClientConfig {
            base_url: config.es_url.clone(),
            username: config.es_username.clone(),
            password: config.es_password.clone(),
            ..Default::default()
        })
        .context("Search client setup failed")?,
    );
    let cancellation = Arc::new(InMemoryCancellationRegistry::new());
    let language_service = Arc::new(LocalWorkspaceService::new(&config.workspace_path));
    let storage_factory = Arc::new(LocalRepositoryStorageFactory::with_repos_root(
        &config.repos_root,
    ));
    let notifier = Arc::new(BroadcastProgressNotifier::default());
    spawn_progress_logger(&notifier);
    let queue = Arc::new(InMemoryJobQueue::new());

    // 3. Application services
    let delete_worker = Arc::new(
        DeleteWorker::new(
            search_client,
            cancellation,
            language_service,
            storage_factory,
            notifier,
            time_provider.clone(),
        )
        .with_index_prefix(config.index_prefix.clone()),
    );
    let service = Arc::new(
        DeleteTaskService::new(
            delete_worker.clone(),
            queue.clone(),
            Arc::new(UuidProvider),
            time_provider.clone(),
        )
        .with_default_max_attempts(config.max_attempts),
    );
    let retry_policy = Arc::new(RetryPolicy::new(
        time_provider.clone(),
        config.retry_base_delay_ms,
    ));

    // 4. JSON-RPC server
    let rpc_config = RpcServerConfig {
        port: config.rpc_port,
        ..Default::default()
    };
    let (rpc_addr, rpc_handle) = RpcServer::new(rpc_config, service, queue.clone())
        .start()
        .await
        .context("RPC server start failed")?;

    // 5. Queue worker
    let (shutdown_tx, shutdown_rx) = shutdown_channel();
    let worker = QueueWorker::new(WORKER_NAME, queue, delete_worker, retry_policy, time_provider);
    let worker_handle = tokio::spawn(async move {
        if let Err(e) = worker.run(shutdown_rx).await {
            error!(error = %e, "Worker failed");
        }
    });

    info!(rpc = %rpc_addr, "System ready. Waiting for delete requests...");

    // 6. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received. Exiting gracefully...");

    shutdown_tx.cancel();
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    if tokio::time::timeout(SHUTDOWN_GRACE_PERIOD, worker_handle)
        .await
        .is_err()
    {
        warn!("Worker did not stop within the grace period");
    }

    info!("Shutdown complete.");
    Ok(())
}
