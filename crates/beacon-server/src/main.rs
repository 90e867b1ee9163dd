mod api;
mod middleware;

use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use beacon_scanner::{PgScanStore, QueueConfig, ScanDeps, ScanQueue};

use crate::api::{build_app, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(beacon_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let pool_config = beacon_db::PoolConfig {
        max_connections: config.db_max_connections,
        min_connections: config.db_min_connections,
        acquire_timeout_secs: config.db_acquire_timeout_secs,
    };
    let pool = beacon_db::connect_pool(&config.database_url, pool_config).await?;
    beacon_db::run_migrations(&pool).await?;

    let providers = beacon_providers::build_providers(&config)?;
    if providers.is_empty() {
        tracing::warn!("no AI provider API keys configured; scans will fail until one is set");
    }
    let deps = Arc::new(ScanDeps {
        store: Arc::new(PgScanStore::new(pool.clone())),
        providers,
        provider_timeout: Duration::from_secs(config.provider_request_timeout_secs),
    });

    let queue = config
        .queue_enabled()
        .then(|| Arc::new(ScanQueue::start(Arc::clone(&deps), QueueConfig::from_app_config(&config))));
    if queue.is_none() {
        tracing::info!("scan queue disabled; scans will run synchronously");
    }

    let app = build_app(AppState { pool, deps, queue });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "beacon server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
