//! livewatchd - live-broadcast monitor.
//!
//! Polls tracked YouTube and Twitch channels and posts a message when a
//! stream goes live or ends.

mod config;
mod db;
mod error;
mod http;
mod metrics;
mod notify;
mod probe;
mod scheduler;
mod state;
mod store;
mod telemetry;

use crate::config::{Config, SinkKind, StoreBackend};
use crate::db::Database;
use crate::notify::{DeliverySink, DiscordSink, LogSink};
use crate::probe::HttpProbe;
use crate::scheduler::{Scheduler, SchedulerSettings};
use crate::store::{ChannelStore, MemoryStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "livewatch.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), config_path);
    }

    info!(
        path = %config_path,
        backend = ?config.database.backend,
        channels = config.channels.len(),
        "Starting livewatchd"
    );

    // Keep the concrete database around so it can be closed on shutdown.
    let (store, db): (Arc<dyn ChannelStore>, Option<Database>) = match config.database.backend {
        StoreBackend::Sqlite => {
            let db = Database::new(&config.database.path).await?;
            store::bootstrap::sync_channels(&db, &config.channels).await?;
            (Arc::new(db.clone()), Some(db))
        }
        StoreBackend::Memory => {
            warn!("Using in-memory store; live state will not survive restarts");
            let memory = MemoryStore::new();
            store::bootstrap::sync_channels(&memory, &config.channels).await?;
            (Arc::new(memory), None)
        }
    };

    let metrics_port = config.metrics.port.unwrap_or(0);
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        tokio::spawn(async move {
            http::run_http_server(metrics_port).await;
        });
    }

    let probe_timeout = Duration::from_secs(config.poll.probe_timeout_secs);
    let delivery_timeout = Duration::from_secs(config.poll.delivery_timeout_secs);

    let probe = Arc::new(HttpProbe::new(&config.probe, probe_timeout));
    let sink: Arc<dyn DeliverySink> = match config.delivery.kind {
        SinkKind::Discord => Arc::new(DiscordSink::new(&config.delivery, delivery_timeout)?),
        SinkKind::Log => Arc::new(LogSink),
    };

    let scheduler = Scheduler::new(
        store,
        probe,
        sink,
        SchedulerSettings {
            platforms: config.poll.platforms.clone(),
            concurrency: config.poll.concurrency,
            probe_timeout,
            delivery_timeout,
        },
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for shutdown signal");
            // Keep the sender alive so the poller is not stopped by its drop.
            std::future::pending::<()>().await;
        }
        info!("Shutdown signal received");
        let _ = shutdown_tx.send(true);
    });

    scheduler
        .run(Duration::from_secs(config.poll.interval_secs), shutdown_rx)
        .await;

    if let Some(db) = db {
        db.close().await;
    }
    info!("livewatchd stopped");

    Ok(())
}
