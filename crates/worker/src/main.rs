//! `pjsk-sync` -- one-shot Project SEKAI master-data sync.
//!
//! Fetches cards, gachas and events, upserts them into PostgreSQL and
//! mirrors the referenced images into a local tree. Configuration comes from
//! the environment (see [`SyncConfig::from_env`]); a `.env` file is honoured.
//!
//! Exits with status 1 on any fatal error.

use std::sync::Arc;

use anyhow::Context;
use pjsk_sekai::api::MasterDataApi;
use pjsk_sekai::assets::HttpAssetSource;
use pjsk_worker::config::SyncConfig;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "pjsk_worker=info,pjsk_pipeline=info,pjsk_sekai=info,pjsk_db=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_cancel.cancel();
    });

    if let Err(e) = run(&cancel).await {
        tracing::error!(error = %format!("{e:#}"), "Sync failed");
        std::process::exit(1);
    }
}

async fn run(cancel: &CancellationToken) -> anyhow::Result<()> {
    let config = SyncConfig::from_env().context("config")?;
    let settings = config.sync_settings().context("config")?;

    tracing::info!(
        download_assets = config.download_assets,
        image_repo_dir = %config.image_repo_dir.display(),
        max_concurrency = config.max_concurrency,
        "Starting pjsk-sync",
    );

    let pool = pjsk_db::create_pool(&config.connection_string(), config.db_max_connections)
        .await
        .context("db open")?;
    pjsk_db::health_check(&pool).await.context("db ping")?;
    tracing::info!("Database connection established");

    pjsk_db::run_migrations(&pool).await.context("db migrate")?;
    pjsk_db::ensure_trigram_indexes(&pool).await;
    tracing::info!("Database migrations applied");

    let client = pjsk_sekai::build_client(config.http_timeout).context("http client")?;
    let api = MasterDataApi::with_client(client.clone());
    let assets = Arc::new(HttpAssetSource::with_client(client));

    let report = pjsk_pipeline::sync::run(&pool, &api, assets, &settings, cancel)
        .await
        .context("sync run")?;

    tracing::info!(
        cards = report.upsert.cards,
        gachas = report.upsert.gachas,
        events = report.upsert.events,
        assets_saved = report.assets.map(|a| a.saved).unwrap_or(0),
        "Sync complete",
    );

    pool.close().await;
    Ok(())
}

/// Wait for SIGINT (Ctrl-C) or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), cancelling sync");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, cancelling sync");
        }
    }
}
