//! One full sync run: fetch, upsert, mirror.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

use pjsk_core::assets::{build_asset_jobs, AssetBases};
use pjsk_db::DbPool;
use pjsk_sekai::api::MasterDataApi;
use pjsk_sekai::assets::AssetSource;
use tokio_util::sync::CancellationToken;

use crate::asset_mirror::{AssetMirror, MirrorReport};
use crate::error::SyncError;
use crate::fetch::{fetch_master_data, MasterSources};
use crate::upsert::{UpsertSummary, Upserter};

/// Settings for the asset phase.
#[derive(Debug, Clone)]
pub struct MirrorSettings {
    pub root: PathBuf,
    pub max_concurrency: usize,
    pub bases: AssetBases,
}

/// Everything a run needs besides its connections.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub sources: MasterSources,
    /// `None` disables the asset phase.
    pub mirror: Option<MirrorSettings>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub upsert: UpsertSummary,
    pub assets: Option<MirrorReport>,
}

/// Execute a run.
///
/// Fetch and upsert race `cancel` and fail with [`SyncError::Cancelled`]. The
/// asset phase never fails; cancellation there ends it early with a partial
/// report.
pub async fn run<S: AssetSource>(
    pool: &DbPool,
    api: &MasterDataApi,
    assets: Arc<S>,
    settings: &SyncSettings,
    cancel: &CancellationToken,
) -> Result<SyncReport, SyncError> {
    let data = until_cancelled(cancel, fetch_master_data(api, &settings.sources)).await??;

    let upserter = Upserter::new(pool.clone());
    let outcome = until_cancelled(cancel, upserter.run(&data)).await??;
    let summary = outcome.summary;
    tracing::info!(
        cards = summary.cards,
        gachas = summary.gachas,
        pickups = summary.pickups,
        events = summary.events,
        characters = outcome.lookup.len(),
        "db synced",
    );

    let Some(mirror_settings) = &settings.mirror else {
        tracing::info!("Asset download disabled");
        return Ok(SyncReport {
            upsert: summary,
            assets: None,
        });
    };

    let jobs = build_asset_jobs(&mirror_settings.bases, &data.cards, &data.events, &data.gachas);
    tracing::info!(
        jobs = jobs.len(),
        root = %mirror_settings.root.display(),
        workers = mirror_settings.max_concurrency,
        "Mirroring assets",
    );

    let mirror = AssetMirror::new(
        assets,
        mirror_settings.root.clone(),
        mirror_settings.max_concurrency,
    );
    let report = mirror.run(jobs, cancel).await;
    tracing::info!(
        saved = report.saved,
        skipped = report.skipped,
        missed = report.missed,
        failed = report.failed,
        total = report.total,
        "assets synced",
    );

    if cancel.is_cancelled() {
        tracing::warn!("Asset phase interrupted");
    }

    Ok(SyncReport {
        upsert: summary,
        assets: Some(report),
    })
}

/// Await `fut` unless `cancel` fires first.
async fn until_cancelled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, SyncError> {
    tokio::select! {
        _ = cancel.cancelled() => Err(SyncError::Cancelled),
        output = fut => Ok(output),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[tokio::test]
    async fn until_cancelled_passes_output_through() {
        let cancel = CancellationToken::new();
        let out = until_cancelled(&cancel, async { 7 }).await;
        assert_matches!(out, Ok(7));
    }

    #[tokio::test]
    async fn until_cancelled_stops_pending_work() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let out = until_cancelled(&cancel, std::future::pending::<()>()).await;
        assert_matches!(out, Err(SyncError::Cancelled));
    }
}
