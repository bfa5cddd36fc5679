//! Asset URL templates and mirror job construction.
//!
//! Every (entity, asset slot) pair yields one [`AssetJob`]: a destination path
//! relative to the local image tree and an ordered list of candidate source
//! URLs. The destination layout is what the static host serves, so it must
//! stay stable across releases.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::master::{Card, Event, Gacha};
use crate::types::DbId;

/// Default asset host for both regions.
pub const DEFAULT_ASSET_BASE_URL: &str = "https://assets.unipjsk.com";

// ---------------------------------------------------------------------------
// Region bases
// ---------------------------------------------------------------------------

/// Base URLs of the regional asset mirrors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetBases {
    pub cn: String,
    pub jp: String,
}

impl AssetBases {
    /// Build from two base URLs, trimming any trailing slash.
    pub fn new(cn: impl Into<String>, jp: impl Into<String>) -> Result<Self, CoreError> {
        let cn = normalize_base(cn.into())?;
        let jp = normalize_base(jp.into())?;
        Ok(Self { cn, jp })
    }
}

impl Default for AssetBases {
    fn default() -> Self {
        Self {
            cn: DEFAULT_ASSET_BASE_URL.to_string(),
            jp: DEFAULT_ASSET_BASE_URL.to_string(),
        }
    }
}

fn normalize_base(base: String) -> Result<String, CoreError> {
    let trimmed = base.trim().trim_end_matches('/');
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(CoreError::Validation(format!(
            "Asset base URL must start with http:// or https://, got: '{trimmed}'"
        )));
    }
    Ok(trimmed.to_string())
}

// ---------------------------------------------------------------------------
// URL templates
// ---------------------------------------------------------------------------

pub fn card_normal_url(base: &str, assetbundle_name: &str) -> String {
    format!("{base}/startapp/thumbnail/chara/{assetbundle_name}_normal.png")
}

pub fn card_after_training_url(base: &str, assetbundle_name: &str) -> String {
    format!("{base}/startapp/thumbnail/chara/{assetbundle_name}_after_training.png")
}

pub fn event_logo_url(base: &str, assetbundle_name: &str) -> String {
    format!("{base}/ondemand/event/{assetbundle_name}/logo/logo.png")
}

pub fn event_bg_url(base: &str, assetbundle_name: &str) -> String {
    format!("{base}/ondemand/event/{assetbundle_name}/screen/bg.png")
}

pub fn gacha_banner_url(base: &str, gacha_id: DbId) -> String {
    format!("{base}/startapp/home/banner/banner_gacha{gacha_id}/banner_gacha{gacha_id}.png")
}

/// Gacha logo, used when no banner exists.
pub fn gacha_logo_url(base: &str, gacha_id: DbId) -> String {
    format!("{base}/ondemand/gacha/ab_gacha_{gacha_id}/logo/logo.png")
}

// ---------------------------------------------------------------------------
// Jobs
// ---------------------------------------------------------------------------

/// Which image of an entity a job mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetSlot {
    CardNormal,
    CardAfterTraining,
    EventLogo,
    EventBackground,
    GachaBanner,
}

/// One asset to mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetJob {
    pub slot: AssetSlot,
    /// Destination relative to the image tree root, `/`-separated.
    pub dest_rel: String,
    /// Candidate source URLs, tried in order.
    pub urls: Vec<String>,
}

impl AssetJob {
    fn new(slot: AssetSlot, dest_rel: String, urls: Vec<String>) -> Self {
        let mut urls = urls;
        urls.dedup();
        Self {
            slot,
            dest_rel,
            urls,
        }
    }
}

/// Relative destination path of an asset.
pub fn dest_path(slot: AssetSlot, id: DbId) -> String {
    match slot {
        AssetSlot::CardNormal => format!("card_thumbnails/{id}_normal.webp"),
        AssetSlot::CardAfterTraining => format!("card_thumbnails/{id}_after_training.webp"),
        AssetSlot::EventLogo => format!("sekai-events/event_{id}/logo.webp"),
        AssetSlot::EventBackground => format!("sekai-events/event_{id}/bg.webp"),
        AssetSlot::GachaBanner => format!("sekai-gachas/gacha_{id}/banner.webp"),
    }
}

/// Build the mirror job list for a sync run.
///
/// Order is cards, events, gachas. A destination appears at most once; a
/// duplicate upstream id keeps the first job.
pub fn build_asset_jobs(
    bases: &AssetBases,
    cards: &[Card],
    events: &[Event],
    gachas: &[Gacha],
) -> Vec<AssetJob> {
    let mut jobs = Vec::with_capacity(cards.len() * 2 + events.len() * 2 + gachas.len());

    for card in cards {
        jobs.push(AssetJob::new(
            AssetSlot::CardNormal,
            dest_path(AssetSlot::CardNormal, card.id),
            vec![card_normal_url(&bases.jp, &card.assetbundle_name)],
        ));
        if card.has_after_training() {
            jobs.push(AssetJob::new(
                AssetSlot::CardAfterTraining,
                dest_path(AssetSlot::CardAfterTraining, card.id),
                vec![card_after_training_url(&bases.jp, &card.assetbundle_name)],
            ));
        }
    }

    for event in events {
        jobs.push(AssetJob::new(
            AssetSlot::EventLogo,
            dest_path(AssetSlot::EventLogo, event.id),
            vec![
                event_logo_url(&bases.cn, &event.assetbundle_name),
                event_logo_url(&bases.jp, &event.assetbundle_name),
            ],
        ));
        jobs.push(AssetJob::new(
            AssetSlot::EventBackground,
            dest_path(AssetSlot::EventBackground, event.id),
            vec![
                event_bg_url(&bases.cn, &event.assetbundle_name),
                event_bg_url(&bases.jp, &event.assetbundle_name),
            ],
        ));
    }

    for gacha in gachas {
        jobs.push(AssetJob::new(
            AssetSlot::GachaBanner,
            dest_path(AssetSlot::GachaBanner, gacha.id),
            vec![
                gacha_banner_url(&bases.cn, gacha.id),
                gacha_banner_url(&bases.jp, gacha.id),
                gacha_logo_url(&bases.cn, gacha.id),
                gacha_logo_url(&bases.jp, gacha.id),
            ],
        ));
    }

    let mut seen = HashSet::with_capacity(jobs.len());
    jobs.retain(|job| seen.insert(job.dest_rel.clone()));
    jobs
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
