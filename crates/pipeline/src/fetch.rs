//! Master collection fetch phase.

use pjsk_core::master::{Card, Event, Gacha};
use pjsk_sekai::api::MasterDataApi;

use crate::error::SyncError;

/// Source URLs of the three master collections.
#[derive(Debug, Clone)]
pub struct MasterSources {
    pub cards_url: String,
    pub gachas_url: String,
    pub events_url: String,
}

/// The three collections of one run, held in memory for every later phase.
#[derive(Debug, Clone, Default)]
pub struct MasterData {
    pub cards: Vec<Card>,
    pub gachas: Vec<Gacha>,
    pub events: Vec<Event>,
}

/// Fetch cards, gachas and events, in that order.
///
/// The first failure aborts the phase; nothing has been written yet.
pub async fn fetch_master_data(
    api: &MasterDataApi,
    sources: &MasterSources,
) -> Result<MasterData, SyncError> {
    let cards = api
        .fetch_collection::<Card>(&sources.cards_url)
        .await
        .map_err(|source| SyncError::Fetch {
            collection: "cards",
            source,
        })?;
    let gachas = api
        .fetch_collection::<Gacha>(&sources.gachas_url)
        .await
        .map_err(|source| SyncError::Fetch {
            collection: "gachas",
            source,
        })?;
    let events = api
        .fetch_collection::<Event>(&sources.events_url)
        .await
        .map_err(|source| SyncError::Fetch {
            collection: "events",
            source,
        })?;

    tracing::info!(
        cards = cards.len(),
        gachas = gachas.len(),
        events = events.len(),
        "Fetched master data",
    );

    Ok(MasterData {
        cards,
        gachas,
        events,
    })
}
