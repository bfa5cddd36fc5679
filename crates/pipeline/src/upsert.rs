//! Reconciles fetched master data into the store.

use pjsk_core::character_lookup::CharacterLookup;
use pjsk_core::gacha_category::classify_gacha;
use pjsk_core::master::{self, ms_to_secs};
use pjsk_db::models::card::UpsertCard;
use pjsk_db::models::event::UpsertEvent;
use pjsk_db::models::gacha::{GachaWithPickups, UpsertGacha, UpsertGachaPickup};
use pjsk_db::repositories::{CardRepo, EventRepo, GachaRepo};
use pjsk_db::DbPool;

use crate::fetch::MasterData;

/// Rows written by one upsert phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertSummary {
    pub cards: u64,
    pub gachas: u64,
    pub pickups: u64,
    pub events: u64,
}

/// What the upsert phase hands back to the run.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub summary: UpsertSummary,
    /// Card-to-character map built from this run's card batch.
    pub lookup: CharacterLookup,
}

/// Writes cards, then gachas with their pickups, then events.
pub struct Upserter {
    pool: DbPool,
}

impl Upserter {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Run all three writes. The first failing batch aborts the rest.
    pub async fn run(&self, data: &MasterData) -> Result<UpsertOutcome, sqlx::Error> {
        let lookup = CharacterLookup::from_cards(&data.cards);

        let cards: Vec<UpsertCard> = data.cards.iter().map(card_input).collect();
        let card_rows = CardRepo::upsert_batch(&self.pool, &cards).await?;
        tracing::debug!(rows = card_rows, "Cards upserted");

        let gachas: Vec<GachaWithPickups> = data
            .gachas
            .iter()
            .map(|gacha| gacha_input(gacha, &lookup))
            .collect();
        let gacha_counts = GachaRepo::sync_all(&self.pool, &gachas).await?;
        tracing::debug!(
            gachas = gacha_counts.gachas,
            pickups = gacha_counts.pickups,
            "Gachas synced",
        );

        let events: Vec<UpsertEvent> = data.events.iter().map(event_input).collect();
        let event_rows = EventRepo::upsert_batch(&self.pool, &events).await?;
        tracing::debug!(rows = event_rows, "Events upserted");

        Ok(UpsertOutcome {
            summary: UpsertSummary {
                cards: card_rows,
                gachas: gacha_counts.gachas,
                pickups: gacha_counts.pickups,
                events: event_rows,
            },
            lookup,
        })
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

pub fn card_input(card: &master::Card) -> UpsertCard {
    UpsertCard {
        id: card.id,
        character_id: card.character_id,
        attr: card.attr.clone(),
        prefix: card.prefix.clone(),
        rarity: card.card_rarity_type.clone(),
        assetbundle_name: card.assetbundle_name.clone(),
    }
}

/// Build the gacha row and its pickup set. Pickup characters come from
/// `lookup`; cards outside the batch get `None`.
pub fn gacha_input(gacha: &master::Gacha, lookup: &CharacterLookup) -> GachaWithPickups {
    let class = classify_gacha(gacha);
    let pickups = gacha
        .gacha_pickups
        .iter()
        .map(|pickup| UpsertGachaPickup {
            card_id: pickup.card_id,
            character_id: lookup.resolve(pickup.card_id),
        })
        .collect();

    GachaWithPickups {
        gacha: UpsertGacha {
            id: gacha.id,
            gacha_type: gacha.gacha_type.clone(),
            name: gacha.name.clone(),
            seq: gacha.seq,
            assetbundle_name: gacha.assetbundle_name.clone(),
            start_at: ms_to_secs(gacha.start_at),
            end_at: ms_to_secs(gacha.end_at),
            pool_category: class.category.as_str().to_string(),
            rarity4_rate: class.rarity4_rate,
            birthday_rate: class.birthday_rate,
        },
        pickups,
    }
}

pub fn event_input(event: &master::Event) -> UpsertEvent {
    UpsertEvent {
        id: event.id,
        event_type: event.event_type.clone(),
        name: event.name.clone(),
        assetbundle_name: event.assetbundle_name.clone(),
        bgm_assetbundle_name: event.bgm_assetbundle_name.clone(),
        event_only_component_display_start_at: ms_to_secs(
            event.event_only_component_display_start_at,
        ),
        start_at: ms_to_secs(event.start_at),
        aggregate_at: ms_to_secs(event.aggregate_at),
        ranking_announce_at: ms_to_secs(event.ranking_announce_at),
        distribution_start_at: ms_to_secs(event.distribution_start_at),
        event_only_component_display_end_at: ms_to_secs(
            event.event_only_component_display_end_at,
        ),
        closed_at: ms_to_secs(event.closed_at),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
