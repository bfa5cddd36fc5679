//! Gacha and gacha-pickup entity models.

use pjsk_core::types::{DbId, EpochSecs, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pjsk_gachas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Gacha {
    pub id: DbId,
    pub gacha_type: String,
    pub name: String,
    pub seq: i32,
    pub assetbundle_name: String,
    pub start_at: EpochSecs,
    pub end_at: EpochSecs,
    pub pool_category: String,
    pub rarity4_rate: Option<f32>,
    pub birthday_rate: Option<f32>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for inserting or updating a gacha.
///
/// `pool_category` and the two rates come from the classifier, not upstream.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertGacha {
    pub id: DbId,
    pub gacha_type: String,
    pub name: String,
    pub seq: i32,
    pub assetbundle_name: String,
    pub start_at: EpochSecs,
    pub end_at: EpochSecs,
    pub pool_category: String,
    pub rarity4_rate: Option<f32>,
    pub birthday_rate: Option<f32>,
}

/// A row from the `pjsk_gacha_pickups` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct GachaPickup {
    pub gacha_id: DbId,
    pub card_id: DbId,
    pub character_id: Option<DbId>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One pickup edge to write for a gacha.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertGachaPickup {
    pub card_id: DbId,
    /// `None` when the card was not part of the sync batch.
    pub character_id: Option<DbId>,
}

/// A gacha together with its complete pickup edge set.
#[derive(Debug, Clone, PartialEq)]
pub struct GachaWithPickups {
    pub gacha: UpsertGacha,
    pub pickups: Vec<UpsertGachaPickup>,
}
