//! Upstream master-data records (`cards.json`, `gachas.json`, `events.json`).
//!
//! Field names follow the upstream JSON exactly. Missing or `null` scalars
//! decode to their zero value and missing or `null` arrays to empty, so a
//! sparse upstream record never fails the whole collection.

use serde::{Deserialize, Deserializer};

use crate::error::CoreError;
use crate::types::{DbId, EpochSecs};

// ---------------------------------------------------------------------------
// Rarity constants
// ---------------------------------------------------------------------------

/// One-star card rarity.
pub const RARITY_1: &str = "rarity_1";
/// Three-star card rarity.
pub const RARITY_3: &str = "rarity_3";
/// Four-star card rarity.
pub const RARITY_4: &str = "rarity_4";
/// Birthday card rarity.
pub const RARITY_BIRTHDAY: &str = "rarity_birthday";

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Decode an explicit `null` as `T::default()`. Pair with `#[serde(default)]`
/// so an absent key behaves the same.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// A card from `cards.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: DbId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub character_id: DbId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub card_rarity_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attr: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub prefix: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assetbundle_name: String,
}

impl Card {
    /// Whether the card has a trained (after-training) illustration.
    pub fn has_after_training(&self) -> bool {
        self.card_rarity_type == RARITY_3 || self.card_rarity_type == RARITY_4
    }
}

/// Drop rate for one rarity tier of a gacha.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GachaCardRarityRate {
    #[serde(default, deserialize_with = "null_as_default")]
    pub card_rarity_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub lottery_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rate: f32,
}

/// A featured card of a gacha.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GachaPickup {
    #[serde(default, deserialize_with = "null_as_default")]
    pub gacha_id: DbId,
    pub card_id: DbId,
}

/// A gacha banner from `gachas.json`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Gacha {
    pub id: DbId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gacha_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub seq: i32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assetbundle_name: String,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_at: i64,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_at: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gacha_card_rarity_rates: Vec<GachaCardRarityRate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gacha_pickups: Vec<GachaPickup>,
}

/// An event from `events.json`. All `*_at` fields are epoch milliseconds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: DbId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assetbundle_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bgm_assetbundle_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_only_component_display_start_at: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_at: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub aggregate_at: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ranking_announce_at: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub distribution_start_at: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub event_only_component_display_end_at: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub closed_at: i64,
}

// ---------------------------------------------------------------------------
// Timestamp normalization
// ---------------------------------------------------------------------------

/// Convert an upstream millisecond timestamp to seconds.
///
/// Zero and negative inputs map to the `0` sentinel. Positive values are
/// truncated, never rounded.
pub fn ms_to_secs(ms: i64) -> EpochSecs {
    if ms <= 0 {
        0
    } else {
        ms / 1000
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate that a master-data source URL is non-empty and starts with `http`.
pub fn validate_source_url(url: &str) -> Result<(), CoreError> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Source URL must not be empty".to_string(),
        ));
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(CoreError::Validation(format!(
            "Source URL must start with http:// or https://, got: '{trimmed}'"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
