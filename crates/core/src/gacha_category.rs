//! Gacha pool classification.
//!
//! Upstream marks festival and birthday banners inconsistently, sometimes in
//! the free-text `gachaType` and sometimes only through elevated drop rates.
//! [`classify_gacha`] checks the type string first and falls back to the
//! rarity rates.

use crate::master::{Gacha, RARITY_4, RARITY_BIRTHDAY};

/// Four-star rate (percent) at or above which a banner counts as a festival.
pub const FES_RARITY4_THRESHOLD: f32 = 6.0;

/// Derived marketing category of a gacha banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolCategory {
    Birthday,
    Fes,
    Normal,
    Other,
}

impl PoolCategory {
    /// Value stored in `pjsk_gachas.pool_category`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Birthday => "birthday",
            Self::Fes => "fes",
            Self::Normal => "normal",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for PoolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`classify_gacha`].
///
/// The rates are only reported when classification reached the rate scan;
/// a type-string match leaves both unset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GachaClassification {
    pub category: PoolCategory,
    pub rarity4_rate: Option<f32>,
    pub birthday_rate: Option<f32>,
}

impl GachaClassification {
    fn without_rates(category: PoolCategory) -> Self {
        Self {
            category,
            rarity4_rate: None,
            birthday_rate: None,
        }
    }
}

/// Classify a gacha into a [`PoolCategory`]. First match wins:
///
/// 1. type contains `birthday` (any case) -> `Birthday`
/// 2. type contains `fes` or `festival` (any case) -> `Fes`
/// 3. birthday rate `> 0` -> `Birthday`
/// 4. four-star rate `>= 6.0` -> `Fes`
/// 5. four-star rate `> 0` -> `Normal`
/// 6. otherwise `Other`
pub fn classify_gacha(gacha: &Gacha) -> GachaClassification {
    let lower_type = gacha.gacha_type.to_lowercase();
    if lower_type.contains("birthday") {
        return GachaClassification::without_rates(PoolCategory::Birthday);
    }
    if lower_type.contains("fes") || lower_type.contains("festival") {
        return GachaClassification::without_rates(PoolCategory::Fes);
    }

    let mut rarity4_rate = None;
    let mut birthday_rate = None;
    for rate in &gacha.gacha_card_rarity_rates {
        match rate.card_rarity_type.as_str() {
            RARITY_4 => rarity4_rate = Some(rate.rate),
            RARITY_BIRTHDAY => birthday_rate = Some(rate.rate),
            _ => {}
        }
    }

    let category = match (birthday_rate, rarity4_rate) {
        (Some(b), _) if b > 0.0 => PoolCategory::Birthday,
        (_, Some(r4)) if r4 >= FES_RARITY4_THRESHOLD => PoolCategory::Fes,
        (_, Some(r4)) if r4 > 0.0 => PoolCategory::Normal,
        _ => PoolCategory::Other,
    };

    GachaClassification {
        category,
        rarity4_rate,
        birthday_rate,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
