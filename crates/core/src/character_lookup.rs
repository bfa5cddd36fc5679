//! `card_id -> character_id` resolution for gacha pickups.

use std::collections::HashMap;

use crate::master::Card;
use crate::types::DbId;

/// Maps card ids to character ids for one sync run.
///
/// Built from the fetched card collection and handed explicitly to the pickup
/// writer. Unknown cards and a character id of `0` resolve to `None`.
#[derive(Debug, Clone, Default)]
pub struct CharacterLookup {
    by_card: HashMap<DbId, DbId>,
}

impl CharacterLookup {
    /// Build the lookup from a card collection. Later duplicates win.
    pub fn from_cards(cards: &[Card]) -> Self {
        let mut by_card = HashMap::with_capacity(cards.len());
        for card in cards {
            by_card.insert(card.id, card.character_id);
        }
        Self { by_card }
    }

    /// Character id for `card_id`, or `None` when unknown.
    pub fn resolve(&self, card_id: DbId) -> Option<DbId> {
        self.by_card.get(&card_id).copied().filter(|&id| id != 0)
    }

    pub fn len(&self) -> usize {
        self.by_card.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_card.is_empty()
    }
}
