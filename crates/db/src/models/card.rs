//! Card entity model.

use pjsk_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pjsk_cards` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Card {
    pub id: DbId,
    pub character_id: DbId,
    pub attr: String,
    pub prefix: String,
    pub rarity: String,
    pub assetbundle_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for inserting or updating a card.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertCard {
    pub id: DbId,
    pub character_id: DbId,
    pub attr: String,
    pub prefix: String,
    pub rarity: String,
    pub assetbundle_name: String,
}
