//! Repository for the `pjsk_cards` table.

use pjsk_core::types::DbId;
use sqlx::PgPool;

use crate::models::card::{Card, UpsertCard};

/// Column list for `pjsk_cards` queries.
const COLUMNS: &str =
    "id, character_id, attr, prefix, rarity, assetbundle_name, created_at, updated_at";

const UPSERT: &str = "INSERT INTO pjsk_cards \
        (id, character_id, attr, prefix, rarity, assetbundle_name, updated_at) \
     VALUES ($1, $2, $3, $4, $5, $6, now()) \
     ON CONFLICT (id) DO UPDATE SET \
        character_id = EXCLUDED.character_id, \
        attr = EXCLUDED.attr, \
        prefix = EXCLUDED.prefix, \
        rarity = EXCLUDED.rarity, \
        assetbundle_name = EXCLUDED.assetbundle_name, \
        updated_at = now()";

/// Provides batch upsert and lookup for cards.
pub struct CardRepo;

impl CardRepo {
    /// Insert or update every card, keyed by `id`.
    ///
    /// Writes row by row on one pooled connection, one round trip per card;
    /// statements are not pipelined. Not transactional: on error, cards
    /// written before the failing one remain. Returns the number of rows
    /// written.
    pub async fn upsert_batch(pool: &PgPool, cards: &[UpsertCard]) -> Result<u64, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let mut written = 0;
        for card in cards {
            written += sqlx::query(UPSERT)
                .bind(card.id)
                .bind(card.character_id)
                .bind(&card.attr)
                .bind(&card.prefix)
                .bind(&card.rarity)
                .bind(&card.assetbundle_name)
                .execute(&mut *conn)
                .await?
                .rows_affected();
        }
        Ok(written)
    }

    /// Find a card by its upstream id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Card>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pjsk_cards WHERE id = $1");
        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM pjsk_cards")
            .fetch_one(pool)
            .await
    }
}
