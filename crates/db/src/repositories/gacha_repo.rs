//! Repository for the `pjsk_gachas` and `pjsk_gacha_pickups` tables.

use pjsk_core::types::DbId;
use sqlx::PgPool;

use crate::models::gacha::{
    Gacha, GachaPickup, GachaWithPickups, UpsertGacha, UpsertGachaPickup,
};

/// Column list for `pjsk_gachas` queries.
const COLUMNS: &str = "id, gacha_type, name, seq, assetbundle_name, start_at, end_at, \
    pool_category, rarity4_rate, birthday_rate, created_at, updated_at";

/// Column list for `pjsk_gacha_pickups` queries.
const PICKUP_COLUMNS: &str = "gacha_id, card_id, character_id, created_at, updated_at";

/// Rows written by [`GachaRepo::sync_all`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GachaSyncCounts {
    pub gachas: u64,
    pub pickups: u64,
}

/// Provides the transactional gacha + pickup sync and lookups.
pub struct GachaRepo;

impl GachaRepo {
    /// Upsert every gacha and replace its pickup edge set, all in one
    /// transaction.
    ///
    /// Per gacha: upsert the row, delete its existing pickups, insert the
    /// current ones. Any failing statement rolls back the whole batch.
    pub async fn sync_all(
        pool: &PgPool,
        gachas: &[GachaWithPickups],
    ) -> Result<GachaSyncCounts, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut counts = GachaSyncCounts::default();

        for entry in gachas {
            Self::upsert_inner(&mut tx, &entry.gacha).await?;
            counts.gachas += 1;
            counts.pickups +=
                Self::replace_pickups_inner(&mut tx, entry.gacha.id, &entry.pickups).await?;
        }

        tx.commit().await?;
        Ok(counts)
    }

    /// Find a gacha by its upstream id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Gacha>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pjsk_gachas WHERE id = $1");
        sqlx::query_as::<_, Gacha>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the pickups of a gacha ordered by card id.
    pub async fn list_pickups(
        pool: &PgPool,
        gacha_id: DbId,
    ) -> Result<Vec<GachaPickup>, sqlx::Error> {
        let query = format!(
            "SELECT {PICKUP_COLUMNS} FROM pjsk_gacha_pickups \
             WHERE gacha_id = $1 ORDER BY card_id"
        );
        sqlx::query_as::<_, GachaPickup>(&query)
            .bind(gacha_id)
            .fetch_all(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM pjsk_gachas")
            .fetch_one(pool)
            .await
    }

    async fn upsert_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        gacha: &UpsertGacha,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO pjsk_gachas \
                (id, gacha_type, name, seq, assetbundle_name, start_at, end_at, \
                 pool_category, rarity4_rate, birthday_rate, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, now()) \
             ON CONFLICT (id) DO UPDATE SET \
                gacha_type = EXCLUDED.gacha_type, \
                name = EXCLUDED.name, \
                seq = EXCLUDED.seq, \
                assetbundle_name = EXCLUDED.assetbundle_name, \
                start_at = EXCLUDED.start_at, \
                end_at = EXCLUDED.end_at, \
                pool_category = EXCLUDED.pool_category, \
                rarity4_rate = EXCLUDED.rarity4_rate, \
                birthday_rate = EXCLUDED.birthday_rate, \
                updated_at = now()",
        )
        .bind(gacha.id)
        .bind(&gacha.gacha_type)
        .bind(&gacha.name)
        .bind(gacha.seq)
        .bind(&gacha.assetbundle_name)
        .bind(gacha.start_at)
        .bind(gacha.end_at)
        .bind(&gacha.pool_category)
        .bind(gacha.rarity4_rate)
        .bind(gacha.birthday_rate)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    async fn replace_pickups_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        gacha_id: DbId,
        pickups: &[UpsertGachaPickup],
    ) -> Result<u64, sqlx::Error> {
        sqlx::query("DELETE FROM pjsk_gacha_pickups WHERE gacha_id = $1")
            .bind(gacha_id)
            .execute(&mut **tx)
            .await?;

        let mut written = 0;
        for pickup in pickups {
            written += sqlx::query(
                "INSERT INTO pjsk_gacha_pickups (gacha_id, card_id, character_id, updated_at) \
                 VALUES ($1, $2, $3, now()) \
                 ON CONFLICT (gacha_id, card_id) DO UPDATE SET \
                    character_id = EXCLUDED.character_id, \
                    updated_at = now()",
            )
            .bind(gacha_id)
            .bind(pickup.card_id)
            .bind(pickup.character_id)
            .execute(&mut **tx)
            .await?
            .rows_affected();
        }
        Ok(written)
    }
}
