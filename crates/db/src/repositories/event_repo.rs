//! Repository for the `pjsk_events` table.

use pjsk_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::{Event, UpsertEvent};

/// Column list for `pjsk_events` queries.
const COLUMNS: &str = "id, event_type, name, assetbundle_name, bgm_assetbundle_name, \
    event_only_component_display_start_at, start_at, aggregate_at, ranking_announce_at, \
    distribution_start_at, event_only_component_display_end_at, closed_at, \
    created_at, updated_at";

const UPSERT: &str = "INSERT INTO pjsk_events \
        (id, event_type, name, assetbundle_name, bgm_assetbundle_name, \
         event_only_component_display_start_at, start_at, aggregate_at, ranking_announce_at, \
         distribution_start_at, event_only_component_display_end_at, closed_at, updated_at) \
     VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, now()) \
     ON CONFLICT (id) DO UPDATE SET \
        event_type = EXCLUDED.event_type, \
        name = EXCLUDED.name, \
        assetbundle_name = EXCLUDED.assetbundle_name, \
        bgm_assetbundle_name = EXCLUDED.bgm_assetbundle_name, \
        event_only_component_display_start_at = EXCLUDED.event_only_component_display_start_at, \
        start_at = EXCLUDED.start_at, \
        aggregate_at = EXCLUDED.aggregate_at, \
        ranking_announce_at = EXCLUDED.ranking_announce_at, \
        distribution_start_at = EXCLUDED.distribution_start_at, \
        event_only_component_display_end_at = EXCLUDED.event_only_component_display_end_at, \
        closed_at = EXCLUDED.closed_at, \
        updated_at = now()";

/// Provides batch upsert and lookup for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert or update every event, keyed by `id`.
    ///
    /// Writes row by row on one pooled connection, one round trip per event,
    /// and is not transactional, same as
    /// [`CardRepo::upsert_batch`](crate::repositories::CardRepo::upsert_batch).
    pub async fn upsert_batch(pool: &PgPool, events: &[UpsertEvent]) -> Result<u64, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        let mut written = 0;
        for event in events {
            written += sqlx::query(UPSERT)
                .bind(event.id)
                .bind(&event.event_type)
                .bind(&event.name)
                .bind(&event.assetbundle_name)
                .bind(&event.bgm_assetbundle_name)
                .bind(event.event_only_component_display_start_at)
                .bind(event.start_at)
                .bind(event.aggregate_at)
                .bind(event.ranking_announce_at)
                .bind(event.distribution_start_at)
                .bind(event.event_only_component_display_end_at)
                .bind(event.closed_at)
                .execute(&mut *conn)
                .await?
                .rows_affected();
        }
        Ok(written)
    }

    /// Find an event by its upstream id.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM pjsk_events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM pjsk_events")
            .fetch_one(pool)
            .await
    }
}
