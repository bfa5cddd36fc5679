//! Event entity model.

use pjsk_core::types::{DbId, EpochSecs, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `pjsk_events` table. All `*_at` columns are epoch seconds,
/// `0` when absent.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub event_type: String,
    pub name: String,
    pub assetbundle_name: String,
    pub bgm_assetbundle_name: String,
    pub event_only_component_display_start_at: EpochSecs,
    pub start_at: EpochSecs,
    pub aggregate_at: EpochSecs,
    pub ranking_announce_at: EpochSecs,
    pub distribution_start_at: EpochSecs,
    pub event_only_component_display_end_at: EpochSecs,
    pub closed_at: EpochSecs,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for inserting or updating an event. Timestamps are already in seconds.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertEvent {
    pub id: DbId,
    pub event_type: String,
    pub name: String,
    pub assetbundle_name: String,
    pub bgm_assetbundle_name: String,
    pub event_only_component_display_start_at: EpochSecs,
    pub start_at: EpochSecs,
    pub aggregate_at: EpochSecs,
    pub ranking_announce_at: EpochSecs,
    pub distribution_start_at: EpochSecs,
    pub event_only_component_display_end_at: EpochSecs,
    pub closed_at: EpochSecs,
}
