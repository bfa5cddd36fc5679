//! Integration tests for the upsert phase against a real database.

use pjsk_core::master::{Card, Event, Gacha, GachaCardRarityRate, GachaPickup};
use pjsk_db::repositories::{CardRepo, EventRepo, GachaRepo};
use pjsk_pipeline::fetch::MasterData;
use pjsk_pipeline::upsert::{UpsertSummary, Upserter};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn card(id: i64, character_id: i64, rarity: &str) -> Card {
    Card {
        id,
        character_id,
        card_rarity_type: rarity.to_string(),
        attr: "pure".to_string(),
        prefix: format!("Card {id}"),
        assetbundle_name: format!("res{id:03}_no001"),
    }
}

fn gacha(id: i64, gacha_type: &str, pickups: &[i64]) -> Gacha {
    Gacha {
        id,
        gacha_type: gacha_type.to_string(),
        name: format!("Gacha {id}"),
        seq: 1,
        assetbundle_name: format!("ab_gacha_{id}"),
        start_at: 1_650_000_000_000,
        end_at: 1_650_600_000_000,
        gacha_card_rarity_rates: vec![GachaCardRarityRate {
            card_rarity_type: "rarity_4".to_string(),
            lottery_type: "normal".to_string(),
            rate: 6.0,
        }],
        gacha_pickups: pickups
            .iter()
            .map(|&card_id| GachaPickup {
                gacha_id: id,
                card_id,
            })
            .collect(),
    }
}

fn event(id: i64) -> Event {
    Event {
        id,
        event_type: "cheerful_carnival".to_string(),
        name: format!("Event {id}"),
        assetbundle_name: format!("event_{id}"),
        bgm_assetbundle_name: String::new(),
        event_only_component_display_start_at: 0,
        start_at: 1_650_000_000_000,
        aggregate_at: 1_650_500_000_000,
        ranking_announce_at: 1_650_500_100_000,
        distribution_start_at: 1_650_500_200_000,
        event_only_component_display_end_at: 0,
        closed_at: 1_650_600_000_000,
    }
}

fn master_data() -> MasterData {
    MasterData {
        cards: vec![card(1, 21, "rarity_4"), card(2, 5, "rarity_1")],
        gachas: vec![gacha(10, "ceil", &[1, 2])],
        events: vec![event(100)],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_upsert_writes_everything(pool: PgPool) {
    let outcome = Upserter::new(pool.clone()).run(&master_data()).await.unwrap();

    assert_eq!(
        outcome.summary,
        UpsertSummary {
            cards: 2,
            gachas: 1,
            pickups: 2,
            events: 1,
        }
    );
    assert_eq!(outcome.lookup.resolve(1), Some(21));

    let stored = GachaRepo::find_by_id(&pool, 10).await.unwrap().unwrap();
    assert_eq!(stored.pool_category, "fes");
    assert_eq!(stored.start_at, 1_650_000_000);

    let stored_event = EventRepo::find_by_id(&pool, 100).await.unwrap().unwrap();
    assert_eq!(stored_event.closed_at, 1_650_600_000);
    assert_eq!(stored_event.event_only_component_display_start_at, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_second_identical_run_changes_nothing(pool: PgPool) {
    let upserter = Upserter::new(pool.clone());
    let data = master_data();

    upserter.run(&data).await.unwrap();
    let card_before = CardRepo::find_by_id(&pool, 1).await.unwrap().unwrap();
    let gacha_before = GachaRepo::find_by_id(&pool, 10).await.unwrap().unwrap();

    upserter.run(&data).await.unwrap();
    let card_after = CardRepo::find_by_id(&pool, 1).await.unwrap().unwrap();
    let gacha_after = GachaRepo::find_by_id(&pool, 10).await.unwrap().unwrap();

    assert_eq!(CardRepo::count(&pool).await.unwrap(), 2);
    assert_eq!(GachaRepo::count(&pool).await.unwrap(), 1);
    assert_eq!(EventRepo::count(&pool).await.unwrap(), 1);
    assert_eq!(GachaRepo::list_pickups(&pool, 10).await.unwrap().len(), 2);

    assert_eq!(card_before.character_id, card_after.character_id);
    assert_eq!(card_before.assetbundle_name, card_after.assetbundle_name);
    assert_eq!(card_before.created_at, card_after.created_at);
    assert_eq!(gacha_before.pool_category, gacha_after.pool_category);
    assert_eq!(gacha_before.rarity4_rate, gacha_after.rarity4_rate);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_dropped_pickup_is_removed(pool: PgPool) {
    let upserter = Upserter::new(pool.clone());
    let mut data = master_data();
    upserter.run(&data).await.unwrap();

    data.gachas = vec![gacha(10, "ceil", &[2])];
    let outcome = upserter.run(&data).await.unwrap();
    assert_eq!(outcome.summary.pickups, 1);

    let pickups = GachaRepo::list_pickups(&pool, 10).await.unwrap();
    assert_eq!(pickups.len(), 1);
    assert_eq!(pickups[0].card_id, 2);
    assert_eq!(pickups[0].character_id, Some(5));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_birthday_type_classified(pool: PgPool) {
    let mut data = master_data();
    data.gachas = vec![gacha(11, "Birthday", &[1])];

    Upserter::new(pool.clone()).run(&data).await.unwrap();

    let stored = GachaRepo::find_by_id(&pool, 11).await.unwrap().unwrap();
    assert_eq!(stored.pool_category, "birthday");
    assert_eq!(stored.rarity4_rate, None);
    assert_eq!(stored.birthday_rate, None);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_pickup_for_unknown_card_aborts_gacha_phase(pool: PgPool) {
    let mut data = master_data();
    data.gachas = vec![gacha(12, "ceil", &[1, 999])];

    let result = Upserter::new(pool.clone()).run(&data).await;

    assert!(result.is_err());
    // Cards were written before the gacha transaction failed.
    assert_eq!(CardRepo::count(&pool).await.unwrap(), 2);
    assert!(GachaRepo::find_by_id(&pool, 12).await.unwrap().is_none());
    assert_eq!(EventRepo::count(&pool).await.unwrap(), 0);
}
