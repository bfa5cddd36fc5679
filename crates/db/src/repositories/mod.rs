//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument.
//!
//! Card and event batches run statement by statement on one pooled connection
//! without a transaction: a failing statement leaves the earlier rows of the
//! batch committed. The gacha graph is written in a single transaction.

pub mod card_repo;
pub mod event_repo;
pub mod gacha_repo;

pub use card_repo::CardRepo;
pub use event_repo::EventRepo;
pub use gacha_repo::{GachaRepo, GachaSyncCounts};
