//! Row models and write inputs for the `pjsk_*` tables.

pub mod card;
pub mod event;
pub mod gacha;
