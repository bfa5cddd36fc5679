//! Domain types and pure logic for the Project SEKAI master-data sync.
//!
//! Nothing in this crate performs I/O. The HTTP, database and filesystem
//! layers live in `pjsk-sekai`, `pjsk-db` and `pjsk-pipeline`.

pub mod assets;
pub mod character_lookup;
pub mod error;
pub mod gacha_category;
pub mod master;
pub mod types;
