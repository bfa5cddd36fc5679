//! Master-data sync pipeline.
//!
//! One run is strictly ordered: fetch the three master collections, upsert
//! them into PostgreSQL, then mirror referenced images into the local tree.
//!
//! - [`fetch`] fetches and decodes the collections.
//! - [`upsert`] reconciles them into the store.
//! - [`asset_mirror`] runs a bounded worker pool that downloads missing assets.
//! - [`sync`] ties the phases together under one cancellation token.

pub mod asset_mirror;
pub mod error;
pub mod fetch;
pub mod sync;
pub mod upsert;

pub use error::SyncError;
