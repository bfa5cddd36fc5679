//! `pjsk-sync` runtime support: configuration loading.

pub mod config;
