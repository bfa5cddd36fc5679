//! HTTP clients for the Project SEKAI master database and asset mirrors.
//!
//! - [`api::MasterDataApi`] fetches and decodes the JSON master collections.
//! - [`assets::HttpAssetSource`] downloads raw asset bytes and implements the
//!   [`assets::AssetSource`] seam used by the asset mirror.

use std::time::Duration;

pub mod api;
pub mod assets;

/// `User-Agent` sent with every request.
pub const USER_AGENT: &str = "pjsk-sync-action";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Build a [`reqwest::Client`] with the shared user agent and `timeout`.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}
