use std::path::PathBuf;
use std::time::Duration;

use pjsk_core::assets::{AssetBases, DEFAULT_ASSET_BASE_URL};
use pjsk_core::error::CoreError;
use pjsk_core::master::validate_source_url;
use pjsk_pipeline::asset_mirror::DEFAULT_MAX_CONCURRENCY;
use pjsk_pipeline::fetch::MasterSources;
use pjsk_pipeline::sync::{MirrorSettings, SyncSettings};

pub const DEFAULT_GACHAS_URL: &str =
    "https://raw.githubusercontent.com/kotori8823/sekai-sc-master-db/master/gachas.json";
pub const DEFAULT_CARDS_URL: &str =
    "https://raw.githubusercontent.com/kotori8823/sekai-sc-master-db/master/cards.json";
pub const DEFAULT_EVENTS_URL: &str =
    "https://raw.githubusercontent.com/kotori8823/sekai-sc-master-db/master/events.json";

const DEFAULT_SSL_MODE: &str = "require";
const DEFAULT_IMAGE_REPO_DIR: &str = "image-hosting";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Configuration problems that stop the binary before any work starts.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("POSTGRES_CONNECTION_STRING (or DATABASE_URL) is required")]
    MissingConnectionString,

    #[error("IMAGE_REPO_DIR must not be empty when DOWNLOAD_ASSETS is enabled")]
    EmptyImageRoot,

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] CoreError),
}

/// Runtime configuration of one sync run.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Store DSN as given, before `sslmode` handling.
    pub database_url: String,
    pub ssl_mode: String,
    pub db_max_connections: u32,
    pub gachas_url: String,
    pub cards_url: String,
    pub events_url: String,
    pub download_assets: bool,
    pub image_repo_dir: PathBuf,
    /// Asset worker count, at least 1.
    pub max_concurrency: usize,
    pub asset_bases: AssetBases,
    pub http_timeout: Duration,
}

impl SyncConfig {
    /// Load configuration from environment variables.
    ///
    /// | Env Var                      | Default                         |
    /// |------------------------------|---------------------------------|
    /// | `POSTGRES_CONNECTION_STRING` | `DATABASE_URL`, else required   |
    /// | `PG_SSLMODE`                 | `require`                       |
    /// | `DB_MAX_CONNECTIONS`         | `5`                             |
    /// | `GACHAS_URL`                 | sekai-sc-master-db `gachas.json`|
    /// | `CARDS_URL`                  | sekai-sc-master-db `cards.json` |
    /// | `EVENTS_URL`                 | sekai-sc-master-db `events.json`|
    /// | `DOWNLOAD_ASSETS`            | `true`                          |
    /// | `IMAGE_REPO_DIR`             | `image-hosting`                 |
    /// | `MAX_CONCURRENCY`            | `6`                             |
    /// | `ASSET_BASE_URL_CN`          | `https://assets.unipjsk.com`    |
    /// | `ASSET_BASE_URL_JP`          | `https://assets.unipjsk.com`    |
    /// | `HTTP_TIMEOUT_SECS`          | `60`                            |
    ///
    /// Empty values count as unset. Values that fail to parse fall back to
    /// the default with a warning.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`SyncConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = var("POSTGRES_CONNECTION_STRING")
            .or_else(|| var("DATABASE_URL"))
            .ok_or(ConfigError::MissingConnectionString)?;

        let download_assets = match var("DOWNLOAD_ASSETS") {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "Invalid DOWNLOAD_ASSETS, using default");
                true
            }),
            None => true,
        };

        let image_repo_dir = var("IMAGE_REPO_DIR").unwrap_or_else(|| DEFAULT_IMAGE_REPO_DIR.into());

        let asset_bases = AssetBases::new(
            var("ASSET_BASE_URL_CN").unwrap_or_else(|| DEFAULT_ASSET_BASE_URL.into()),
            var("ASSET_BASE_URL_JP").unwrap_or_else(|| DEFAULT_ASSET_BASE_URL.into()),
        )?;

        let gachas_url = var("GACHAS_URL").unwrap_or_else(|| DEFAULT_GACHAS_URL.into());
        let cards_url = var("CARDS_URL").unwrap_or_else(|| DEFAULT_CARDS_URL.into());
        let events_url = var("EVENTS_URL").unwrap_or_else(|| DEFAULT_EVENTS_URL.into());
        for url in [&gachas_url, &cards_url, &events_url] {
            validate_source_url(url)?;
        }

        let max_concurrency: usize =
            parse_or_default(var("MAX_CONCURRENCY"), "MAX_CONCURRENCY", DEFAULT_MAX_CONCURRENCY);
        let http_timeout_secs: u64 = parse_or_default(
            var("HTTP_TIMEOUT_SECS"),
            "HTTP_TIMEOUT_SECS",
            DEFAULT_HTTP_TIMEOUT_SECS,
        );
        let db_max_connections: u32 = parse_or_default(
            var("DB_MAX_CONNECTIONS"),
            "DB_MAX_CONNECTIONS",
            pjsk_db::DEFAULT_MAX_CONNECTIONS,
        );

        Ok(Self {
            database_url,
            ssl_mode: var("PG_SSLMODE").unwrap_or_else(|| DEFAULT_SSL_MODE.into()),
            db_max_connections: db_max_connections.max(1),
            gachas_url,
            cards_url,
            events_url,
            download_assets,
            image_repo_dir: PathBuf::from(image_repo_dir),
            max_concurrency: max_concurrency.max(1),
            asset_bases,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }

    /// The DSN with `sslmode` applied.
    pub fn connection_string(&self) -> String {
        pjsk_db::ensure_ssl_mode(&self.database_url, &self.ssl_mode)
    }

    /// Settings for [`pjsk_pipeline::sync::run`].
    pub fn sync_settings(&self) -> Result<SyncSettings, ConfigError> {
        let mirror = if self.download_assets {
            if self.image_repo_dir.as_os_str().is_empty() {
                return Err(ConfigError::EmptyImageRoot);
            }
            Some(MirrorSettings {
                root: self.image_repo_dir.clone(),
                max_concurrency: self.max_concurrency,
                bases: self.asset_bases.clone(),
            })
        } else {
            None
        };

        Ok(SyncSettings {
            sources: MasterSources {
                cards_url: self.cards_url.clone(),
                gachas_url: self.gachas_url.clone(),
                events_url: self.events_url.clone(),
            },
            mirror,
        })
    }
}

/// Boolean spellings accepted for flags.
fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

fn parse_or_default<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    match raw {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid integer, using default");
            default
        }),
        None => default,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
