//! Raw asset downloads.
//!
//! [`AssetSource`] is the seam between the asset mirror and the network. The
//! mirror only needs "GET this URL, give me the status and bytes";
//! [`HttpAssetSource`] does that over [`reqwest`], tests substitute fakes.

use std::future::Future;

/// A completed HTTP exchange for one candidate URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl AssetResponse {
    /// A response is usable when the status is 2xx and the body is non-empty.
    pub fn is_usable(&self) -> bool {
        (200..300).contains(&self.status) && !self.body.is_empty()
    }
}

/// A candidate URL that could not be fetched at all.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AssetFetchError {
    /// Status code if the response head arrived before the failure.
    pub status: Option<u16>,
    pub message: String,
}

impl AssetFetchError {
    pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<reqwest::Error> for AssetFetchError {
    fn from(err: reqwest::Error) -> Self {
        Self {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Something that can fetch the bytes behind an asset URL.
pub trait AssetSource: Send + Sync + 'static {
    /// Fetch `url`. Non-2xx statuses are returned as responses, not errors.
    fn get(&self, url: &str) -> impl Future<Output = Result<AssetResponse, AssetFetchError>> + Send;
}

/// [`AssetSource`] backed by a shared [`reqwest::Client`].
#[derive(Clone)]
pub struct HttpAssetSource {
    client: reqwest::Client,
}

impl HttpAssetSource {
    /// Create a source using the default timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(crate::build_client(crate::DEFAULT_TIMEOUT)?))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl AssetSource for HttpAssetSource {
    async fn get(&self, url: &str) -> Result<AssetResponse, AssetFetchError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| AssetFetchError::new(Some(status), e.to_string()))?;
        Ok(AssetResponse {
            status,
            body: body.to_vec(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
