//! Master-data JSON client.
//!
//! Wraps the three master collections (`cards.json`, `gachas.json`,
//! `events.json`) using [`reqwest`]. Any transport failure, non-2xx status or
//! decode error is returned to the caller; there are no retries.

use serde::de::DeserializeOwned;

/// At most this many bytes of an error response body are kept.
const ERROR_BODY_LIMIT: usize = 2048;

/// Errors from the master-data fetch layer.
#[derive(Debug, thiserror::Error)]
pub enum MasterDataError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The source returned a non-2xx status code.
    #[error("fetch {url}: status={status} body={body}")]
    Status {
        url: String,
        status: u16,
        /// Truncated response body for debugging.
        body: String,
    },

    /// The body was not a JSON array of the expected records.
    #[error("decode {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// HTTP client for the master-data collections.
#[derive(Clone)]
pub struct MasterDataApi {
    client: reqwest::Client,
}

impl MasterDataApi {
    /// Create a client using the default timeout.
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(crate::build_client(crate::DEFAULT_TIMEOUT)?))
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Fetch `url` and decode it as a JSON array of `T`.
    pub async fn fetch_collection<T: DeserializeOwned>(
        &self,
        url: &str,
    ) -> Result<Vec<T>, MasterDataError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(MasterDataError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body, ERROR_BODY_LIMIT).to_string(),
            });
        }

        let bytes = response.bytes().await?;
        let items = decode_collection(url, &bytes)?;
        tracing::debug!(url, count = items.len(), "Fetched master collection");
        Ok(items)
    }
}

/// Decode a JSON array body into records.
pub fn decode_collection<T: DeserializeOwned>(
    url: &str,
    body: &[u8],
) -> Result<Vec<T>, MasterDataError> {
    serde_json::from_slice(body).map_err(|source| MasterDataError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Cut `body` to at most `limit` bytes on a char boundary.
fn truncate_body(body: &str, limit: usize) -> &str {
    if body.len() <= limit {
        return body;
    }
    let mut end = limit;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
