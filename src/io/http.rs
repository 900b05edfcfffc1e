use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use super::{ArchiveHandle, ByteRange, RangeTransport};
use crate::error::TransportError;
use anyhow::Result;

/// HTTP Range transport for remote ZIP archives.
///
/// Issues one HEAD request for size discovery and one ranged GET per
/// [`fetch`](RangeTransport::fetch). Faults are never retried; a failed
/// request is terminal for the whole session.
pub struct HttpRangeClient {
    client: Client,
    url: String,
    transferred_bytes: AtomicU64,
}

impl HttpRangeClient {
    pub fn new(url: String) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            url,
            transferred_bytes: AtomicU64::new(0),
        })
    }

    /// Total bytes of response bodies received so far.
    pub fn transferred_bytes(&self) -> u64 {
        self.transferred_bytes.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RangeTransport for HttpRangeClient {
    async fn discover(&self) -> Result<ArchiveHandle> {
        let resp = self
            .client
            .head(&self.url)
            .send()
            .await
            .map_err(TransportError::Request)?;

        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status()).into());
        }

        // The whole protocol depends on ranged retrieval; bail out early
        // if the server does not advertise it.
        let accept_ranges = resp
            .headers()
            .get("accept-ranges")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("none");
        if !accept_ranges.contains("bytes") {
            return Err(TransportError::RangeUnsupported.into());
        }

        let size: u64 = resp
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .ok_or(TransportError::MissingLength)?;
        if size == 0 {
            return Err(TransportError::EmptyResource.into());
        }

        Ok(ArchiveHandle {
            url: self.url.clone(),
            size,
        })
    }

    async fn fetch(&self, range: ByteRange) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(&self.url)
            .header("Range", range.header_value())
            .send()
            .await
            .map_err(TransportError::Request)?;

        // 206 is the usual answer; some servers reply 200 with a
        // Content-Range header instead. Anything else is a fault.
        let status = resp.status();
        let partial = status == reqwest::StatusCode::PARTIAL_CONTENT
            || (status == reqwest::StatusCode::OK && resp.headers().contains_key("content-range"));
        if !partial {
            return Err(TransportError::Status(status).into());
        }

        let bytes = resp.bytes().await.map_err(TransportError::Request)?;
        self.transferred_bytes
            .fetch_add(bytes.len() as u64, Ordering::Relaxed);

        Ok(bytes.to_vec())
    }
}
