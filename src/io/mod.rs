mod http;
mod memory;

pub use http::HttpRangeClient;
pub use memory::MemoryTransport;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;

/// An inclusive byte span of a remote resource.
///
/// `end == None` means "through the end of the resource". This is the unit
/// passed to every ranged fetch; it renders as an HTTP `Range` header value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: Option<u64>,
}

impl ByteRange {
    /// A range with both bounds. Panics in debug builds if `start > end`.
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "byte range start {start} > end {end}");
        Self {
            start,
            end: Some(end),
        }
    }

    /// A range from `start` through the end of the resource.
    pub fn through_end(start: u64) -> Self {
        Self { start, end: None }
    }

    /// The value for an HTTP `Range` header, e.g. `bytes=0-99`.
    pub fn header_value(&self) -> String {
        match self.end {
            Some(end) => format!("bytes={}-{}", self.start, end),
            None => format!("bytes={}-", self.start),
        }
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end {
            Some(end) => write!(f, "[{}, {}]", self.start, end),
            None => write!(f, "[{}, end]", self.start),
        }
    }
}

/// A remote archive located by URL with a known total size.
///
/// Created once from the transport's metadata query and immutable
/// thereafter. `size` is always greater than zero; a resource without a
/// usable length indicator never produces a handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveHandle {
    pub url: String,
    pub size: u64,
}

impl ArchiveHandle {
    /// The archive's base filename, taken from the last URL segment.
    pub fn name(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

/// Trait for fetching byte ranges from a remote resource.
#[async_trait]
pub trait RangeTransport: Send + Sync {
    /// Metadata-only query for the resource's total size.
    async fn discover(&self) -> Result<ArchiveHandle>;

    /// Fetch the bytes in `range`, fully buffered.
    ///
    /// A range reaching past the end of the resource is clamped, matching
    /// the behavior of a range-capable HTTP server.
    async fn fetch(&self, range: ByteRange) -> Result<Vec<u8>>;
}
