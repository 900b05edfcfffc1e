use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use super::{ArchiveHandle, ByteRange, RangeTransport};
use crate::error::TransportError;
use anyhow::Result;

/// In-memory transport backed by a byte buffer.
///
/// Serves ranges with the same clamping semantics as a range-capable HTTP
/// server: an `end` past the last byte is truncated, a `start` at or past
/// the end of the buffer is unsatisfiable. Counts fetches so tests can
/// assert on the number of range requests a session issued.
pub struct MemoryTransport {
    data: Vec<u8>,
    url: String,
    fetches: AtomicU64,
}

impl MemoryTransport {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            url: "memory://archive.zip".to_string(),
            fetches: AtomicU64::new(0),
        }
    }

    /// Number of ranged fetches issued so far.
    pub fn fetch_count(&self) -> u64 {
        self.fetches.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RangeTransport for MemoryTransport {
    async fn discover(&self) -> Result<ArchiveHandle> {
        if self.data.is_empty() {
            return Err(TransportError::EmptyResource.into());
        }
        Ok(ArchiveHandle {
            url: self.url.clone(),
            size: self.data.len() as u64,
        })
    }

    async fn fetch(&self, range: ByteRange) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);

        let size = self.data.len() as u64;
        if range.start >= size {
            return Err(TransportError::UnsatisfiableRange {
                start: range.start,
                size,
            }
            .into());
        }

        let end = range.end.unwrap_or(size - 1).min(size - 1);
        Ok(self.data[range.start as usize..=end as usize].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn clamps_end_past_the_resource() {
        let t = MemoryTransport::new(vec![1, 2, 3, 4]);
        let bytes = t.fetch(ByteRange::new(2, 100)).await.unwrap();
        assert_eq!(bytes, [3, 4]);
        assert_eq!(t.fetch_count(), 1);
    }

    #[tokio::test]
    async fn start_past_the_resource_is_unsatisfiable() {
        let t = MemoryTransport::new(vec![1, 2, 3, 4]);
        let err = t.fetch(ByteRange::through_end(4)).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TransportError>(),
            Some(TransportError::UnsatisfiableRange { start: 4, size: 4 })
        ));
    }
}
