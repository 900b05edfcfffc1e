//! Extraction session: the only component with external I/O.
//!
//! Drives the end-to-end protocol in strict sequence: size discovery, tail
//! fetch, EOCDR decode, central directory fetch and scan, entry selection,
//! member fetch, emit. Each step runs only after the previous response is
//! fully buffered; a successful session issues exactly three ranged
//! fetches. No step is retried: any failure is terminal, with the failing
//! step named in the error context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::error::{FormatError, UserError};
use crate::io::{ArchiveHandle, RangeTransport};

use super::parser::{find_signature, scan_entries};
use super::ranges;
use super::structures::{CentralDirectoryFileHeader, EndOfCentralDirectoryRecord};

/// The raw bytes of one member's local-file-header-plus-payload window.
///
/// This is NOT a structurally complete archive: it lacks its own central
/// directory and EOCDR, and may carry a few extra trailing bytes from the
/// data-descriptor allowance. It is the minimal span an external archive
/// tool needs to decompress the one member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberPayload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl MemberPayload {
    /// Base filename of the member, without directory components.
    pub fn base_name(&self) -> &str {
        self.file_name.rsplit('/').next().unwrap_or(&self.file_name)
    }
}

/// One-shot extraction session over a range transport.
pub struct ExtractionSession<T: RangeTransport> {
    transport: Arc<T>,
    archive: ArchiveHandle,
    entries: Vec<CentralDirectoryFileHeader>,
    verbose: bool,
}

impl<T: RangeTransport> ExtractionSession<T> {
    /// Open a session: discover the archive's total size.
    ///
    /// A resource with no usable length indicator, or a zero-byte one, is
    /// a fatal precondition failure.
    pub async fn open(transport: Arc<T>, verbose: bool) -> Result<Self> {
        let archive = transport
            .discover()
            .await
            .context("size discovery failed")?;

        Ok(Self {
            transport,
            archive,
            entries: Vec::new(),
            verbose,
        })
    }

    pub fn archive(&self) -> &ArchiveHandle {
        &self.archive
    }

    /// The directory entry table. Empty until [`load_directory`] succeeds.
    ///
    /// [`load_directory`]: Self::load_directory
    pub fn entries(&self) -> &[CentralDirectoryFileHeader] {
        &self.entries
    }

    /// Fetch the archive tail, locate and decode the EOCDR, then fetch and
    /// scan the full central directory.
    ///
    /// Two ranged fetches. The scanned entry count is validated against
    /// the EOCDR's declared count before the table is kept.
    pub async fn load_directory(&mut self) -> Result<()> {
        let tail_range = ranges::tail_window(self.archive.size);
        let tail = self
            .transport
            .fetch(tail_range)
            .await
            .context("tail fetch failed")?;

        let index = find_signature(&tail, EndOfCentralDirectoryRecord::SIGNATURE).ok_or(
            FormatError::SignatureNotFound {
                structure: "end of central directory record",
            },
        )?;
        let eocdr = EndOfCentralDirectoryRecord::decode(&tail[index..])
            .context("end of central directory record decode failed")?;
        if self.verbose {
            eprintln!("{eocdr}");
        }

        let cd_range = ranges::central_directory_window(self.archive.size, &eocdr)?;
        let cd = self
            .transport
            .fetch(cd_range)
            .await
            .context("central directory fetch failed")?;

        let entries = scan_entries(&cd, eocdr.total_entries)
            .context("central directory scan failed")?;
        if self.verbose {
            for entry in &entries {
                eprintln!("{entry}");
            }
        }

        self.entries = entries;
        Ok(())
    }

    /// Select an entry by exact filename match.
    pub fn select(&self, name: &str) -> Result<&CentralDirectoryFileHeader> {
        self.entries
            .iter()
            .find(|e| e.file_name == name)
            .ok_or_else(|| {
                UserError::EntryNotFound {
                    name: name.to_string(),
                }
                .into()
            })
    }

    /// Fetch one member's local-header-plus-payload window.
    ///
    /// One ranged fetch; issued only after the entry is known to exist.
    pub async fn extract(&self, name: &str) -> Result<MemberPayload> {
        let entry = self.select(name)?;
        let range = ranges::member_window(entry);
        if self.verbose {
            eprintln!("member window for \"{}\": {range}", entry.file_name);
        }

        let bytes = self
            .transport
            .fetch(range)
            .await
            .context("member fetch failed")?;

        Ok(MemberPayload {
            file_name: entry.file_name.clone(),
            bytes,
        })
    }

    /// Extract a member and write it to `<out_dir>/<base name>.zip`.
    ///
    /// Any partially-written output is removed before the error is
    /// propagated.
    pub async fn extract_to_file(&self, name: &str, out_dir: &Path) -> Result<PathBuf> {
        let payload = self.extract(name).await?;

        fs::create_dir_all(out_dir)
            .await
            .with_context(|| format!("can't create output directory {}", out_dir.display()))?;

        let path = out_dir.join(format!("{}.zip", payload.base_name()));
        if let Err(e) = write_payload(&path, &payload.bytes).await {
            let _ = fs::remove_file(&path).await;
            return Err(anyhow::Error::from(e))
                .with_context(|| format!("member emit to {} failed", path.display()));
        }

        Ok(path)
    }
}

async fn write_payload(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.flush().await
}

#[cfg(test)]
mod tests {
    use super::super::structures::test_support::eocdr_bytes;
    use super::*;
    use crate::error::TransportError;
    use crate::io::MemoryTransport;

    #[tokio::test]
    async fn open_rejects_empty_resource() {
        let transport = Arc::new(MemoryTransport::new(Vec::new()));
        let err = ExtractionSession::open(transport, false)
            .await
            .err()
            .expect("opening an empty resource must fail");
        assert!(matches!(
            err.downcast_ref::<TransportError>(),
            Some(TransportError::EmptyResource)
        ));
    }

    #[tokio::test]
    async fn comment_pushing_eocdr_out_of_tail_window_fails() {
        // 200-byte comment: the signature sits outside the 100-byte tail.
        let mut archive = vec![0u8; 64];
        archive.extend_from_slice(&eocdr_bytes(0, 0, 64, &[b'x'; 200]));

        let transport = Arc::new(MemoryTransport::new(archive));
        let mut session = ExtractionSession::open(transport, false).await.unwrap();
        let err = session.load_directory().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<FormatError>(),
            Some(FormatError::SignatureNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn zero_entry_archive_yields_empty_table() {
        // An archive that is nothing but an EOCDR declaring zero entries.
        let archive = eocdr_bytes(0, 0, 0, b"");
        let transport = Arc::new(MemoryTransport::new(archive));
        let mut session = ExtractionSession::open(transport, false).await.unwrap();
        session.load_directory().await.unwrap();
        assert!(session.entries().is_empty());
    }
}
