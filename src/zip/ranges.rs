//! Range resolver: the pure offset arithmetic behind the three range
//! requests a session issues. No I/O happens here.
//!
//! All windows are phrased relative to the archive's end, the only
//! coordinate known without fetching the archive's head.

use crate::error::FormatError;
use crate::io::ByteRange;

use super::structures::{CentralDirectoryFileHeader, EndOfCentralDirectoryRecord};

/// Size of the tail window searched for the EOCDR signature.
///
/// Large enough for an EOCDR with a short-to-empty comment. A comment long
/// enough to push the signature outside this window makes resolution fail;
/// the search is deliberately not widened.
pub const TAIL_WINDOW: u64 = 100;

/// Fixed size of a local file header, preceding each member's data.
pub const LOCAL_FILE_HEADER_LEN: u64 = 30;

/// Bytes added past the compressed payload to cover an optional trailing
/// data descriptor. Added unconditionally, whether or not the entry's
/// general-purpose flag announces one; the over-fetch avoids a second
/// round trip and costs callers at most a few trailing bytes.
pub const DATA_DESCRIPTOR_ALLOWANCE: u64 = 12;

/// The window at the archive's end likely to contain the EOCDR.
pub fn tail_window(archive_size: u64) -> ByteRange {
    ByteRange::new(archive_size.saturating_sub(TAIL_WINDOW), archive_size)
}

/// The window covering the full central directory, derived from a decoded
/// EOCDR.
///
/// An EOCDR placing the directory outside the archive, or overlapping the
/// EOCDR itself, is a format fault.
pub fn central_directory_window(
    archive_size: u64,
    eocdr: &EndOfCentralDirectoryRecord,
) -> Result<ByteRange, FormatError> {
    let offset_from_end = eocdr.cd_offset_from_end(archive_size)?;
    let start = archive_size - offset_from_end;
    let end = archive_size - eocdr.struct_len() as u64;
    if start > end {
        return Err(FormatError::OffsetOutOfBounds {
            offset: eocdr.cd_offset,
            archive_size,
        });
    }
    Ok(ByteRange::new(start, end))
}

/// The window covering one member's local file header plus compressed
/// payload (plus the data-descriptor allowance).
pub fn member_window(entry: &CentralDirectoryFileHeader) -> ByteRange {
    let start = entry.lfh_offset as u64;
    let end = start
        + LOCAL_FILE_HEADER_LEN
        + entry.file_name_len as u64
        + entry.extra_field_len as u64
        + entry.compressed_size as u64
        + DATA_DESCRIPTOR_ALLOWANCE;
    ByteRange::new(start, end)
}
