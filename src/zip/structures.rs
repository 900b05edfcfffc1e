//! Binary decoders for the two ZIP structures the protocol needs.
//!
//! Both decoders are pure byte-buffer to struct transformations: they never
//! touch I/O or global state, and diagnostics are a separate concern (the
//! [`fmt::Display`] impls produce the field-by-field dumps, the session
//! decides whether to print them).
//!
//! All fixed-width integers in the format are little-endian and unsigned.

use std::fmt;
use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::FormatError;

/// ZIP compression methods, carried for display only. The extracted member
/// is emitted still compressed; no method is ever decompressed here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }
}

impl fmt::Display for CompressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompressionMethod::Stored => write!(f, "stored (0)"),
            CompressionMethod::Deflate => write!(f, "deflated (8)"),
            CompressionMethod::Unknown(v) => write!(f, "unknown ({v})"),
        }
    }
}

/// MS-DOS packed time: 5 bits hour, 6 bits minute, 5 bits two-second units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosTime(pub u16);

impl DosTime {
    pub fn hour(&self) -> u8 {
        ((self.0 >> 11) & 0x1F) as u8
    }

    pub fn minute(&self) -> u8 {
        ((self.0 >> 5) & 0x3F) as u8
    }

    pub fn second(&self) -> u8 {
        ((self.0 & 0x1F) * 2) as u8
    }
}

impl fmt::Display for DosTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour(), self.minute(), self.second())
    }
}

/// MS-DOS packed date: 7 bits years since 1980, 4 bits month, 5 bits day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosDate(pub u16);

impl DosDate {
    pub fn year(&self) -> u16 {
        ((self.0 >> 9) & 0x7F) + 1980
    }

    pub fn month(&self) -> u8 {
        ((self.0 >> 5) & 0x0F) as u8
    }

    pub fn day(&self) -> u8 {
        (self.0 & 0x1F) as u8
    }
}

impl fmt::Display for DosDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year(), self.month(), self.day())
    }
}

/// End of Central Directory Record: fixed 22-byte header plus a trailing
/// comment of `comment.len()` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndOfCentralDirectoryRecord {
    pub disk_number: u16,
    pub cd_start_disk: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment: Vec<u8>,
}

impl EndOfCentralDirectoryRecord {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const FIXED_LEN: usize = 22;

    const NAME: &'static str = "end of central directory record";

    /// Decode an EOCDR whose signature is expected at the start of `data`.
    ///
    /// The buffer must cover the fixed header plus the comment length the
    /// header itself declares; callers over-fetch to guarantee that.
    pub fn decode(data: &[u8]) -> Result<Self, FormatError> {
        let fixed = check_header(data, Self::SIGNATURE, Self::FIXED_LEN, Self::NAME)?;

        let (record, comment_len) = Self::read_fields(&mut Cursor::new(&fixed[4..]))
            .map_err(|_| FormatError::Truncated {
                structure: Self::NAME,
                needed: Self::FIXED_LEN,
                got: data.len(),
            })?;

        let total = Self::FIXED_LEN + comment_len;
        if data.len() < total {
            return Err(FormatError::Truncated {
                structure: Self::NAME,
                needed: total,
                got: data.len(),
            });
        }

        Ok(Self {
            comment: data[Self::FIXED_LEN..total].to_vec(),
            ..record
        })
    }

    // The cursor covers the full length-checked fixed part, so the reads
    // cannot actually hit EOF.
    fn read_fields(c: &mut Cursor<&[u8]>) -> std::io::Result<(Self, usize)> {
        let record = Self {
            disk_number: c.read_u16::<LittleEndian>()?,
            cd_start_disk: c.read_u16::<LittleEndian>()?,
            disk_entries: c.read_u16::<LittleEndian>()?,
            total_entries: c.read_u16::<LittleEndian>()?,
            cd_size: c.read_u32::<LittleEndian>()?,
            cd_offset: c.read_u32::<LittleEndian>()?,
            comment: Vec::new(),
        };
        let comment_len = c.read_u16::<LittleEndian>()? as usize;
        Ok((record, comment_len))
    }

    /// Total length of the record: fixed part plus comment.
    pub fn struct_len(&self) -> usize {
        Self::FIXED_LEN + self.comment.len()
    }

    /// Distance from the archive's end to the start of the central
    /// directory.
    ///
    /// The header stores the offset from the archive start, but the head of
    /// the archive is never fetched, so absolute offsets are not directly
    /// actionable; distances from the known end coordinate are. A declared
    /// offset past the archive end is a format fault.
    pub fn cd_offset_from_end(&self, archive_size: u64) -> Result<u64, FormatError> {
        archive_size
            .checked_sub(self.cd_offset as u64)
            .ok_or(FormatError::OffsetOutOfBounds {
                offset: self.cd_offset,
                archive_size,
            })
    }
}

impl fmt::Display for EndOfCentralDirectoryRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "end of central directory record ({:#x} bytes):", self.struct_len())?;
        writeln!(f, "  total entries:            {}", self.total_entries)?;
        writeln!(f, "  central directory size:   {:#x} bytes", self.cd_size)?;
        writeln!(f, "  central directory offset: {:#x}", self.cd_offset)?;
        write!(f, "  comment length:           {}", self.comment.len())
    }
}

/// Central Directory File Header: fixed 46-byte header plus filename,
/// extra field, and comment, with the three lengths at fixed offsets 28-34.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CentralDirectoryFileHeader {
    pub version_made_by: u16,
    pub version_needed: u16,
    pub flags: u16,
    pub compression_method: CompressionMethod,
    pub mod_time: DosTime,
    pub mod_date: DosDate,
    pub crc32: u32,
    pub compressed_size: u32,
    pub uncompressed_size: u32,
    pub file_name_len: u16,
    pub extra_field_len: u16,
    pub comment_len: u16,
    pub disk_number_start: u16,
    pub internal_attrs: u16,
    pub external_attrs: u32,
    pub lfh_offset: u32,
    pub file_name: String,
}

impl CentralDirectoryFileHeader {
    pub const SIGNATURE: &'static [u8] = b"PK\x01\x02";
    pub const FIXED_LEN: usize = 46;

    const NAME: &'static str = "central directory file header";

    /// Decode a CDFH whose signature is expected at the start of `data`.
    pub fn decode(data: &[u8]) -> Result<Self, FormatError> {
        let fixed = check_header(data, Self::SIGNATURE, Self::FIXED_LEN, Self::NAME)?;

        let header = Self::read_fields(&mut Cursor::new(&fixed[4..]))
            .map_err(|_| FormatError::Truncated {
                structure: Self::NAME,
                needed: Self::FIXED_LEN,
                got: data.len(),
            })?;

        let total = Self::FIXED_LEN
            + header.file_name_len as usize
            + header.extra_field_len as usize
            + header.comment_len as usize;
        if data.len() < total {
            return Err(FormatError::Truncated {
                structure: Self::NAME,
                needed: total,
                got: data.len(),
            });
        }

        let name_end = Self::FIXED_LEN + header.file_name_len as usize;
        let file_name = String::from_utf8_lossy(&data[Self::FIXED_LEN..name_end]).to_string();

        Ok(Self { file_name, ..header })
    }

    // The cursor covers the full length-checked fixed part, so the reads
    // cannot actually hit EOF.
    fn read_fields(c: &mut Cursor<&[u8]>) -> std::io::Result<Self> {
        Ok(Self {
            version_made_by: c.read_u16::<LittleEndian>()?,
            version_needed: c.read_u16::<LittleEndian>()?,
            flags: c.read_u16::<LittleEndian>()?,
            compression_method: CompressionMethod::from_u16(c.read_u16::<LittleEndian>()?),
            mod_time: DosTime(c.read_u16::<LittleEndian>()?),
            mod_date: DosDate(c.read_u16::<LittleEndian>()?),
            crc32: c.read_u32::<LittleEndian>()?,
            compressed_size: c.read_u32::<LittleEndian>()?,
            uncompressed_size: c.read_u32::<LittleEndian>()?,
            file_name_len: c.read_u16::<LittleEndian>()?,
            extra_field_len: c.read_u16::<LittleEndian>()?,
            comment_len: c.read_u16::<LittleEndian>()?,
            disk_number_start: c.read_u16::<LittleEndian>()?,
            internal_attrs: c.read_u16::<LittleEndian>()?,
            external_attrs: c.read_u32::<LittleEndian>()?,
            lfh_offset: c.read_u32::<LittleEndian>()?,
            file_name: String::new(),
        })
    }

    /// Total length of the header: fixed part plus the three
    /// variable-length trailing fields. Exact, and used to advance the
    /// central directory scan cursor to the next header.
    pub fn struct_len(&self) -> usize {
        Self::FIXED_LEN
            + self.file_name_len as usize
            + self.extra_field_len as usize
            + self.comment_len as usize
    }

    /// Whether the general-purpose flags announce a trailing data
    /// descriptor after the compressed payload.
    pub fn has_data_descriptor(&self) -> bool {
        self.flags & 0x0008 != 0
    }

    /// Directory entries end with '/'.
    pub fn is_directory(&self) -> bool {
        self.file_name.ends_with('/')
    }

    /// The entry's base filename, without any directory components.
    pub fn base_name(&self) -> &str {
        self.file_name.rsplit('/').next().unwrap_or(&self.file_name)
    }
}

impl fmt::Display for CentralDirectoryFileHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "central directory file header ({:#x} bytes):", self.struct_len())?;
        writeln!(f, "  file name:                {}", self.file_name)?;
        writeln!(f, "  compression method:       {}", self.compression_method)?;
        writeln!(f, "  modified:                 {} {}", self.mod_date, self.mod_time)?;
        writeln!(f, "  crc32:                    {:#010x}", self.crc32)?;
        writeln!(f, "  compressed size:          {:#x} bytes", self.compressed_size)?;
        writeln!(f, "  uncompressed size:        {:#x} bytes", self.uncompressed_size)?;
        writeln!(f, "  local file header offset: {:#x}", self.lfh_offset)?;
        write!(
            f,
            "  data descriptor:          {}",
            if self.has_data_descriptor() { "yes" } else { "no" }
        )
    }
}

/// Validate the signature and fixed length of a structure at the start of
/// `data`, returning the fixed-part slice.
///
/// Wrong magic in the first four bytes is always `BadSignature`, regardless
/// of what follows; any other deficit is `Truncated`.
fn check_header<'a>(
    data: &'a [u8],
    signature: &[u8],
    fixed_len: usize,
    name: &'static str,
) -> Result<&'a [u8], FormatError> {
    if data.len() >= 4 && &data[0..4] != signature {
        return Err(FormatError::BadSignature { structure: name });
    }
    if data.len() < fixed_len {
        return Err(FormatError::Truncated {
            structure: name,
            needed: fixed_len,
            got: data.len(),
        });
    }
    Ok(&data[..fixed_len])
}


#[cfg(test)]
mod tests {
    use super::test_support::{cdfh_bytes, eocdr_bytes};
    use super::*;

    #[test]
    fn eocdr_decodes_fields_and_struct_len() {
        let buf = eocdr_bytes(3, 0x100, 0x2000, b"hello");
        let eocdr = EndOfCentralDirectoryRecord::decode(&buf).unwrap();
        assert_eq!(eocdr.total_entries, 3);
        assert_eq!(eocdr.cd_size, 0x100);
        assert_eq!(eocdr.cd_offset, 0x2000);
        assert_eq!(eocdr.comment, b"hello");
        assert_eq!(eocdr.struct_len(), 27);
    }

    #[test]
    fn eocdr_offset_from_end() {
        let buf = eocdr_bytes(1, 50, 0x2000, b"");
        let eocdr = EndOfCentralDirectoryRecord::decode(&buf).unwrap();
        assert_eq!(eocdr.cd_offset_from_end(0x3000), Ok(0x1000));
    }

    #[test]
    fn eocdr_offset_past_archive_end_is_an_error() {
        let buf = eocdr_bytes(1, 50, 0x2000, b"");
        let eocdr = EndOfCentralDirectoryRecord::decode(&buf).unwrap();
        assert_eq!(
            eocdr.cd_offset_from_end(0x1000),
            Err(FormatError::OffsetOutOfBounds {
                offset: 0x2000,
                archive_size: 0x1000
            })
        );
    }

    #[test]
    fn eocdr_rejects_bad_signature() {
        let mut buf = eocdr_bytes(1, 0, 0, b"");
        buf[3] = 0xFF;
        assert_eq!(
            EndOfCentralDirectoryRecord::decode(&buf),
            Err(FormatError::BadSignature {
                structure: "end of central directory record"
            })
        );
    }

    #[test]
    fn eocdr_bad_signature_wins_over_short_buffer() {
        // Four bytes of wrong magic and nothing else: still BadSignature.
        assert_eq!(
            EndOfCentralDirectoryRecord::decode(b"NOPE"),
            Err(FormatError::BadSignature {
                structure: "end of central directory record"
            })
        );
    }

    #[test]
    fn eocdr_truncated_fixed_part() {
        let buf = eocdr_bytes(1, 0, 0, b"");
        assert!(matches!(
            EndOfCentralDirectoryRecord::decode(&buf[..10]),
            Err(FormatError::Truncated { needed: 22, got: 10, .. })
        ));
    }

    #[test]
    fn eocdr_truncated_comment() {
        let mut buf = eocdr_bytes(1, 0, 0, b"0123456789");
        buf.truncate(25); // declares 10 comment bytes, provides 3
        assert!(matches!(
            EndOfCentralDirectoryRecord::decode(&buf),
            Err(FormatError::Truncated { needed: 32, got: 25, .. })
        ));
    }

    #[test]
    fn cdfh_decodes_fields_and_struct_len() {
        let buf = cdfh_bytes("docs/readme.txt", 0x42, 0x1234, b"xx", b"note");
        let cdfh = CentralDirectoryFileHeader::decode(&buf).unwrap();
        assert_eq!(cdfh.file_name, "docs/readme.txt");
        assert_eq!(cdfh.base_name(), "readme.txt");
        assert_eq!(cdfh.compression_method, CompressionMethod::Stored);
        assert_eq!(cdfh.compressed_size, 0x42);
        assert_eq!(cdfh.lfh_offset, 0x1234);
        assert_eq!(cdfh.crc32, 0xDEADBEEF);
        assert_eq!(cdfh.struct_len(), 46 + 15 + 2 + 4);
        assert!(!cdfh.has_data_descriptor());
        assert!(!cdfh.is_directory());
    }

    #[test]
    fn cdfh_rejects_bad_signature() {
        let mut buf = cdfh_bytes("a", 1, 0, b"", b"");
        buf[0] = b'Q';
        assert_eq!(
            CentralDirectoryFileHeader::decode(&buf),
            Err(FormatError::BadSignature {
                structure: "central directory file header"
            })
        );
    }

    #[test]
    fn cdfh_truncated_trailing_fields() {
        // Declared filename pushes past the available buffer.
        let buf = cdfh_bytes("a_rather_long_member_name.bin", 1, 0, b"", b"");
        let short = &buf[..50];
        assert!(matches!(
            CentralDirectoryFileHeader::decode(short),
            Err(FormatError::Truncated { .. })
        ));
    }

    #[test]
    fn cdfh_directory_entry() {
        let buf = cdfh_bytes("docs/", 0, 0, b"", b"");
        let cdfh = CentralDirectoryFileHeader::decode(&buf).unwrap();
        assert!(cdfh.is_directory());
        assert_eq!(cdfh.base_name(), "");
    }

    #[test]
    fn dos_time_bit_extraction() {
        // 12:04:06 -> hour 12, minute 4, seconds 6/2
        let t = DosTime(12 << 11 | 4 << 5 | 3);
        assert_eq!((t.hour(), t.minute(), t.second()), (12, 4, 6));
    }

    #[test]
    fn dos_date_bit_extraction() {
        // 2024-01-02 -> 44 years since 1980
        let d = DosDate(44 << 9 | 1 << 5 | 2);
        assert_eq!((d.year(), d.month(), d.day()), (2024, 1, 2));
    }
}
