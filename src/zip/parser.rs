//! Central directory scanner.
//!
//! Enumerates file entries by repeatedly searching a fetched central
//! directory window for the CDFH signature and decoding at each match.
//! This is a linear scan, not an index walk: after a recognized header the
//! search resumes at `match position + struct_len`, so stray bytes between
//! headers are skipped by the signature search rather than rejected.

use crate::error::FormatError;

use super::structures::CentralDirectoryFileHeader;

/// Position of the first occurrence of `signature` in `haystack`.
pub fn find_signature(haystack: &[u8], signature: &[u8]) -> Option<usize> {
    haystack
        .windows(signature.len())
        .position(|window| window == signature)
}

/// Scan a central directory buffer and decode every file header in it.
///
/// The enumerated count is cross-checked against the EOCDR's declared
/// count; a mismatch is the only available signal that the fetched window
/// did not contain the complete, uncorrupted central directory.
pub fn scan_entries(
    buf: &[u8],
    declared_count: u16,
) -> Result<Vec<CentralDirectoryFileHeader>, FormatError> {
    let mut entries = Vec::with_capacity(declared_count as usize);
    let mut cursor = 0usize;

    while let Some(pos) = find_signature(&buf[cursor..], CentralDirectoryFileHeader::SIGNATURE) {
        let header = CentralDirectoryFileHeader::decode(&buf[cursor + pos..])?;
        cursor += pos + header.struct_len();
        entries.push(header);
    }

    if entries.len() != declared_count as usize {
        return Err(FormatError::EntryCountMismatch {
            declared: declared_count,
            found: entries.len(),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::super::structures::test_support::cdfh_bytes;
    use super::*;

    #[test]
    fn scans_concatenated_headers() {
        let mut buf = Vec::new();
        for (i, name) in ["a.txt", "dir/b.bin", "c"].iter().enumerate() {
            buf.extend_from_slice(&cdfh_bytes(name, 10, i as u32 * 100, b"", b""));
        }

        let entries = scan_entries(&buf, 3).unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].file_name, "a.txt");
        assert_eq!(entries[1].file_name, "dir/b.bin");
        assert_eq!(entries[2].file_name, "c");
        assert_eq!(entries[2].lfh_offset, 200);
    }

    #[test]
    fn struct_len_lands_on_next_signature() {
        // Trailing fields of every size must advance the cursor exactly to
        // the next header.
        let first = cdfh_bytes("one", 1, 0, b"\x01\x00\x02\x00ab", b"a comment");
        let second = cdfh_bytes("two", 2, 50, b"", b"");
        let mut buf = first.clone();
        buf.extend_from_slice(&second);

        let entries = scan_entries(&buf, 2).unwrap();
        assert_eq!(entries[0].struct_len(), first.len());
        assert_eq!(entries[1].file_name, "two");
    }

    #[test]
    fn zero_entries_is_not_an_error() {
        assert_eq!(scan_entries(&[], 0).unwrap(), vec![]);
    }

    #[test]
    fn count_mismatch_is_fatal() {
        let buf = cdfh_bytes("only.txt", 1, 0, b"", b"");
        assert_eq!(
            scan_entries(&buf, 2),
            Err(FormatError::EntryCountMismatch {
                declared: 2,
                found: 1
            })
        );
    }

    #[test]
    fn leading_garbage_is_skipped_by_the_search() {
        let mut buf = b"garbage".to_vec();
        buf.extend_from_slice(&cdfh_bytes("x.txt", 1, 0, b"", b""));
        let entries = scan_entries(&buf, 1).unwrap();
        assert_eq!(entries[0].file_name, "x.txt");
    }

    #[test]
    fn truncated_trailing_fields_propagate() {
        let buf = cdfh_bytes("name.txt", 1, 0, b"", b"");
        let short = &buf[..buf.len() - 3];
        assert!(matches!(
            scan_entries(short, 1),
            Err(FormatError::Truncated { .. })
        ));
    }
}
