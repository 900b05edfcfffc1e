//! Error taxonomy for the extraction session.
//!
//! Three families are kept apart so callers can tell a corrupt archive
//! (`FormatError`) from a network fault (`TransportError`) from bad user
//! input (`UserError`). Every error is fatal to the session; there is no
//! retry semantics anywhere in the crate.

use std::fmt;

/// Errors produced while interpreting ZIP structures from a byte buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    /// The first four bytes of the buffer are not the expected magic.
    BadSignature { structure: &'static str },
    /// The buffer is shorter than the structure's fixed part or the
    /// variable-length fields its own header declares.
    Truncated {
        structure: &'static str,
        needed: usize,
        got: usize,
    },
    /// No occurrence of the structure's signature in the searched window.
    SignatureNotFound { structure: &'static str },
    /// The EOCDR places the central directory outside the archive.
    OffsetOutOfBounds { offset: u32, archive_size: u64 },
    /// The scanned central directory did not contain the number of
    /// entries the EOCDR declared.
    EntryCountMismatch { declared: u16, found: usize },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::BadSignature { structure } => {
                write!(f, "bad signature for: {structure}")
            }
            FormatError::Truncated {
                structure,
                needed,
                got,
            } => write!(
                f,
                "truncated {structure}: need {needed} bytes, have {got}"
            ),
            FormatError::SignatureNotFound { structure } => {
                write!(f, "can't find {structure} signature")
            }
            FormatError::OffsetOutOfBounds {
                offset,
                archive_size,
            } => write!(
                f,
                "central directory offset {offset:#x} is outside the archive ({archive_size} bytes)"
            ),
            FormatError::EntryCountMismatch { declared, found } => write!(
                f,
                "central directory declares {declared} entries but {found} were found"
            ),
        }
    }
}

impl std::error::Error for FormatError {}

/// Errors raised by the range transport.
///
/// These are surfaced as fatal aborts, but kept distinguishable from
/// [`FormatError`] so the user-facing message can differ (retryable
/// network blip vs. unrecoverable corrupt archive).
#[derive(Debug)]
pub enum TransportError {
    /// The metadata query returned no usable length indicator.
    MissingLength,
    /// The resource reports a size of zero bytes.
    EmptyResource,
    /// The server does not advertise byte-range support.
    RangeUnsupported,
    /// An unexpected HTTP status for the request that was made.
    Status(reqwest::StatusCode),
    /// A range starting at or past the end of the resource.
    UnsatisfiableRange { start: u64, size: u64 },
    /// The underlying HTTP request failed outright.
    Request(reqwest::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::MissingLength => {
                write!(f, "remote server did not return Content-Length")
            }
            TransportError::EmptyResource => write!(f, "remote resource is empty"),
            TransportError::RangeUnsupported => {
                write!(f, "remote server does not support Range requests")
            }
            TransportError::Status(status) => {
                write!(f, "HTTP request failed with status: {status}")
            }
            TransportError::UnsatisfiableRange { start, size } => write!(
                f,
                "requested range starts at {start} but the resource is {size} bytes"
            ),
            TransportError::Request(e) => write!(f, "HTTP request failed: {e}"),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Request(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::Request(e)
    }
}

/// Errors caused by the caller's input rather than the archive or network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserError {
    /// The requested filename matches no entry in the central directory.
    EntryNotFound { name: String },
}

impl fmt::Display for UserError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserError::EntryNotFound { name } => {
                write!(f, "\"{name}\" does not exist in the archive")
            }
        }
    }
}

impl std::error::Error for UserError {}
