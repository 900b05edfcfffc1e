//! ZIP structural resolution and single-member extraction.
//!
//! The module is organized leaves-first:
//!
//! - [`structures`]: pure binary decoders for the End of Central Directory
//!   Record and the Central Directory File Header
//! - [`parser`]: the central directory scanner
//! - [`ranges`]: the range resolver, turning decoded structures into byte
//!   windows
//! - [`session`]: the orchestrating extraction session, the only component
//!   with external I/O
//!
//! ## Protocol Overview
//!
//! A ZIP file ends with the EOCDR, which locates the central directory,
//! which in turn locates each member's local file header and compressed
//! payload. Reading back-to-front this way needs three range requests in
//! total: the archive tail, the central directory, and one member's span.
//! The archive head is never fetched, so every window is phrased as a
//! distance from the archive's end.
//!
//! ## Limitations
//!
//! - No ZIP64 extensions
//! - No multi-disk archives
//! - No CRC-32 verification of extracted data
//! - The extracted span is still compressed and is not a standalone
//!   archive; an external tool performs the actual decompression

pub mod parser;
pub mod ranges;
mod session;
mod structures;

pub use session::{ExtractionSession, MemberPayload};
pub use structures::*;
