//! # zipsnip
//!
//! Extract single files from remote ZIP archives using HTTP Range requests.
//!
//! A ZIP archive can be read back-to-front: the trailer locates the central
//! directory, and the central directory locates each member. This library
//! exploits that to pull one member out of a large remote archive with
//! exactly three ranged requests (tail, central directory, member span),
//! never downloading the full archive.
//!
//! The output is the member's raw local-file-header-plus-compressed-payload
//! window. It is deliberately NOT a standalone archive: decompression is
//! delegated to an external tool.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use zipsnip::{ExtractionSession, HttpRangeClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = Arc::new(HttpRangeClient::new(
//!         "https://example.com/archive.zip".to_string(),
//!     )?);
//!
//!     let mut session = ExtractionSession::open(client, false).await?;
//!     session.load_directory().await?;
//!
//!     for entry in session.entries() {
//!         println!("{}", entry.file_name);
//!     }
//!
//!     session
//!         .extract_to_file("docs/readme.txt", Path::new("outputs"))
//!         .await?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod zip;

pub use cli::Cli;
pub use error::{FormatError, TransportError, UserError};
pub use io::{ArchiveHandle, ByteRange, HttpRangeClient, MemoryTransport, RangeTransport};
pub use zip::{CentralDirectoryFileHeader, EndOfCentralDirectoryRecord, ExtractionSession, MemberPayload};
