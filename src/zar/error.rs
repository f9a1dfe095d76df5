//! Error types for ZAR parsing and extraction.
//!
//! | Category | Errors |
//! |----------|--------|
//! | Format | [`FormatMismatch`], [`MalformedEntry`] |
//! | Entry table | [`TruncatedArchive`], [`CorruptEntryTable`] |
//! | Extraction | [`DestinationMissing`], [`DecompressionFailure`], [`UnsafeFileName`], [`CreateOutput`] |
//!
//! Every error is fatal for the whole run: a single bad record shifts the
//! offsets of every record before it, so nothing after the failure can be
//! trusted.
//!
//! [`FormatMismatch`]: ZarError::FormatMismatch
//! [`MalformedEntry`]: ZarError::MalformedEntry
//! [`TruncatedArchive`]: ZarError::TruncatedArchive
//! [`CorruptEntryTable`]: ZarError::CorruptEntryTable
//! [`DestinationMissing`]: ZarError::DestinationMissing
//! [`DecompressionFailure`]: ZarError::DecompressionFailure
//! [`UnsafeFileName`]: ZarError::UnsafeFileName
//! [`CreateOutput`]: ZarError::CreateOutput

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::dcl::DclError;

/// Error type for ZAR operations.
#[derive(Debug, Error)]
pub enum ZarError {
    /// The trailing magic is not `PT&`.
    #[error("file {location} is not a ZAR file (trailing bytes {found:02x?})")]
    FormatMismatch { location: String, found: Vec<u8> },

    /// A read would run past either end of the archive.
    #[error("archive truncated: need {needed} bytes at offset {offset}")]
    TruncatedArchive { offset: u64, needed: u64 },

    /// The backward scan could not account for the archive's bytes.
    #[error("corrupt entry table at offset {offset}: {reason}")]
    CorruptEntryTable { offset: u64, reason: String },

    /// A length marker decoded to a filename longer than the format allows.
    #[error("filename length is > 12: {length} (length byte at offset {offset})")]
    MalformedEntry { length: u8, offset: u64 },

    #[error("destination folder ({}) doesn't exist", path.display())]
    DestinationMissing { path: PathBuf },

    #[error("failed to decompress {name}")]
    DecompressionFailure {
        name: String,
        #[source]
        source: DclError,
    },

    /// The stored name would escape the destination directory or is empty.
    #[error("refusing to extract entry with unsafe name {name:?}")]
    UnsafeFileName { name: String },

    #[error("failed to create {}", path.display())]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, ZarError>;
