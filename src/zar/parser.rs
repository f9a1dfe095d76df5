//! Low-level ZAR archive parser.
//!
//! This module handles the binary parsing of the ZAR entry table,
//! reading from any source that implements the [`ReadAt`] trait.
//!
//! ## Parsing Strategy
//!
//! ZAR has no forward index and no entry count. The table can only be
//! recovered from the end of the file:
//! 1. Check the 3-byte magic at the very end and skip the 4 reserved bytes
//! 2. Read the 4-byte compressed size that ends the nearest record
//! 3. Walk backward until a byte decodes (minus `0x80`) to exactly its own
//!    distance from the size field; that byte is the filename length
//! 4. Continue from the start of that record until footer, metadata and
//!    payload sizes add up to the file size
//!
//! The self-referential length check is what separates the length byte from
//! filename bytes that also have the high bit set.

use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Cursor};
use std::sync::Arc;
use tracing::{debug, trace};

use crate::io::ReadAt;

use super::error::{Result, ZarError};
use super::structures::*;

/// Furthest a length byte can sit from its size field.
///
/// A biased byte decodes to at most `0xFF - 0x80`, so no byte further back
/// can satisfy the position check.
const MARKER_SEARCH_LIMIT: u64 = 0x80;

/// Accumulated progress of the backward scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScanState {
    total_size: u64,
    /// End of the next record to parse; records are read right to left.
    cursor: u64,
    /// Metadata bytes consumed so far (records only).
    header_bytes: u64,
    /// Footer, metadata and payload bytes accounted for.
    bytes_read: u64,
}

impl ScanState {
    fn new(total_size: u64) -> Self {
        Self {
            total_size,
            cursor: total_size - FOOTER_SIZE,
            header_bytes: 0,
            bytes_read: FOOTER_SIZE,
        }
    }

    fn is_complete(&self) -> bool {
        self.bytes_read == self.total_size
    }

    /// Bytes between the footer and the records already parsed.
    fn remaining(&self) -> u64 {
        self.total_size - FOOTER_SIZE - self.header_bytes
    }
}

/// Low-level ZAR file parser.
///
/// Typically used through [`ZarExtractor`](super::ZarExtractor)
/// rather than directly.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use unzar::{LocalFileReader, ZarParser};
///
/// let reader = Arc::new(LocalFileReader::new("GAME.ZAR".as_ref())?);
/// let parser = ZarParser::new(reader);
/// for entry in parser.list_files()? {
///     println!("{} {}", entry.file_name, entry.compressed_size);
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct ZarParser<R: ReadAt> {
    /// The underlying data source
    reader: Arc<R>,
    /// Total size of the archive in bytes
    size: u64,
}

impl<R: ReadAt> ZarParser<R> {
    pub fn new(reader: Arc<R>) -> Self {
        let size = reader.size();
        Self { reader, size }
    }

    /// Read the trailing magic and confirm this is a ZAR archive.
    ///
    /// # Errors
    ///
    /// [`ZarError::FormatMismatch`] naming the source if the magic differs,
    /// [`ZarError::TruncatedArchive`] if the file is shorter than the magic.
    pub fn header(&self) -> Result<Header> {
        let magic_len = MAGIC.len() as u64;
        if self.size < magic_len {
            return Err(ZarError::TruncatedArchive {
                offset: 0,
                needed: magic_len,
            });
        }

        let mut signature = [0u8; 3];
        self.read_exact(self.size - magic_len, &mut signature)?;

        let header = Header {
            signature,
            total_size: self.size,
        };
        if !header.is_valid() {
            return Err(ZarError::FormatMismatch {
                location: self.reader.location().to_string(),
                found: signature.to_vec(),
            });
        }

        Ok(header)
    }

    /// Reconstruct the entry table, last archived entry first.
    ///
    /// Scanning stops once the footer, every record and every payload they
    /// describe add up to the file size exactly.
    pub fn scan_entries(&self) -> Result<EntryRegistry> {
        let header = self.header()?;
        if header.total_size < FOOTER_SIZE {
            return Err(ZarError::TruncatedArchive {
                offset: 0,
                needed: FOOTER_SIZE,
            });
        }

        let mut state = ScanState::new(header.total_size);
        let mut registry = EntryRegistry::new();

        while !state.is_complete() {
            if state.bytes_read > state.total_size {
                return Err(ZarError::CorruptEntryTable {
                    offset: state.cursor,
                    reason: format!(
                        "entries account for {} bytes but the archive is {} bytes",
                        state.bytes_read, state.total_size
                    ),
                });
            }

            let entry = self.read_record(&mut state)?;
            debug!(
                name = %entry.file_name,
                compressed_size = entry.compressed_size,
                record_offset = entry.name_length_offset,
                "found entry"
            );
            registry.push(entry);
        }

        debug!(entries = registry.len(), "entry table complete");
        Ok(registry)
    }

    /// List all entries in archive order, with payload offsets assigned.
    pub fn list_files(&self) -> Result<Vec<ZarEntry>> {
        Ok(self.scan_entries()?.into_forward())
    }

    /// Parse the record ending at `state.cursor` and step the cursor past it.
    fn read_record(&self, state: &mut ScanState) -> Result<ZarEntry> {
        let size_offset = state.cursor.checked_sub(SIZE_FIELD_LEN).ok_or(
            ZarError::TruncatedArchive {
                offset: 0,
                needed: SIZE_FIELD_LEN,
            },
        )?;

        let mut size_buf = [0u8; SIZE_FIELD_LEN as usize];
        self.read_exact(size_offset, &mut size_buf)?;
        let compressed_size = Cursor::new(&size_buf).read_u32::<LittleEndian>()? as u64;
        state.bytes_read += SIZE_FIELD_LEN;

        let (name_length_offset, name_length) = self.find_length_marker(state, size_offset)?;
        if name_length > MAX_NAME_LENGTH {
            return Err(ZarError::MalformedEntry {
                length: name_length,
                offset: name_length_offset,
            });
        }

        let name_offset = name_length_offset + 1;
        let mut raw_name = vec![0u8; name_length as usize];
        self.read_exact(name_offset, &mut raw_name)?;
        let file_name = String::from_utf8_lossy(&raw_name).into_owned();

        let entry = ZarEntry {
            file_name,
            raw_name,
            compressed_size,
            name_length,
            name_length_offset,
            name_offset,
            data_offset: 0,
        };

        state.header_bytes += entry.record_size();
        // The size field was counted when it was read
        state.bytes_read += entry.record_size() - SIZE_FIELD_LEN;
        state.bytes_read += compressed_size;
        state.cursor = name_length_offset;

        Ok(entry)
    }

    /// Walk backward from the size field to the byte encoding the filename length.
    ///
    /// A byte is accepted only when its value minus the bias equals the
    /// position computed from how much of the archive is still unparsed.
    /// Returns the byte's offset and the decoded length.
    fn find_length_marker(&self, state: &ScanState, size_offset: u64) -> Result<(u64, u8)> {
        let window_len = size_offset.min(MARKER_SEARCH_LIMIT);
        let mut window = vec![0u8; window_len as usize];
        self.read_exact(size_offset - window_len, &mut window)?;

        let position = size_offset as i64;
        let mut remaining = state.remaining() as i64;

        for (step, &byte) in window.iter().rev().enumerate() {
            let candidate = byte as i64 - LENGTH_BIAS as i64;
            let expected = position - remaining + SIZE_FIELD_LEN as i64;
            if candidate == expected {
                let offset = size_offset - 1 - step as u64;
                trace!(offset, length = candidate, "accepted length marker");
                return Ok((offset, candidate as u8));
            }
            remaining -= 1;
        }

        let reason = if window_len < MARKER_SEARCH_LIMIT {
            "reached start of archive without finding a filename length".to_string()
        } else {
            format!("no filename length within {MARKER_SEARCH_LIMIT} bytes of the size field")
        };
        Err(ZarError::CorruptEntryTable {
            offset: size_offset,
            reason,
        })
    }

    /// Fill `buf` from `offset`, treating any short read as truncation.
    pub fn read_exact(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let needed = buf.len() as u64;
        if offset.checked_add(needed).is_none_or(|end| end > self.size) {
            return Err(ZarError::TruncatedArchive { offset, needed });
        }

        self.reader
            .read_exact_at(offset, buf)
            .map_err(|e| match e.kind() {
                io::ErrorKind::UnexpectedEof => ZarError::TruncatedArchive { offset, needed },
                _ => ZarError::Io(e),
            })
    }
}
