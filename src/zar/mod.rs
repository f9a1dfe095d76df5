//! ZAR archive parsing and extraction.
//!
//! ZAR ("Zip-Archiv") is a legacy DOS-era archive format. Its entry table is
//! not indexed from a header; it has to be rebuilt by walking backward from
//! the end of the file.
//!
//! ## Architecture
//!
//! - [`structures`]: Format constants, the derived header, entries and the entry registry
//! - [`parser`]: Signature check and the backward entry-table scan
//! - [`extractor`]: Replays entries in archive order and decompresses them to disk
//! - [`error`]: The error taxonomy shared by all of the above
//!
//! ## ZAR Format Overview
//!
//! A ZAR file consists of, in file order:
//! 1. The compressed payloads, back to back, in archive order
//! 2. One metadata record per payload, in the same order:
//!    `[0x80 + name length][name][compressed size: u32 LE]`
//! 3. Four reserved bytes
//! 4. The magic `PT&`
//!
//! Payloads are PKWare DCL imploded; see [`crate::dcl`].
//!
//! ## Limitations
//!
//! - Extraction only, no archive creation
//! - No integrity checks beyond the filename length limit

pub mod error;
mod extractor;
mod parser;
mod structures;

pub use error::{Result, ZarError};
pub use extractor::{ZarExtractor, output_path};
pub use parser::ZarParser;
pub use structures::*;
