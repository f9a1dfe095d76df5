//! # unzar
//!
//! A Rust extractor for legacy Zip-Archiv (ZAR) archives.
//!
//! ZAR archives keep their entry table at the end of the file with no count
//! and no fixed offsets. This library rebuilds that table by scanning
//! backward from the trailing `PT&` magic, then decompresses each PKWare DCL
//! imploded payload in archive order.
//!
//! ## Features
//!
//! - Backward reconstruction of the entry table, with the format's
//!   self-referential length check
//! - Built-in DCL "explode" decoder (raw and Huffman-coded literals, 1K-4K windows)
//! - Typed errors for every failure mode
//! - Pluggable sources ([`ReadAt`]) and decompressors ([`Decompressor`])
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use unzar::{LocalFileReader, ZarExtractor};
//!
//! fn main() -> anyhow::Result<()> {
//!     let reader = Arc::new(LocalFileReader::new(Path::new("INSTALL.ZAR"))?);
//!     let extractor = ZarExtractor::new(reader);
//!
//!     for entry in extractor.list_files()? {
//!         println!("{} ({} bytes compressed)", entry.file_name, entry.compressed_size);
//!     }
//!
//!     extractor.extract_all(Some(Path::new("out")), |_| {})?;
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod dcl;
pub mod io;
pub mod zar;

pub use cli::Cli;
pub use dcl::{Decompressor, DclError, Explode};
pub use io::{LocalFileReader, MemoryReader, ReadAt};
pub use zar::{EntryRegistry, ZarEntry, ZarError, ZarExtractor, ZarParser};
