use std::ffi::{OsStr, OsString};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use crate::dcl::{Decompressor, Explode};
use crate::io::ReadAt;

use super::error::{Result, ZarError};
use super::parser::ZarParser;
use super::structures::ZarEntry;

/// ZAR file extractor
pub struct ZarExtractor<R: ReadAt, D: Decompressor = Explode> {
    parser: ZarParser<R>,
    decompressor: D,
}

impl<R: ReadAt> ZarExtractor<R> {
    pub fn new(reader: Arc<R>) -> Self {
        Self::with_decompressor(reader, Explode)
    }
}

impl<R: ReadAt, D: Decompressor> ZarExtractor<R, D> {
    /// Create an extractor that decodes payloads with `decompressor`
    pub fn with_decompressor(reader: Arc<R>, decompressor: D) -> Self {
        Self {
            parser: ZarParser::new(reader),
            decompressor,
        }
    }

    /// List all files in the archive, in archive order
    pub fn list_files(&self) -> Result<Vec<ZarEntry>> {
        self.parser.list_files()
    }

    /// Read an entry's compressed payload
    pub fn read_compressed(&self, entry: &ZarEntry) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; entry.compressed_size as usize];
        self.parser.read_exact(entry.data_offset, &mut buf)?;
        Ok(buf)
    }

    /// Decompress an entry into `writer`, returning the decompressed size
    pub fn extract_to_writer(&self, entry: &ZarEntry, writer: &mut dyn Write) -> Result<u64> {
        let compressed = self.read_compressed(entry)?;
        let mut input = compressed.as_slice();

        self.decompressor
            .decompress(&mut input, writer)
            .map_err(|source| ZarError::DecompressionFailure {
                name: entry.file_name.clone(),
                source,
            })
    }

    /// Extract file to disk, replacing any existing file
    pub fn extract_to_file(&self, entry: &ZarEntry, output_path: &Path) -> Result<u64> {
        let file = File::create(output_path).map_err(|source| ZarError::CreateOutput {
            path: output_path.to_path_buf(),
            source,
        })?;

        let mut writer = BufWriter::new(file);
        let written = self.extract_to_writer(entry, &mut writer)?;
        writer.flush()?;

        debug!(
            name = %entry.file_name,
            path = %output_path.display(),
            written,
            "extracted entry"
        );
        Ok(written)
    }

    /// Extract every entry in archive order, stopping at the first failure.
    ///
    /// `on_entry` is called once an entry's output name has been accepted and
    /// before it is written. Returns the paths
    /// that were created.
    pub fn extract_all<F>(&self, dest: Option<&Path>, mut on_entry: F) -> Result<Vec<PathBuf>>
    where
        F: FnMut(&ZarEntry),
    {
        let entries = self.list_files()?;
        let mut written = Vec::with_capacity(entries.len());

        for entry in &entries {
            let path = output_path(dest, entry)?;
            on_entry(entry);
            self.extract_to_file(entry, &path)?;
            written.push(path);
        }

        Ok(written)
    }
}

/// Where an entry is written: under `dest` if given, else the current directory.
///
/// The path is built from the raw stored name so that names differing only
/// in non-UTF-8 bytes stay distinct. Names that are empty or are anything
/// but a single plain file name are rejected.
pub fn output_path(dest: Option<&Path>, entry: &ZarEntry) -> Result<PathBuf> {
    let raw = entry.raw_name.as_slice();
    let has_separator = raw.iter().any(|&b| matches!(b, b'/' | b'\\' | 0));
    let name = raw_name_to_os(raw);
    let mut components = Path::new(&name).components();
    let is_plain = !has_separator
        && matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );

    if !is_plain {
        return Err(ZarError::UnsafeFileName {
            name: entry.file_name.clone(),
        });
    }

    Ok(match dest {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    })
}

#[cfg(unix)]
fn raw_name_to_os(raw: &[u8]) -> OsString {
    use std::os::unix::ffi::OsStrExt;
    OsStr::from_bytes(raw).to_os_string()
}

// Arbitrary bytes cannot round-trip into a native name here
#[cfg(not(unix))]
fn raw_name_to_os(raw: &[u8]) -> OsString {
    OsString::from(String::from_utf8_lossy(raw).into_owned())
}
