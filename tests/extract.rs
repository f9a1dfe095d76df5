//! End-to-end extraction tests over synthesised archives.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;

use tempfile::TempDir;
use unzar::{DclError, Decompressor, LocalFileReader, MemoryReader, ZarError, ZarExtractor};

/// "AIAIAIAIAIAIA", raw literals plus an overlapping match
const AIAI: &[u8] = &[0x00, 0x04, 0x82, 0x24, 0x25, 0x8f, 0x80, 0x7f];

/// "hello world", raw literals only
const HELLO: &[u8] = &[
    0x00, 0x04, 0xd0, 0x94, 0x61, 0xc3, 0xe6, 0x0d, 0x88, 0x3b, 0x6f, 0xe4, 0xb0, 0x21, 0x0b,
    0xf8, 0x07,
];

/// Empty output
const EMPTY: &[u8] = &[0x00, 0x04, 0x01, 0xff];

/// "README.TXT", Huffman-coded literals with a 4K dictionary
const README: &[u8] = &[1, 6, 28, 87, 44, 68, 118, 241, 88, 160, 179, 2, 254, 1];

fn build_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let raw: Vec<(&[u8], &[u8])> = entries
        .iter()
        .map(|&(name, payload)| (name.as_bytes(), payload))
        .collect();
    build_raw_archive(&raw)
}

fn build_raw_archive(entries: &[(&[u8], &[u8])]) -> Vec<u8> {
    let mut data = Vec::new();
    for (_, payload) in entries {
        data.extend_from_slice(payload);
    }
    for (name, payload) in entries {
        data.push(0x80 + name.len() as u8);
        data.extend_from_slice(name);
        data.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    }
    data.extend_from_slice(&[0x12, 0x00, 0x34, 0x00]);
    data.extend_from_slice(b"PT&");
    data
}

fn write_archive(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

fn local_extractor(path: &Path) -> ZarExtractor<LocalFileReader> {
    ZarExtractor::new(Arc::new(LocalFileReader::new(path).unwrap()))
}

#[test]
fn test_extract_single_entry() {
    let work = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let archive = write_archive(work.path(), "ONE.ZAR", &build_archive(&[("abc", AIAI)]));

    let extractor = local_extractor(&archive);
    let entries = extractor.list_files().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].file_name, "abc");
    assert_eq!(entries[0].compressed_size, 8);

    let written = extractor.extract_all(Some(out.path()), |_| {}).unwrap();
    assert_eq!(written, [out.path().join("abc")]);
    assert_eq!(fs::read(out.path().join("abc")).unwrap(), b"AIAIAIAIAIAIA");
}

#[test]
fn test_extract_multiple_entries_in_order() {
    let out = TempDir::new().unwrap();
    let data = build_archive(&[
        ("README.TXT", README),
        ("HELLO.TXT", HELLO),
        ("EMPTY.DAT", EMPTY),
        ("AI.TXT", AIAI),
    ]);
    let extractor = ZarExtractor::new(Arc::new(MemoryReader::new(data)));

    let mut progress = Vec::new();
    extractor
        .extract_all(Some(out.path()), |entry| {
            progress.push((entry.file_name.clone(), entry.compressed_size))
        })
        .unwrap();

    assert_eq!(
        progress,
        [
            ("README.TXT".to_string(), README.len() as u64),
            ("HELLO.TXT".to_string(), HELLO.len() as u64),
            ("EMPTY.DAT".to_string(), EMPTY.len() as u64),
            ("AI.TXT".to_string(), AIAI.len() as u64),
        ]
    );
    assert_eq!(fs::read(out.path().join("README.TXT")).unwrap(), b"README.TXT");
    assert_eq!(fs::read(out.path().join("HELLO.TXT")).unwrap(), b"hello world");
    assert!(fs::read(out.path().join("EMPTY.DAT")).unwrap().is_empty());
    assert_eq!(fs::read(out.path().join("AI.TXT")).unwrap(), b"AIAIAIAIAIAIA");
}

#[test]
fn test_extraction_is_repeatable() {
    let data = build_archive(&[("HELLO.TXT", HELLO), ("AI.TXT", AIAI)]);
    let extractor = ZarExtractor::new(Arc::new(MemoryReader::new(data)));

    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    extractor.extract_all(Some(first.path()), |_| {}).unwrap();
    extractor.extract_all(Some(second.path()), |_| {}).unwrap();
    // Extracting over existing files truncates them
    extractor.extract_all(Some(second.path()), |_| {}).unwrap();

    for name in ["HELLO.TXT", "AI.TXT"] {
        assert_eq!(
            fs::read(first.path().join(name)).unwrap(),
            fs::read(second.path().join(name)).unwrap()
        );
    }
}

#[test]
fn test_bad_payload_aborts_remaining_entries() {
    let out = TempDir::new().unwrap();
    let data = build_archive(&[("BAD.BIN", &[0x05, 0x04, 0x00]), ("GOOD.TXT", HELLO)]);
    let extractor = ZarExtractor::new(Arc::new(MemoryReader::new(data)));

    let err = extractor.extract_all(Some(out.path()), |_| {}).unwrap_err();
    match err {
        ZarError::DecompressionFailure { name, source } => {
            assert_eq!(name, "BAD.BIN");
            assert!(matches!(source, DclError::InvalidLiteralMode(5)));
        }
        other => panic!("expected DecompressionFailure, got {other:?}"),
    }
    assert!(!out.path().join("GOOD.TXT").exists());
}

/// Copies payloads through unchanged.
struct Stored;

impl Decompressor for Stored {
    fn decompress(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, DclError> {
        Ok(std::io::copy(input, output)?)
    }
}

#[test]
fn test_custom_decompressor() {
    let out = TempDir::new().unwrap();
    let data = build_archive(&[("A.BIN", &[0xff, 0x80, 0x8c]), ("B.BIN", b"plain")]);
    let extractor = ZarExtractor::with_decompressor(Arc::new(MemoryReader::new(data)), Stored);

    extractor.extract_all(Some(out.path()), |_| {}).unwrap();
    assert_eq!(fs::read(out.path().join("A.BIN")).unwrap(), [0xff, 0x80, 0x8c]);
    assert_eq!(fs::read(out.path().join("B.BIN")).unwrap(), b"plain");
}

#[test]
fn test_unsafe_name_is_refused_before_progress() {
    let out = TempDir::new().unwrap();
    let data = build_archive(&[("../ESCAPE", HELLO)]);
    let extractor = ZarExtractor::new(Arc::new(MemoryReader::new(data)));

    let mut reported = Vec::new();
    let result = extractor.extract_all(Some(out.path()), |entry| {
        reported.push(entry.file_name.clone())
    });

    assert!(matches!(result, Err(ZarError::UnsafeFileName { .. })));
    assert!(reported.is_empty());
}

#[cfg(unix)]
#[test]
fn test_names_differing_in_high_bytes_stay_distinct() {
    use std::os::unix::ffi::OsStrExt;

    let out = TempDir::new().unwrap();
    let data = build_raw_archive(&[
        (&[b'X', 0x9A, b'Y'], b"first"),
        (&[b'X', 0x99, b'Y'], b"second"),
    ]);
    let extractor = ZarExtractor::with_decompressor(Arc::new(MemoryReader::new(data)), Stored);

    let written = extractor.extract_all(Some(out.path()), |_| {}).unwrap();
    assert_eq!(written.len(), 2);
    assert_ne!(written[0], written[1]);

    let mut on_disk: Vec<Vec<u8>> = fs::read_dir(out.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().as_bytes().to_vec())
        .collect();
    on_disk.sort();
    assert_eq!(on_disk, [vec![b'X', 0x99, b'Y'], vec![b'X', 0x9A, b'Y']]);
    assert_eq!(fs::read(&written[0]).unwrap(), b"first");
    assert_eq!(fs::read(&written[1]).unwrap(), b"second");
}

fn unzar() -> Command {
    Command::new(env!("CARGO_BIN_EXE_unzar"))
}

#[test]
fn test_cli_without_archive_prints_usage() {
    let output = unzar().output().unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Usage"));
}

#[test]
fn test_cli_extracts_with_progress() {
    let work = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let archive = write_archive(work.path(), "ONE.ZAR", &build_archive(&[("abc", AIAI)]));

    let output = unzar()
        .arg("-e")
        .arg(&archive)
        .arg("-d")
        .arg(out.path())
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(
        String::from_utf8_lossy(&output.stdout).contains("Extracting: abc (8 bytes compressed)")
    );
    assert_eq!(fs::read(out.path().join("abc")).unwrap(), b"AIAIAIAIAIAIA");
}

#[test]
fn test_cli_missing_destination() {
    let work = TempDir::new().unwrap();
    let archive = write_archive(work.path(), "ONE.ZAR", &build_archive(&[("abc", AIAI)]));

    let output = unzar()
        .arg("-e")
        .arg(&archive)
        .arg("-d")
        .arg(work.path().join("missing"))
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("doesn't exist"));
}

#[test]
fn test_cli_rejects_non_zar_file() {
    let work = TempDir::new().unwrap();
    let archive = write_archive(work.path(), "NOT.ZAR", b"PK\x05\x06 definitely not zar");

    let output = unzar().arg("-e").arg(&archive).output().unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("is not a ZAR file"));
}

#[test]
fn test_cli_rejects_long_filename() {
    let work = TempDir::new().unwrap();
    let archive = write_archive(
        work.path(),
        "LONG.ZAR",
        &build_archive(&[("ABCDEFGHI.TXT", AIAI)]),
    );

    let output = unzar()
        .arg("-e")
        .arg(&archive)
        .arg("-d")
        .arg(work.path())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("filename length is > 12: 13"));
}
