//! PKWare Data Compression Library ("implode") decoding.
//!
//! ZAR payloads are compressed with the DCL implode algorithm, the same
//! scheme used by many early-90s installers. This module provides the
//! matching "explode" decoder behind the [`Decompressor`] trait so the
//! archive layer can treat it as an opaque streaming decoder.
//!
//! ## Stream Layout
//!
//! A DCL stream starts with two header bytes:
//! 1. Literal mode: `0` for raw 8-bit literals, `1` for Huffman-coded literals
//! 2. Dictionary size: `4`, `5` or `6` (1K, 2K or 4K sliding window)
//!
//! What follows is an LSB-first bit stream of literals and (length, distance)
//! back-references, terminated by the reserved length code 519. All Huffman
//! tables are fixed by the format; none are transmitted.

mod bits;
mod explode;
mod huffman;

pub use explode::explode_stream;

use std::io::{self, BufReader, Read, Write};
use thiserror::Error;

/// Errors raised while decoding a DCL stream.
#[derive(Debug, Error)]
pub enum DclError {
    /// I/O error from the compressed source or the output sink.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The compressed data ended before the end-of-stream code.
    #[error("unexpected end of compressed data after {offset} bytes")]
    UnexpectedEof {
        /// Number of compressed bytes consumed.
        offset: u64,
    },

    /// The first header byte is not a known literal mode.
    #[error("invalid literal mode {0}: expected 0 or 1")]
    InvalidLiteralMode(u8),

    /// The second header byte is not a known dictionary size.
    #[error("invalid dictionary size {0}: expected 4, 5 or 6")]
    InvalidDictionarySize(u8),

    /// A back-reference points before the start of the output.
    #[error("back-reference distance {distance} exceeds {available} bytes of output")]
    DistanceTooFar {
        /// Requested distance.
        distance: usize,
        /// Bytes produced so far.
        available: usize,
    },

    /// No symbol matched within the maximum code length.
    #[error("invalid Huffman code near byte {offset}")]
    InvalidCode {
        /// Number of compressed bytes consumed.
        offset: u64,
    },
}

/// Streaming decompressor for a single archive payload.
pub trait Decompressor {
    /// Decode all of `input` into `output`, returning the number of bytes written.
    fn decompress(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, DclError>;
}

/// The DCL explode decoder.
#[derive(Debug, Default, Clone, Copy)]
pub struct Explode;

impl Decompressor for Explode {
    fn decompress(&self, input: &mut dyn Read, output: &mut dyn Write) -> Result<u64, DclError> {
        explode_stream(BufReader::new(input), output)
    }
}

/// Decode a complete DCL stream held in memory.
pub fn explode(data: &[u8]) -> Result<Vec<u8>, DclError> {
    let mut output = Vec::new();
    explode_stream(data, &mut output)?;
    Ok(output)
}
