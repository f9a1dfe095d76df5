//! The explode decoder proper.

use std::io::{Read, Write};
use std::sync::LazyLock;

use super::DclError;
use super::bits::BitReader;
use super::huffman::Huffman;

/// Size of the circular output window (largest dictionary).
const MAX_WINDOW: usize = 4096;

/// Decoded length value that terminates the stream.
const END_OF_STREAM: u32 = 519;

/// Run-length code lengths for the 256 coded literals.
const LITERAL_RUNS: [u8; 98] = [
    11, 124, 8, 7, 28, 7, 188, 13, 76, 4, 10, 8, 12, 10, 12, 10, 8, 23, 8, 9, 7, 6, 7, 8, 7, 6,
    55, 8, 23, 24, 12, 11, 7, 9, 11, 12, 6, 7, 22, 5, 7, 24, 6, 11, 9, 6, 7, 22, 7, 11, 38, 7, 9,
    8, 25, 11, 8, 11, 9, 12, 8, 12, 5, 38, 5, 38, 5, 11, 7, 5, 6, 21, 6, 10, 53, 8, 7, 24, 10, 27,
    44, 253, 253, 253, 252, 252, 252, 13, 12, 45, 12, 45, 12, 61, 12, 45, 44, 173,
];

/// Run-length code lengths for the 16 length symbols.
const LENGTH_RUNS: [u8; 6] = [2, 35, 36, 53, 38, 23];

/// Run-length code lengths for the 64 distance high-bit symbols.
const DISTANCE_RUNS: [u8; 7] = [2, 20, 53, 230, 247, 151, 248];

/// Base match length for each length symbol.
const LENGTH_BASE: [u16; 16] = [3, 2, 4, 5, 6, 7, 8, 9, 10, 12, 16, 24, 40, 72, 136, 264];

/// Extra bits following each length symbol.
const LENGTH_EXTRA: [u8; 16] = [0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3, 4, 5, 6, 7, 8];

struct Tables {
    literal: Huffman,
    length: Huffman,
    distance: Huffman,
}

static TABLES: LazyLock<Tables> = LazyLock::new(|| Tables {
    literal: Huffman::from_runs(&LITERAL_RUNS),
    length: Huffman::from_runs(&LENGTH_RUNS),
    distance: Huffman::from_runs(&DISTANCE_RUNS),
});

/// Circular output window, flushed to the sink each time it fills.
struct Window<W: Write> {
    output: W,
    buf: Box<[u8]>,
    next: usize,
    /// Set once the window has been flushed at least once.
    wrapped: bool,
    written: u64,
}

impl<W: Write> Window<W> {
    fn new(output: W) -> Self {
        Self {
            output,
            buf: vec![0u8; MAX_WINDOW].into_boxed_slice(),
            next: 0,
            wrapped: false,
            written: 0,
        }
    }

    fn flush(&mut self) -> Result<(), DclError> {
        self.output.write_all(&self.buf[..self.next])?;
        self.written += self.next as u64;
        self.next = 0;
        self.wrapped = true;
        Ok(())
    }

    fn push(&mut self, byte: u8) -> Result<(), DclError> {
        self.buf[self.next] = byte;
        self.next += 1;
        if self.next == MAX_WINDOW {
            self.flush()?;
        }
        Ok(())
    }

    fn copy_match(&mut self, distance: usize, mut len: usize) -> Result<(), DclError> {
        if !self.wrapped && distance > self.next {
            return Err(DclError::DistanceTooFar {
                distance,
                available: self.next,
            });
        }

        while len > 0 {
            let to = self.next;
            // The source may sit behind the wrap point, in which case copy up to the window end.
            let (from, limit) = if to < distance {
                (to + MAX_WINDOW - distance, distance)
            } else {
                (to - distance, MAX_WINDOW)
            };
            let copy = (limit - to).min(len);

            // Byte-wise so overlapping matches repeat their own output.
            for i in 0..copy {
                let byte = self.buf[from + i];
                self.buf[to + i] = byte;
            }

            len -= copy;
            self.next += copy;
            if self.next == MAX_WINDOW {
                self.flush()?;
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<u64, DclError> {
        if self.next > 0 {
            self.flush()?;
        }
        self.output.flush()?;
        Ok(self.written)
    }
}

/// Decode a DCL stream from `input` into `output`.
///
/// Returns the number of decompressed bytes written. Input after the
/// end-of-stream code is left unread.
pub fn explode_stream<R: Read, W: Write>(input: R, output: W) -> Result<u64, DclError> {
    let tables = &*TABLES;
    let mut bits = BitReader::new(input);

    let coded_literals = match bits.read_bits(8)? {
        0 => false,
        1 => true,
        other => return Err(DclError::InvalidLiteralMode(other as u8)),
    };
    let dictionary = bits.read_bits(8)? as u8;
    if !(4..=6).contains(&dictionary) {
        return Err(DclError::InvalidDictionarySize(dictionary));
    }

    let mut window = Window::new(output);

    loop {
        if bits.read_bits(1)? == 1 {
            let symbol = tables.length.decode(&mut bits)? as usize;
            let len = LENGTH_BASE[symbol] as u32 + bits.read_bits(LENGTH_EXTRA[symbol])?;
            if len == END_OF_STREAM {
                break;
            }

            // Two-byte matches always use two low distance bits.
            let low_bits = if len == 2 { 2 } else { dictionary };
            let high = tables.distance.decode(&mut bits)? as u32;
            let distance = (high << low_bits) + bits.read_bits(low_bits)? + 1;

            window.copy_match(distance as usize, len as usize)?;
        } else {
            let byte = if coded_literals {
                tables.literal.decode(&mut bits)?
            } else {
                bits.read_bits(8)? as u8
            };
            window.push(byte)?;
        }
    }

    window.finish()
}
