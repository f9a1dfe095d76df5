//! Canonical Huffman decoding for the fixed DCL tables.
//!
//! DCL stores its code lengths as run-length bytes: the low nibble is a bit
//! length and the high nibble plus one is how many consecutive symbols use
//! it. Codes are canonical but transmitted bit-inverted, so every bit is
//! flipped as it is read.

use super::DclError;
use super::bits::BitReader;
use std::io::Read;

/// Longest code in any DCL table.
pub const MAX_BITS: usize = 13;

/// A decoding table built from run-length code lengths.
#[derive(Debug, Clone)]
pub struct Huffman {
    /// Number of symbols for each code length.
    count: [u16; MAX_BITS + 1],
    /// Symbols ordered by code length, then by symbol value.
    symbols: Vec<u8>,
}

impl Huffman {
    /// Build a table from the compact repeat-count representation.
    pub fn from_runs(runs: &[u8]) -> Self {
        let lengths: Vec<u8> = runs
            .iter()
            .flat_map(|&run| std::iter::repeat_n(run & 0x0F, (run >> 4) as usize + 1))
            .collect();

        let mut count = [0u16; MAX_BITS + 1];
        for &len in &lengths {
            count[len as usize] += 1;
        }

        let mut offsets = [0usize; MAX_BITS + 1];
        for len in 1..MAX_BITS {
            offsets[len + 1] = offsets[len] + count[len] as usize;
        }

        let used = lengths.iter().filter(|&&len| len != 0).count();
        let mut symbols = vec![0u8; used];
        for (symbol, &len) in lengths.iter().enumerate() {
            if len != 0 {
                symbols[offsets[len as usize]] = symbol as u8;
                offsets[len as usize] += 1;
            }
        }

        Self { count, symbols }
    }

    /// Decode one symbol, reading inverted code bits one at a time.
    pub fn decode<R: Read>(&self, bits: &mut BitReader<R>) -> Result<u8, DclError> {
        let mut code = 0usize;
        let mut first = 0usize;
        let mut index = 0usize;

        for len in 1..=MAX_BITS {
            code |= (bits.read_bits(1)? ^ 1) as usize;
            let count = self.count[len] as usize;
            if code < first + count {
                return Ok(self.symbols[index + code - first]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }

        Err(DclError::InvalidCode {
            offset: bits.bytes_read(),
        })
    }

    #[cfg(test)]
    pub fn symbol_count(&self) -> usize {
        self.symbols.len()
    }

    /// Remaining code space after assigning every length; zero for a complete code.
    #[cfg(test)]
    pub fn unused_codes(&self) -> i32 {
        let mut left = 1i32;
        for len in 1..=MAX_BITS {
            left = (left << 1) - self.count[len] as i32;
        }
        left
    }
}
