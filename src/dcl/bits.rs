//! LSB-first bit reader for DCL streams.

use super::DclError;
use std::io::{ErrorKind, Read};

/// Reads bits from a byte source, least significant bit first.
#[derive(Debug)]
pub struct BitReader<R: Read> {
    reader: R,
    /// Pending bits, LSB is the next bit out.
    buffer: u32,
    /// Number of valid bits in `buffer`.
    bits_in_buffer: u8,
    /// Bytes pulled from `reader` so far (for error reporting).
    bytes_read: u64,
}

impl<R: Read> BitReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: 0,
            bits_in_buffer: 0,
            bytes_read: 0,
        }
    }

    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn fill_buffer(&mut self, count: u8) -> Result<(), DclError> {
        while self.bits_in_buffer < count {
            let mut byte = [0u8; 1];
            match self.reader.read(&mut byte) {
                Ok(0) => {
                    return Err(DclError::UnexpectedEof {
                        offset: self.bytes_read,
                    });
                }
                Ok(_) => {
                    self.buffer |= (byte[0] as u32) << self.bits_in_buffer;
                    self.bits_in_buffer += 8;
                    self.bytes_read += 1;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    /// Read up to 16 bits, first bit read in the LSB position.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u32, DclError> {
        debug_assert!(count <= 16, "Cannot read more than 16 bits at once");

        if count == 0 {
            return Ok(0);
        }

        self.fill_buffer(count)?;

        let result = self.buffer & ((1u32 << count) - 1);
        self.buffer >>= count;
        self.bits_in_buffer -= count;

        Ok(result)
    }
}
