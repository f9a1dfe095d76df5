use super::ReadAt;
use std::io;

/// In-memory archive source
pub struct MemoryReader {
    data: Vec<u8>,
    location: String,
}

impl MemoryReader {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        Self::with_location(data, "<memory>")
    }

    /// Create a reader that reports `location` in diagnostics
    pub fn with_location(data: impl Into<Vec<u8>>, location: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            location: location.into(),
        }
    }
}

impl ReadAt for MemoryReader {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> io::Result<usize> {
        let Ok(start) = usize::try_from(offset) else {
            return Ok(0);
        };
        if start >= self.data.len() {
            return Ok(0);
        }
        let n = buf.len().min(self.data.len() - start);
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        Ok(n)
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn location(&self) -> &str {
        &self.location
    }
}
