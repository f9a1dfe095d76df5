/// Trailing magic identifying a ZAR archive
pub const MAGIC: &[u8; 3] = b"PT&";

/// Unknown bytes between the last record and the magic; skipped, never validated
pub const RESERVED_SIZE: u64 = 4;

/// Footer - 4 reserved bytes + 3-byte magic
pub const FOOTER_SIZE: u64 = RESERVED_SIZE + MAGIC.len() as u64;

/// Record size field - 4 bytes, little-endian
pub const SIZE_FIELD_LEN: u64 = 4;

/// Length bytes store `name_length + LENGTH_BIAS`
pub const LENGTH_BIAS: u8 = 0x80;

/// Longest filename the format allows (8.3 names)
pub const MAX_NAME_LENGTH: u8 = 12;

/// Archive header, derived from the file size and its trailing bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub signature: [u8; 3],
    pub total_size: u64,
}

impl Header {
    pub fn is_valid(&self) -> bool {
        &self.signature == MAGIC
    }
}

/// One archived file, as reconstructed from its metadata record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZarEntry {
    /// Filename, with invalid UTF-8 replaced
    pub file_name: String,
    pub raw_name: Vec<u8>,
    pub compressed_size: u64,
    pub name_length: u8,
    /// Offset of the biased length byte
    pub name_length_offset: u64,
    /// Offset of the first filename byte
    pub name_offset: u64,
    /// Offset of the compressed payload; only meaningful after [`EntryRegistry::into_forward`]
    pub data_offset: u64,
}

impl ZarEntry {
    /// Size of this entry's metadata record on disk
    pub fn record_size(&self) -> u64 {
        SIZE_FIELD_LEN + 1 + self.name_length as u64
    }
}

/// Entries in the order the backward scan discovered them (last archived first)
#[derive(Debug, Default, Clone)]
pub struct EntryRegistry {
    discovered: Vec<ZarEntry>,
}

impl EntryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: ZarEntry) {
        self.discovered.push(entry);
    }

    pub fn len(&self) -> usize {
        self.discovered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.discovered.is_empty()
    }

    pub fn iter_discovered(&self) -> impl Iterator<Item = &ZarEntry> {
        self.discovered.iter()
    }

    /// Replay entries in file order, assigning each its payload offset.
    ///
    /// Payloads are packed back to back from the start of the file, so each
    /// offset is the sum of the compressed sizes before it.
    pub fn into_forward(self) -> Vec<ZarEntry> {
        let mut offset = 0u64;
        self.discovered
            .into_iter()
            .rev()
            .map(|mut entry| {
                entry.data_offset = offset;
                offset += entry.compressed_size;
                entry
            })
            .collect()
    }
}
