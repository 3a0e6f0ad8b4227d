use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::flag::EntryFlags;

/// One archive member as decoded from the directory. Produced once by a
/// directory decoder and immutable thereafter.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct GrfEntry {
    pub(crate) name: Vec<u8>,
    pub(crate) offset: u64,
    pub(crate) compressed_size: u32,
    pub(crate) compressed_size_aligned: u32,
    pub(crate) uncompressed_size: u32,
    pub(crate) flags: EntryFlags,
}

impl GrfEntry {
    /// Decoded path with backslash directory separators. The original byte
    /// encoding is preserved and is not necessarily valid UTF-8.
    pub fn name_bytes(&self) -> &[u8] {
        &self.name
    }

    /// Lossy UTF-8 view of the entry path.
    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    /// Absolute offset of the entry payload in the backing file.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn compressed_size(&self) -> u32 {
        self.compressed_size
    }

    /// Compressed size padded to the cipher block boundary, the amount
    /// stored on disk for this entry.
    pub fn compressed_size_aligned(&self) -> u32 {
        self.compressed_size_aligned
    }

    pub fn uncompressed_size(&self) -> u32 {
        self.uncompressed_size
    }

    pub fn flags(&self) -> EntryFlags {
        self.flags
    }
}

impl std::fmt::Debug for GrfEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GrfEntry")
            .field("name", &self.name_lossy())
            .field("offset", &self.offset)
            .field("compressed_size", &self.compressed_size)
            .field("compressed_size_aligned", &self.compressed_size_aligned)
            .field("uncompressed_size", &self.uncompressed_size)
            .field("flags", &self.flags)
            .finish()
    }
}
