use serde::{Deserialize, Serialize};

use crate::error::GrfError;
use crate::spec;

/// Fixed distortion applied to the on-disk entry count in every generation.
const ENTRY_COUNT_BIAS: u32 = 7;

/// On-disk directory format generation, keyed by the header version tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrfFormat {
    Version102,
    Version103,
    Version200,
}

impl GrfFormat {
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0x102 => Some(GrfFormat::Version102),
            0x103 => Some(GrfFormat::Version103),
            0x200 => Some(GrfFormat::Version200),
            _ => None,
        }
    }

    pub fn tag(self) -> u32 {
        match self {
            GrfFormat::Version102 => 0x102,
            GrfFormat::Version103 => 0x103,
            GrfFormat::Version200 => 0x200,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrfHeader {
    signature: String,
    encrypt_key: [u8; 14],
    file_offset: u32,
    seed: u32,
    raw_entry_count: u32,
    version: GrfFormat,
    entry_count: u32,
}

impl GrfHeader {
    /// Size of the fixed header region; entry data offsets are relative to
    /// its end.
    pub const SIZE: u64 = spec::Header::SIZE as u64;

    /// Archive family tag, the first 15 bytes of the signature field.
    #[inline]
    pub fn signature(&self) -> &str {
        &self.signature
    }

    /// Legacy encryption key field, unused by both generations.
    #[inline]
    pub fn encrypt_key(&self) -> &[u8; 14] {
        &self.encrypt_key
    }

    /// Corrective skip between the fixed header and the directory body.
    #[inline]
    pub fn file_offset(&self) -> u32 {
        self.file_offset
    }

    #[inline]
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// Entry count as stored on disk, before the distortion is removed.
    #[inline]
    pub fn raw_entry_count(&self) -> u32 {
        self.raw_entry_count
    }

    #[inline]
    pub fn version(&self) -> GrfFormat {
        self.version
    }

    /// Corrected entry count, the authoritative directory iteration bound.
    #[inline]
    pub fn entry_count(&self) -> u32 {
        self.entry_count
    }
}

impl TryFrom<spec::Header> for GrfHeader {
    type Error = GrfError;

    fn try_from(this: spec::Header) -> Result<Self, Self::Error> {
        let version_tag = this.version;
        let version =
            GrfFormat::from_tag(version_tag).ok_or(GrfError::UnsupportedVersion(version_tag))?;

        let file_offset = this.file_offset;
        let seed = this.seed;
        let raw_entry_count = this.raw_entry_count;

        // generation 1 folds the seed into the distorted count as well
        let entry_count = match version {
            GrfFormat::Version102 | GrfFormat::Version103 => raw_entry_count
                .checked_sub(ENTRY_COUNT_BIAS)
                .and_then(|count| count.checked_sub(seed)),
            GrfFormat::Version200 => raw_entry_count.checked_sub(ENTRY_COUNT_BIAS),
        }
        .ok_or_else(|| GrfError::MalformedDirectory("distorted entry count underflow".into()))?;

        Ok(GrfHeader {
            signature: String::from_utf8_lossy(&this.signature[..15]).into_owned(),
            encrypt_key: this.encrypt_key,
            file_offset,
            seed,
            raw_entry_count,
            version,
            entry_count,
        })
    }
}
