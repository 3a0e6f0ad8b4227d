use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Storage and encryption mode of a directory record.
    ///
    /// The encryption bits are carried verbatim; no payload decryption path
    /// exists for any of them.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct EntryFlags: u8 {
        /// Regular file record. Unset for folder records.
        const FILE = 0x01;
        /// Payload fully encrypted with the mixed DES variant.
        const MIXED = 0x02;
        /// Only the payload header blocks are DES encrypted.
        const DES = 0x04;
        /// Both encryption mode bits set.
        const MIXED_ENCRYPTED = Self::MIXED.bits() | Self::DES.bits();
    }
}

impl Serialize for EntryFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for EntryFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u8::deserialize(deserializer)?;
        Ok(EntryFlags::from_bits_truncate(value))
    }
}
