use std::io::Read;

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// Fixed archive header as stored on disk. All multi-byte fields are
/// little-endian.
#[derive(Debug, Clone, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct Header {
    pub signature: [u8; 16],
    pub encrypt_key: [u8; 14],
    pub file_offset: u32,
    pub seed: u32,
    pub raw_entry_count: u32,
    pub version: u32,
}

static_assertions::assert_eq_size!(Header, [u8; 46]);

impl Header {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn from_reader<R>(reader: &mut R) -> std::io::Result<Self>
    where
        R: Read,
    {
        let mut buf = [0u8; Self::SIZE];
        reader.read_exact(&mut buf)?;
        Ok(Self::read_from_bytes(&buf).unwrap())
    }
}

/// Fixed-size metadata tail of a directory record. Both directory
/// generations share this shape; the generation-1 size fields carry
/// additional biases removed by the decoder.
#[derive(Debug, Clone, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct RecordTail {
    pub compressed_size: u32,
    pub compressed_size_aligned: u32,
    pub uncompressed_size: u32,
    pub flags: u8,
    pub offset: u32,
}

static_assertions::assert_eq_size!(RecordTail, [u8; 17]);

impl RecordTail {
    pub const SIZE: usize = std::mem::size_of::<Self>();

    pub fn from_reader<R>(reader: &mut R) -> std::io::Result<Self>
    where
        R: Read,
    {
        let mut buf = [0u8; Self::SIZE];
        reader.read_exact(&mut buf)?;
        Ok(Self::read_from_bytes(&buf).unwrap())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_header() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(b"Master of Magic\0");
        bytes.extend_from_slice(&[0x01; 14]);
        bytes.extend_from_slice(&[0x10, 0x00, 0x00, 0x00]); // file offset
        bytes.extend_from_slice(&[0x03, 0x00, 0x00, 0x00]); // seed
        bytes.extend_from_slice(&[0x13, 0x00, 0x00, 0x00]); // raw entry count
        bytes.extend_from_slice(&[0x02, 0x01, 0x00, 0x00]); // version 0x102
        assert_eq!(bytes.len(), Header::SIZE);

        let header = Header::read_from_bytes(&bytes).unwrap();
        assert_eq!(&header.signature, b"Master of Magic\0");
        assert_eq!(header.encrypt_key, [0x01; 14]);
        assert_eq!({ header.file_offset }, 16);
        assert_eq!({ header.seed }, 3);
        assert_eq!({ header.raw_entry_count }, 19);
        assert_eq!({ header.version }, 0x102);

        assert_eq!(header.as_bytes(), bytes.as_slice());
    }

    #[test]
    fn test_read_record_tail() {
        let bytes = [
            0x40, 0x8A, 0x00, 0x00, // compressed size
            0x48, 0x8A, 0x00, 0x00, // aligned compressed size
            0x95, 0xFA, 0x06, 0x00, // uncompressed size
            0x01, // flags
            0x2E, 0x00, 0x00, 0x00, // offset
        ];
        let tail = RecordTail::read_from_bytes(&bytes).unwrap();
        assert_eq!({ tail.compressed_size }, 35392);
        assert_eq!({ tail.compressed_size_aligned }, 35400);
        assert_eq!({ tail.uncompressed_size }, 457365);
        assert_eq!(tail.flags, 1);
        assert_eq!({ tail.offset }, 46);

        assert_eq!(tail.as_bytes(), bytes);
    }
}
