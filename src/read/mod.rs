use std::io::{BufRead, Cursor, Read, Seek, SeekFrom};

use byteorder::{LE, ReadBytesExt};

use crate::error::{GrfError, Result};
use crate::grf::{EntryFlags, GrfArchive, GrfEntry, GrfFormat, GrfHeader, decode_file_name};
use crate::spec;

/// Biases baked into the generation-1 directory accounting.
const ALIGNED_SIZE_BIAS: u32 = 37579;
const COMPRESSED_SIZE_BIAS: u32 = 715;

/// Asset types whose payloads are only header-encrypted in generation 1;
/// everything else is fully encrypted.
const HEADER_ONLY_EXTENSIONS: [&[u8]; 4] = [b".gnd", b".gat", b".act", b".str"];

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Truncated directory record: {0}")]
    Truncated(#[from] std::io::Error),
    #[error("Invalid record length word: {0}")]
    InvalidRecordLength(u32),
    #[error("Unterminated entry name")]
    UnterminatedName,
    #[error("Failed to decompress directory body: {0}")]
    Decompression(std::io::Error),
}

/// Parses the archive header and the matching directory generation,
/// producing the full entry collection.
pub fn read_archive<R>(reader: &mut R) -> Result<GrfArchive>
where
    R: Read + Seek,
{
    let spec_header = spec::Header::from_reader(reader)?;
    let header = GrfHeader::try_from(spec_header)?;

    // format-mandated padding between the fixed header and the directory
    // body, typically zero
    reader.seek(SeekFrom::Current(i64::from(header.file_offset())))?;

    let entries = match header.version() {
        GrfFormat::Version102 | GrfFormat::Version103 => read_entries_v1(reader, &header),
        GrfFormat::Version200 => read_entries_v2(reader, &header),
    }
    .map_err(|e| GrfError::MalformedDirectory(Box::new(e)))?;

    Ok(GrfArchive::new(header, entries))
}

/// Generation-1 directory: uncompressed, interleaved with entry data,
/// names obfuscated by the filename cipher.
fn read_entries_v1<R>(
    reader: &mut R,
    header: &GrfHeader,
) -> std::result::Result<Vec<GrfEntry>, DirectoryError>
where
    R: Read,
{
    let mut body = Vec::new();
    reader.read_to_end(&mut body)?;
    let mut body_reader = Cursor::new(body.as_slice());

    let mut entries = Vec::with_capacity(header.entry_count() as usize);
    let mut record_start = 0u64;
    for _ in 0..header.entry_count() {
        body_reader.seek(SeekFrom::Start(record_start))?;
        let length_word = body_reader.read_u32::<LE>()?;
        let name_length = length_word
            .checked_sub(6)
            .ok_or(DirectoryError::InvalidRecordLength(length_word))?;
        let tail_start = record_start + u64::from(length_word) + 4;

        body_reader.seek(SeekFrom::Start(record_start + 6))?;
        let mut encoded_name = vec![0u8; name_length as usize];
        body_reader.read_exact(&mut encoded_name)?;
        let name = decode_file_name(&encoded_name);

        body_reader.seek(SeekFrom::Start(tail_start))?;
        let tail = spec::RecordTail::from_reader(&mut body_reader)?;
        record_start = tail_start + spec::RecordTail::SIZE as u64;

        let uncompressed_size = tail.uncompressed_size;
        let compressed_size = { tail.compressed_size }
            .wrapping_sub(uncompressed_size)
            .wrapping_sub(COMPRESSED_SIZE_BIAS);
        let compressed_size_aligned = { tail.compressed_size_aligned }.wrapping_sub(ALIGNED_SIZE_BIAS);

        // this generation does not record the encryption mode on disk
        let mut flags = EntryFlags::from_bits_truncate(tail.flags);
        flags |= if is_full_encrypted(&name) {
            EntryFlags::MIXED
        } else {
            EntryFlags::DES
        };

        // folders and zero-length members are parsed but never materialized
        if !flags.contains(EntryFlags::FILE) || uncompressed_size == 0 {
            continue;
        }

        entries.push(GrfEntry {
            name,
            offset: u64::from(tail.offset) + GrfHeader::SIZE,
            compressed_size,
            compressed_size_aligned,
            uncompressed_size,
            flags,
        });
    }

    Ok(entries)
}

/// Generation-2 directory: zlib-compressed blob of fixed-shape records with
/// clear-text, NUL-terminated names.
fn read_entries_v2<R>(
    reader: &mut R,
    header: &GrfHeader,
) -> std::result::Result<Vec<GrfEntry>, DirectoryError>
where
    R: Read,
{
    let compressed_body_size = reader.read_u32::<LE>()?;
    let body_size = reader.read_u32::<LE>()?;

    let mut compressed_body = vec![0u8; compressed_body_size as usize];
    reader.read_exact(&mut compressed_body)?;

    let mut body = Vec::with_capacity(body_size as usize);
    flate2::read::ZlibDecoder::new(compressed_body.as_slice())
        .read_to_end(&mut body)
        .map_err(DirectoryError::Decompression)?;

    let mut body_reader = Cursor::new(body.as_slice());
    let mut entries = Vec::with_capacity(header.entry_count() as usize);
    for _ in 0..header.entry_count() {
        let mut name = Vec::new();
        body_reader.read_until(0, &mut name)?;
        if name.pop() != Some(0) {
            return Err(DirectoryError::UnterminatedName);
        }

        let tail = spec::RecordTail::from_reader(&mut body_reader)?;

        let flags = EntryFlags::from_bits_truncate(tail.flags);
        let uncompressed_size = tail.uncompressed_size;
        if !flags.contains(EntryFlags::FILE) || uncompressed_size == 0 {
            continue;
        }

        entries.push(GrfEntry {
            name,
            offset: u64::from(tail.offset) + GrfHeader::SIZE,
            compressed_size: tail.compressed_size,
            compressed_size_aligned: tail.compressed_size_aligned,
            uncompressed_size,
            flags,
        });
    }

    Ok(entries)
}

fn is_full_encrypted(name: &[u8]) -> bool {
    !HEADER_ONLY_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}
