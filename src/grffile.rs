use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::error::{GrfError, Result};
use crate::grf::{GrfArchive, GrfEntry};
use crate::read;

/// High-level GRF file handle with an explicit load/unload lifecycle.
///
/// A handle starts unloaded; [`GrfFile::load`] parses the whole directory
/// and commits it in one step, so no partially loaded state is ever
/// observable. Entry payload bytes are fetched lazily from the backing file
/// and never cached.
#[derive(Debug, Default)]
pub struct GrfFile {
    path: PathBuf,
    archive: Option<GrfArchive>,
}

impl GrfFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens and loads the archive at `path` in one step.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut this = Self::new();
        this.load(path)?;
        Ok(this)
    }

    /// Loads the archive directory at `path`, replacing any previously
    /// loaded state. On failure the handle keeps its prior state.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let path_abs = path.canonicalize().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                GrfError::FileNotFound(path.to_path_buf())
            } else {
                GrfError::Io(e)
            }
        })?;

        let file = File::open(&path_abs)?;
        let mut reader = BufReader::new(file);
        let archive = read::read_archive(&mut reader)?;

        self.path = path_abs;
        self.archive = Some(archive);
        Ok(())
    }

    /// Clears all loaded state, returning the handle to its pre-load
    /// condition. Idempotent.
    pub fn unload(&mut self) {
        self.archive = None;
        self.path = PathBuf::new();
    }

    pub fn is_loaded(&self) -> bool {
        self.archive.is_some()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Archive family tag, or the empty string while unloaded.
    pub fn signature(&self) -> &str {
        self.archive
            .as_ref()
            .map(|archive| archive.header().signature())
            .unwrap_or("")
    }

    pub fn archive(&self) -> Option<&GrfArchive> {
        self.archive.as_ref()
    }

    pub fn entry_count(&self) -> usize {
        self.archive
            .as_ref()
            .map(|archive| archive.entries().len())
            .unwrap_or(0)
    }

    /// Entry names in directory order, lossily decoded for display.
    pub fn entry_names(&self) -> Vec<Cow<'_, str>> {
        self.archive
            .as_ref()
            .map(|archive| archive.entries().iter().map(GrfEntry::name_lossy).collect())
            .unwrap_or_default()
    }

    /// First entry matching `name` byte-wise, or `None`. A miss is a normal
    /// outcome, not an error.
    pub fn find_entry(&self, name: impl AsRef<[u8]>) -> Option<&GrfEntry> {
        self.archive.as_ref()?.find_entry(name)
    }

    /// Reads `length` raw bytes at `offset` from the backing file, using an
    /// independent handle per call.
    pub fn fetch_bytes(&self, offset: u64, length: usize) -> Result<Vec<u8>> {
        Ok(read_at(&self.path, offset, length)?)
    }

    /// Raw compressed bytes of `entry`, block-aligned as stored on disk.
    pub fn entry_raw_bytes(&self, entry: &GrfEntry) -> Result<Vec<u8>> {
        self.fetch_bytes(entry.offset(), entry.compressed_size_aligned() as usize)
    }
}

/// Byte-range read as a pure function of path, offset and length. Fails if
/// the read cannot satisfy the requested length.
pub fn read_at(path: &Path, offset: u64, length: usize) -> std::io::Result<Vec<u8>> {
    let mut file = File::open(path)?;
    file.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; length];
    file.read_exact(&mut buf)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::read::fixture::{Record, build_v1};

    fn write_temp_archive(bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        file
    }

    fn sample_records(payload_offset: u64, payload_len: u32) -> Vec<Record> {
        vec![
            Record {
                name: b"data\\balmung.act",
                compressed_size: payload_len - 4,
                compressed_size_aligned: payload_len,
                uncompressed_size: 64,
                flags: 0x01,
                offset: payload_offset,
            },
            Record::file(b"data\\balmung.act", 300),
            Record::file(b"data\\prontera.gat", 400),
        ]
    }

    /// Generation-1 archive with the first entry's payload appended after
    /// the directory.
    fn sample_archive() -> (tempfile::NamedTempFile, u64, Vec<u8>) {
        let payload = b"raw compressed payload bytes".to_vec();
        let payload_len = payload.len() as u32;

        // the directory size does not depend on the offset values, so a
        // first pass yields the payload position
        let payload_offset = build_v1(&sample_records(100, payload_len), 0, 0).len() as u64;
        let mut bytes = build_v1(&sample_records(payload_offset, payload_len), 0, 0);
        bytes.extend_from_slice(&payload);

        (write_temp_archive(&bytes), payload_offset, payload)
    }

    #[test]
    fn fresh_handle_is_empty() {
        let grf = GrfFile::new();
        assert!(!grf.is_loaded());
        assert_eq!(grf.signature(), "");
        assert_eq!(grf.entry_count(), 0);
        assert!(grf.entry_names().is_empty());
        assert!(grf.find_entry(b"data\\balmung.act").is_none());
    }

    #[test]
    fn load_missing_path_is_file_not_found() {
        let mut grf = GrfFile::new();
        let err = grf.load("no/such/archive.grf").unwrap_err();
        assert!(matches!(err, GrfError::FileNotFound(_)));
        assert!(!grf.is_loaded());
        assert_eq!(grf.entry_count(), 0);
    }

    #[test]
    fn load_and_unload_lifecycle() {
        let (file, _, _) = sample_archive();

        let mut grf = GrfFile::new();
        grf.load(file.path()).unwrap();
        assert!(grf.is_loaded());
        assert_eq!(grf.signature(), "Master of Magic");
        assert_eq!(grf.entry_count(), 3);
        assert_eq!(grf.entry_names()[0], "data\\balmung.act");

        grf.unload();
        assert!(!grf.is_loaded());
        assert_eq!(grf.signature(), "");
        assert_eq!(grf.entry_count(), 0);
        assert!(grf.entry_names().is_empty());
        assert_eq!(grf.path(), Path::new(""));

        // idempotent
        grf.unload();
        assert!(!grf.is_loaded());
    }

    #[test]
    fn failed_load_keeps_prior_state() {
        let (file, _, _) = sample_archive();
        let mut grf = GrfFile::open(file.path()).unwrap();

        let err = grf.load("no/such/archive.grf").unwrap_err();
        assert!(matches!(err, GrfError::FileNotFound(_)));
        assert!(grf.is_loaded());
        assert_eq!(grf.entry_count(), 3);
    }

    #[test]
    fn find_entry_returns_first_match() {
        let (file, payload_offset, _) = sample_archive();
        let grf = GrfFile::open(file.path()).unwrap();

        // the sample holds two entries under the same name
        let entry = grf.find_entry(b"data\\balmung.act").unwrap();
        assert_eq!(entry.offset(), payload_offset);

        assert!(grf.find_entry(b"data\\missing.txt").is_none());
    }

    #[test]
    fn entry_raw_bytes_reads_aligned_payload() {
        let (file, _, payload) = sample_archive();
        let grf = GrfFile::open(file.path()).unwrap();

        let entry = grf.find_entry(b"data\\balmung.act").unwrap();
        assert_eq!(grf.entry_raw_bytes(entry).unwrap(), payload);
    }

    #[test]
    fn fetch_bytes_past_end_is_io_error() {
        let (file, _, _) = sample_archive();
        let grf = GrfFile::open(file.path()).unwrap();

        let err = grf.fetch_bytes(1 << 20, 16).unwrap_err();
        assert!(matches!(err, GrfError::Io(_)));
    }
}
