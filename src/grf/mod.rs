mod cipher;
mod entry;
mod flag;
mod header;

use serde::{Deserialize, Serialize};

pub(crate) use cipher::*;
pub use entry::*;
pub use flag::*;
pub use header::*;

/// Parsed GRF archive directory, stores the header and entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrfArchive {
    header: GrfHeader,
    entries: Vec<GrfEntry>,
}

impl GrfArchive {
    pub fn new(header: GrfHeader, entries: Vec<GrfEntry>) -> Self {
        GrfArchive { header, entries }
    }

    pub fn header(&self) -> &GrfHeader {
        &self.header
    }

    pub fn entries(&self) -> &[GrfEntry] {
        &self.entries
    }

    /// First entry whose name matches `name` byte-wise, in directory order.
    pub fn find_entry(&self, name: impl AsRef<[u8]>) -> Option<&GrfEntry> {
        let name = name.as_ref();
        self.entries.iter().find(|entry| entry.name_bytes() == name)
    }
}
