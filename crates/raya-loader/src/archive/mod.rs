//! Archive handles and the ordered archive set
//!
//! - **zip_handle**: zip-file backed [`Archive`] handle
//! - **reader**: full-entry byte extraction
//! - **set**: ordered, immutable list of open handles plus close

mod reader;
mod set;
mod zip_handle;

use std::io::{self, Read};

pub use reader::{read_entry, READ_CHUNK};
pub use set::ArchiveSet;
pub use zip_handle::ZipArchiveHandle;

/// An open archive container mapping entry names to byte blobs.
pub trait Archive: Send {
    /// Open the entry called `name` for reading.
    ///
    /// Returns `Ok(None)` when the archive has no such entry.
    fn entry(&mut self, name: &str) -> io::Result<Option<ArchiveEntry<'_>>>;

    /// Release the underlying container.
    fn close(&mut self) -> io::Result<()>;
}

/// A single entry opened for reading.
pub struct ArchiveEntry<'a> {
    size: u64,
    reader: Box<dyn Read + 'a>,
}

impl<'a> ArchiveEntry<'a> {
    /// Wrap a decompressing reader together with the entry's declared
    /// uncompressed size.
    pub fn new(size: u64, reader: impl Read + 'a) -> Self {
        Self {
            size,
            reader: Box::new(reader),
        }
    }

    /// Declared uncompressed size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }
}

impl Read for ArchiveEntry<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reader.read(buf)
    }
}
