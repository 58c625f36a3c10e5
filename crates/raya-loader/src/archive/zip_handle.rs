//! Zip-file backed archive handle.

use std::fs::File;
use std::io;

use zip::result::ZipError;
use zip::ZipArchive;

use super::{Archive, ArchiveEntry};

/// An open zip archive.
///
/// The central directory is parsed once when the handle is opened; entry
/// lookups afterwards are name-indexed.
pub struct ZipArchiveHandle {
    label: String,
    archive: Option<ZipArchive<File>>,
}

impl ZipArchiveHandle {
    /// Parse the zip central directory from an open file.
    pub fn open(file: File, label: impl Into<String>) -> io::Result<Self> {
        let archive = ZipArchive::new(file).map_err(io::Error::other)?;
        Ok(Self {
            label: label.into(),
            archive: Some(archive),
        })
    }

    /// Where the archive came from.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of entries, or 0 once closed.
    pub fn len(&self) -> usize {
        self.archive.as_ref().map_or(0, |a| a.len())
    }

    /// Whether the archive has no entries (or is closed).
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether [`Archive::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.archive.is_none()
    }
}

impl Archive for ZipArchiveHandle {
    fn entry(&mut self, name: &str) -> io::Result<Option<ArchiveEntry<'_>>> {
        let archive = self.archive.as_mut().ok_or_else(|| {
            io::Error::other(format!("archive {} is closed", self.label))
        })?;

        match archive.by_name(name) {
            Ok(file) => Ok(Some(ArchiveEntry::new(file.size(), file))),
            Err(ZipError::FileNotFound) => Ok(None),
            Err(ZipError::Io(e)) => Err(e),
            Err(e) => Err(io::Error::other(e)),
        }
    }

    fn close(&mut self) -> io::Result<()> {
        match self.archive.take() {
            Some(archive) => {
                drop(archive);
                Ok(())
            }
            None => Err(io::Error::other(format!(
                "archive {} is already closed",
                self.label
            ))),
        }
    }
}

impl std::fmt::Debug for ZipArchiveHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ZipArchiveHandle")
            .field("label", &self.label)
            .field("entries", &self.len())
            .field("closed", &self.is_closed())
            .finish()
    }
}
