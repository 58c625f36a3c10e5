//! Full-entry byte extraction.

use std::io::{self, Read};

use super::{Archive, ArchiveEntry};

/// Largest slice handed to a single `read` call while filling an entry buffer.
pub const READ_CHUNK: usize = 8 * 1024;

/// Outcome of looking up one entry in one archive.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// The archive has no such entry
    Absent,
    /// The entry exists and was read completely
    Found(Vec<u8>),
    /// The entry exists but could not be read
    Unreadable,
}

impl Lookup {
    pub(crate) fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Lookup::Found(data) => Some(data),
            Lookup::Absent | Lookup::Unreadable => None,
        }
    }
}

/// Read the complete content of entry `key`.
///
/// Returns `None` when the entry is absent and also when it is present but
/// cannot be read; callers cannot tell the two apart. The entry reader is
/// dropped on every path before this returns.
pub fn read_entry(archive: &mut dyn Archive, key: &str) -> Option<Vec<u8>> {
    lookup(archive, key).into_bytes()
}

pub(crate) fn lookup(archive: &mut dyn Archive, key: &str) -> Lookup {
    let entry = match archive.entry(key) {
        Ok(Some(entry)) => entry,
        Ok(None) => return Lookup::Absent,
        Err(e) => {
            tracing::debug!(entry = key, error = %e, "failed to open archive entry");
            return Lookup::Unreadable;
        }
    };

    match fill(entry) {
        Ok(data) => Lookup::Found(data),
        Err(e) => {
            tracing::debug!(entry = key, error = %e, "failed to read archive entry");
            Lookup::Unreadable
        }
    }
}

fn fill(mut entry: ArchiveEntry<'_>) -> io::Result<Vec<u8>> {
    let declared = entry.size();
    let size = usize::try_from(declared).map_err(|_| too_large(declared))?;

    // The declared size comes from the archive header and may be bogus.
    let mut data = Vec::new();
    data.try_reserve_exact(size).map_err(|_| too_large(declared))?;

    let mut chunk = [0u8; READ_CHUNK];
    while data.len() < size {
        let want = READ_CHUNK.min(size - data.len());
        match entry.read(&mut chunk[..want]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("entry ended after {} of {} bytes", data.len(), size),
                ))
            }
            Ok(n) => data.extend_from_slice(&chunk[..n]),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(data)
}

fn too_large(declared: u64) -> io::Error {
    io::Error::new(
        io::ErrorKind::OutOfMemory,
        format!("entry of {} bytes does not fit in memory", declared),
    )
}
